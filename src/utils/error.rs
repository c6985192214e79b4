use thiserror::Error;

/// Failures the monitoring session controller can report.
///
/// Missing or unparseable artifacts are deliberately not represented
/// here: the store treats them as absence, not as errors.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// The control service could not be reached or timed out
    #[error("Capture control request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The control service answered with an unexpected status
    #[error("Capture control endpoint returned status {0}")]
    Rejected(reqwest::StatusCode),

    /// Another control operation is still in flight for this session
    #[error("A capture operation is already in progress")]
    Busy,

    /// The monitoring view is not open
    #[error("The monitoring session is closed")]
    Closed,

    /// Export was requested but no archive has been produced yet
    #[error("No capture archive is available to export")]
    NoArchive,

    /// Error from I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;
