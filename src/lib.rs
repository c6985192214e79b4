//! Monitoring session controller for an external packet-capture service.
//!
//! Drives a per-session capture service over its HTTP control protocol,
//! reconciles the artifacts it writes to disk with in-memory view state,
//! and presents large capture results page by page. The service pushes
//! nothing; all reconciliation is pull-based and tolerates missing or
//! stale files.

pub mod control;
pub mod models;
pub mod session;
pub mod store;
pub mod utils;

pub use control::client::ApplyOutcome;
pub use models::filter::FilterConfig;
pub use models::record::{CaptureRecord, RecordSummary};
pub use session::monitor::{NetworkStatusSource, SaveDialog, SessionMonitor};
pub use store::layout::SessionLayout;
pub use utils::error::{MonitorError, MonitorResult};
