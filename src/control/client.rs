use log::{info, warn};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::control::diagnostics;
use crate::models::filter::FilterConfig;
use crate::utils::error::{MonitorError, MonitorResult};

/// How long to wait for the control service before giving up. The
/// service offers no liveness signal, so a hung request must not hold
/// the session busy forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of applying a filter configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// The config was stored and the derived filter compiled cleanly
    Accepted,

    /// The config was stored but the derived filter failed to compile;
    /// carries the summarized tool diagnostic. Partial success, not a
    /// failure: the saved config stays in effect on disk.
    CompiledWithWarning { message: String },
}

/// Body of a 422 response from `POST /config`.
#[derive(Deserialize)]
struct ConfigErrorBody {
    error: String,
}

/// Client for one session's capture control service.
///
/// All four operations are idempotent at the protocol level; repeating a
/// call cannot corrupt service state. Serializing calls per session is
/// the caller's responsibility (the session monitor's busy guard).
pub struct ControlClient {
    http: reqwest::Client,
    endpoint: String,
}

impl ControlClient {
    pub fn new(endpoint: impl Into<String>) -> MonitorResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// Ask the service to start capturing.
    pub async fn start(&self) -> MonitorResult<()> {
        self.simple_get("/start").await
    }

    /// Ask the service to stop capturing and finalize its artifacts.
    pub async fn stop(&self) -> MonitorResult<()> {
        self.simple_get("/stop").await
    }

    /// Send a filter configuration to the service.
    ///
    /// 422 means the service stored the config but could not apply the
    /// derived filter; the response's raw diagnostic is summarized for
    /// display. Any other non-2xx status is a hard failure.
    pub async fn apply_config(&self, config: &FilterConfig) -> MonitorResult<ApplyOutcome> {
        let url = format!("{}/config", self.endpoint);
        let response = self.http.post(&url).json(config).send().await?;
        let status = response.status();

        if status.is_success() {
            info!("Filter config accepted by {}", url);
            return Ok(ApplyOutcome::Accepted);
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await?;
            let raw = match serde_json::from_str::<ConfigErrorBody>(&body) {
                Ok(parsed) => parsed.error,
                // Not the documented shape; summarize the body as-is.
                Err(_) => body,
            };
            let message = diagnostics::summarize(&raw);
            warn!("Filter config stored but failed to compile: {}", message);
            return Ok(ApplyOutcome::CompiledWithWarning { message });
        }

        warn!("Filter config rejected by {} with status {}", url, status);
        Err(MonitorError::Rejected(status))
    }

    /// Ask the service to delete the stored config and its filtered
    /// artifacts.
    pub async fn clear_config(&self) -> MonitorResult<()> {
        self.simple_get("/cleanConf").await
    }

    async fn simple_get(&self, path: &str) -> MonitorResult<()> {
        let url = format!("{}{}", self.endpoint, path);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if status.is_success() {
            info!("GET {} ok", url);
            Ok(())
        } else {
            warn!("GET {} returned status {}", url, status);
            Err(MonitorError::Rejected(status))
        }
    }
}
