use std::path::{Path, PathBuf};

/// Where a session's control endpoint and on-disk artifacts live.
///
/// Everything is derived deterministically from the networks root and the
/// numeric session id: the capture service for session `N` listens on
/// port `39` + zero-padded `N`, and writes its artifacts under the
/// session's shared data volume.
#[derive(Debug, Clone)]
pub struct SessionLayout {
    /// Numeric session identifier
    pub session_id: u64,

    /// Base URL of the session's capture control service
    pub control_endpoint: String,

    /// Directory the capture service writes artifacts into
    pub storage_root: PathBuf,
}

impl SessionLayout {
    pub fn new(networks_root: impl AsRef<Path>, session_id: u64) -> Self {
        let storage_root = networks_root
            .as_ref()
            .join(session_id.to_string())
            .join("volumes")
            .join("shared_data");
        Self {
            session_id,
            control_endpoint: format!("http://localhost:39{:03}", session_id),
            storage_root,
        }
    }

    /// Replace the derived endpoint, for tests and port-forwarded setups.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.control_endpoint = endpoint.into();
        self
    }

    /// The filter configuration artifact. Absent means no filter is active.
    pub fn config_path(&self) -> PathBuf {
        self.storage_root.join("config.json")
    }

    /// The JSON capture output that is authoritative given whether a
    /// filter configuration currently exists.
    pub fn output_path(&self, config_exists: bool) -> PathBuf {
        if config_exists {
            self.storage_root.join("filtered.json")
        } else {
            self.storage_root.join("output.json")
        }
    }

    /// The filtered binary archive, only meaningful when a config exists.
    pub fn filtered_archive_path(&self) -> PathBuf {
        self.storage_root.join("filtered.pcap")
    }

    /// The merged (unfiltered) binary archive.
    pub fn merged_archive_path(&self) -> PathBuf {
        self.storage_root.join("merged.pcap")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_zero_padded_control_port() {
        assert_eq!(
            SessionLayout::new("/nets", 7).control_endpoint,
            "http://localhost:39007"
        );
        assert_eq!(
            SessionLayout::new("/nets", 123).control_endpoint,
            "http://localhost:39123"
        );
    }

    #[test]
    fn derives_artifact_paths_under_shared_data() {
        let layout = SessionLayout::new("/nets", 7);
        assert_eq!(
            layout.config_path(),
            PathBuf::from("/nets/7/volumes/shared_data/config.json")
        );
        assert_eq!(
            layout.output_path(false),
            PathBuf::from("/nets/7/volumes/shared_data/output.json")
        );
        assert_eq!(
            layout.output_path(true),
            PathBuf::from("/nets/7/volumes/shared_data/filtered.json")
        );
    }

    #[test]
    fn endpoint_override_keeps_paths() {
        let layout = SessionLayout::new("/nets", 7).with_endpoint("http://127.0.0.1:55123");
        assert_eq!(layout.control_endpoint, "http://127.0.0.1:55123");
        assert_eq!(layout.storage_root, PathBuf::from("/nets/7/volumes/shared_data"));
    }
}
