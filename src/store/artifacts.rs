use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::models::filter::FilterConfig;
use crate::models::record::CaptureRecord;
use crate::store::layout::SessionLayout;
use crate::utils::error::MonitorResult;

/// A binary capture archive that can be exported.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveInfo {
    /// Full path of the archive on disk
    pub path: PathBuf,

    /// File name suggested to the user when exporting
    pub display_name: String,
}

/// Best-effort reader of the artifacts the capture service writes.
///
/// The service writes these files asynchronously at its own cadence, so
/// every read here is defensive: a missing or half-written (non-JSON)
/// file is ordinary and reads as "no data", never as an error.
pub struct ArtifactStore {
    layout: SessionLayout,
}

impl ArtifactStore {
    pub fn new(layout: SessionLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &SessionLayout {
        &self.layout
    }

    /// Whether a filter configuration artifact is present on disk.
    pub fn config_exists(&self) -> bool {
        self.layout.config_path().is_file()
    }

    /// Load the capture output that is authoritative for the given
    /// config state. `None` means absent or unparseable, which callers
    /// must treat the same as "not started yet".
    pub async fn load_output(&self, config_exists: bool) -> Option<Vec<CaptureRecord>> {
        let path = self.layout.output_path(config_exists);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No capture output at {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice::<Vec<CaptureRecord>>(&bytes) {
            Ok(records) => {
                info!("Loaded {} capture records from {}", records.len(), path.display());
                Some(records)
            }
            Err(e) => {
                // Possibly mid-write by the service; treat as absent.
                debug!("Capture output at {} is not valid JSON: {}", path.display(), e);
                None
            }
        }
    }

    /// Load the stored filter configuration, if any.
    pub async fn load_config(&self) -> Option<FilterConfig> {
        let path = self.layout.config_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("No filter config at {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(config) => Some(config),
            Err(e) => {
                debug!("Filter config at {} is not valid JSON: {}", path.display(), e);
                None
            }
        }
    }

    /// Resolve the archive to offer for export: the filtered archive when
    /// a config exists and it is present, else the merged archive, else
    /// `None`. No archive simply means there is nothing to export yet.
    pub fn resolve_archive(&self, config_exists: bool) -> Option<ArchiveInfo> {
        if config_exists {
            let filtered = self.layout.filtered_archive_path();
            if filtered.is_file() {
                return Some(ArchiveInfo {
                    path: filtered,
                    display_name: "filtered.pcap".to_string(),
                });
            }
        }
        let merged = self.layout.merged_archive_path();
        if merged.is_file() {
            return Some(ArchiveInfo {
                path: merged,
                display_name: "merged.pcap".to_string(),
            });
        }
        None
    }

    /// Copy an archive to a user-chosen destination. One-shot; the
    /// archive files are never modified in place by this crate.
    pub async fn export_archive(&self, archive: &ArchiveInfo, dest: &Path) -> MonitorResult<u64> {
        let bytes = tokio::fs::copy(&archive.path, dest).await?;
        info!(
            "Exported {} ({} bytes) to {}",
            archive.display_name,
            bytes,
            dest.display()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn store_with_root() -> (TempDir, ArtifactStore) {
        let root = TempDir::new().unwrap();
        let layout = SessionLayout::new(root.path(), 7);
        fs::create_dir_all(&layout.storage_root).unwrap();
        (root, ArtifactStore::new(layout))
    }

    #[tokio::test]
    async fn missing_output_reads_as_none() {
        let (_root, store) = store_with_root();
        assert!(!store.config_exists());
        assert!(store.load_output(false).await.is_none());
        assert!(store.load_config().await.is_none());
    }

    #[tokio::test]
    async fn corrupt_output_reads_as_none() {
        let (_root, store) = store_with_root();
        fs::write(store.layout().output_path(false), b"[{\"truncated\":").unwrap();
        assert!(store.load_output(false).await.is_none());
    }

    #[tokio::test]
    async fn output_path_tracks_config_presence() {
        let (_root, store) = store_with_root();
        fs::write(store.layout().output_path(false), b"[{\"a\": 1}]").unwrap();
        fs::write(store.layout().output_path(true), b"[]").unwrap();

        assert!(!store.config_exists());
        assert_eq!(store.load_output(store.config_exists()).await.unwrap().len(), 1);

        fs::write(store.layout().config_path(), b"{}").unwrap();
        assert!(store.config_exists());
        // Filtered output is authoritative now, and it is empty: a valid,
        // distinct state from "no data".
        assert_eq!(store.load_output(store.config_exists()).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn archive_prefers_filtered_then_falls_back() {
        let (_root, store) = store_with_root();
        assert_eq!(store.resolve_archive(true), None);

        fs::write(store.layout().merged_archive_path(), b"pcap").unwrap();
        let merged = store.resolve_archive(true).unwrap();
        assert_eq!(merged.display_name, "merged.pcap");

        fs::write(store.layout().filtered_archive_path(), b"pcap").unwrap();
        let filtered = store.resolve_archive(true).unwrap();
        assert_eq!(filtered.display_name, "filtered.pcap");

        // Without a config the filtered archive is not considered.
        let raw = store.resolve_archive(false).unwrap();
        assert_eq!(raw.display_name, "merged.pcap");
    }

    #[tokio::test]
    async fn export_copies_archive_verbatim() {
        let (root, store) = store_with_root();
        fs::write(store.layout().merged_archive_path(), b"binary archive bytes").unwrap();
        let archive = store.resolve_archive(false).unwrap();

        let dest = root.path().join("out.pcap");
        let copied = store.export_archive(&archive, &dest).await.unwrap();
        assert_eq!(copied, 20);
        assert_eq!(fs::read(dest).unwrap(), b"binary archive bytes");
    }
}
