use log::{debug, info, warn};
use std::path::PathBuf;

use crate::control::client::{ApplyOutcome, ControlClient};
use crate::models::filter::FilterConfig;
use crate::models::record::CaptureRecord;
use crate::session::pager::RecordPager;
use crate::store::artifacts::ArtifactStore;
use crate::store::layout::SessionLayout;
use crate::utils::error::{MonitorError, MonitorResult};

/// Externally observed status of the network a session belongs to.
///
/// The monitor consults this to detect that the owning network was shut
/// down underneath a running capture, in which case the capture process
/// is already gone and no `/stop` call should be issued.
pub trait NetworkStatusSource {
    fn is_network_running(&self, session_id: u64) -> bool;
}

/// Destination chooser for archive export.
pub trait SaveDialog {
    /// Pick where to write the archive; `None` means the user cancelled.
    fn pick_destination(&mut self, suggested_name: &str) -> Option<PathBuf>;
}

/// Controller for one monitoring session.
///
/// Owns the entire in-memory view state and reconciles it with the two
/// external sources of truth it cannot subscribe to: the capture
/// service's running state (reachable only through control calls) and
/// the artifacts the service writes to disk (re-read at defined points:
/// open, after stop, after save, after clear). Everything held here is a
/// possibly-stale cache of that external truth.
///
/// Exactly one control operation may be in flight per session. The busy
/// flag is a reject-if-busy guard, not a queue; it clears on every exit
/// path, success or failure.
pub struct SessionMonitor {
    store: ArtifactStore,
    client: ControlClient,

    /// Liveness: false until [`open`](Self::open), false again after
    /// [`close`](Self::close). Guards every other operation.
    open: bool,

    running: bool,
    busy: bool,
    loading: bool,
    config_edit: bool,
    config_exists: bool,

    /// Edit form for the filter config. Loaded from disk at most once
    /// per open (edge-triggered on the first entry into edit mode).
    form: FilterConfig,
    form_loaded: bool,

    /// `None` = no data yet (never ran, or artifact missing/corrupt);
    /// `Some(empty)` = ran and produced nothing. The distinction is
    /// deliberate and visible to consumers.
    records: Option<Vec<CaptureRecord>>,
    pager: RecordPager,

    last_config_error: Option<String>,
    archive_file_name: Option<String>,
}

impl SessionMonitor {
    pub fn new(layout: SessionLayout) -> MonitorResult<Self> {
        let client = ControlClient::new(layout.control_endpoint.clone())?;
        Ok(Self {
            store: ArtifactStore::new(layout),
            client,
            open: false,
            running: false,
            busy: false,
            loading: false,
            config_edit: false,
            config_exists: false,
            form: FilterConfig::default(),
            form_loaded: false,
            records: None,
            pager: RecordPager::default(),
            last_config_error: None,
            archive_file_name: None,
        })
    }

    /// Open the monitoring view for this session: reset all view state
    /// and reconcile from disk. The running flag starts out false; the
    /// service offers no status query, so a capture left running by a
    /// previous view is only discovered when the user stops it.
    pub async fn open(&mut self) -> MonitorResult<()> {
        info!("Opening monitoring session {}", self.session_id());
        self.open = true;
        self.running = false;
        self.busy = false;
        self.config_edit = false;
        self.form = FilterConfig::default();
        self.form_loaded = false;
        self.last_config_error = None;
        self.config_exists = self.store.config_exists();
        self.reload_output(self.config_exists).await;
        Ok(())
    }

    /// Dismiss the view. Drops the loaded records and expansion state.
    /// Deliberately does not call `/stop`: closing the view is not the
    /// same as stopping the capture.
    pub fn close(&mut self) {
        info!("Closing monitoring session {}", self.session_id());
        self.open = false;
        self.records = None;
        self.pager.rebind(0);
        self.config_edit = false;
        self.form_loaded = false;
    }

    /// Start or stop the capture, depending on the current direction.
    pub async fn toggle_capture(&mut self) -> MonitorResult<bool> {
        if self.running {
            self.stop_capture().await?;
        } else {
            self.start_capture().await?;
        }
        Ok(self.running)
    }

    /// Ask the service to start capturing. Clears the loaded records:
    /// no data exists yet for the new run. On transport failure the
    /// running flag keeps its prior value.
    pub async fn start_capture(&mut self) -> MonitorResult<()> {
        self.begin()?;
        let result = self.start_capture_inner().await;
        self.busy = false;
        result
    }

    async fn start_capture_inner(&mut self) -> MonitorResult<()> {
        self.client.start().await?;
        self.running = true;
        self.records = None;
        self.pager.rebind(0);
        info!("Session {} capture is now running", self.session_id());
        Ok(())
    }

    /// Ask the service to stop capturing, then reload the output: the
    /// service finalizes and merges its artifacts on stop. Stopping an
    /// already-stopped capture is harmless; the call is idempotent at
    /// the protocol level.
    pub async fn stop_capture(&mut self) -> MonitorResult<()> {
        self.begin()?;
        let result = self.stop_capture_inner().await;
        self.busy = false;
        result
    }

    async fn stop_capture_inner(&mut self) -> MonitorResult<()> {
        self.client.stop().await?;
        self.running = false;
        self.reload_output(self.config_exists).await;
        info!("Session {} capture is now stopped", self.session_id());
        Ok(())
    }

    /// Enter configuration edit mode. On the first entry since opening,
    /// the stored config (if any) is loaded into the form; later entries
    /// keep whatever the form already holds.
    pub async fn enter_config_edit(&mut self) -> MonitorResult<()> {
        self.ensure_idle()?;
        if !self.form_loaded {
            self.form = if self.config_exists {
                self.store.load_config().await.unwrap_or_default()
            } else {
                FilterConfig::default()
            };
            self.form_loaded = true;
        }
        self.config_edit = true;
        Ok(())
    }

    /// Leave configuration edit mode. No implicit save or revert.
    pub fn exit_config_edit(&mut self) {
        self.config_edit = false;
    }

    /// Send a filter configuration to the service.
    ///
    /// A compile warning is partial success: the config counts as saved,
    /// the warning is kept for display, and the raw (unfiltered) output
    /// is shown because the filtered artifact is not trustworthy after a
    /// failed compile. On transport failure nothing changes.
    pub async fn save_config(&mut self, config: FilterConfig) -> MonitorResult<ApplyOutcome> {
        self.begin()?;
        let result = self.save_config_inner(config).await;
        self.busy = false;
        result
    }

    async fn save_config_inner(&mut self, config: FilterConfig) -> MonitorResult<ApplyOutcome> {
        let outcome = self.client.apply_config(&config).await?;
        self.form = config;
        self.form_loaded = true;
        self.config_exists = true;
        match &outcome {
            ApplyOutcome::Accepted => {
                self.last_config_error = None;
                self.reload_output(true).await;
            }
            ApplyOutcome::CompiledWithWarning { message } => {
                warn!(
                    "Session {} filter compiled with warning: {}",
                    self.session_id(),
                    message
                );
                self.last_config_error = Some(message.clone());
                self.reload_output(false).await;
            }
        }
        Ok(outcome)
    }

    /// Ask the service to delete the stored config. The edit form resets
    /// to defaults whether or not the call succeeds; the on-disk truth
    /// (`config_exists`) only changes on success.
    pub async fn clear_config(&mut self) -> MonitorResult<()> {
        self.begin()?;
        let result = self.clear_config_inner().await;
        self.busy = false;
        result
    }

    async fn clear_config_inner(&mut self) -> MonitorResult<()> {
        let result = self.client.clear_config().await;
        self.form = FilterConfig::default();
        self.form_loaded = true;
        match result {
            Ok(()) => {
                self.config_exists = false;
                self.last_config_error = None;
                self.reload_output(false).await;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Session {} failed to clear filter config: {}",
                    self.session_id(),
                    e
                );
                Err(e)
            }
        }
    }

    /// Reconcile with the owning network's externally observed status.
    /// When the network stopped underneath a running capture, the
    /// capture process is already gone: force the flag without a `/stop`
    /// call.
    pub fn sync_network_status(&mut self, source: &dyn NetworkStatusSource) {
        if self.open && self.running && !source.is_network_running(self.session_id()) {
            info!(
                "Network for session {} is no longer running; marking capture stopped",
                self.session_id()
            );
            self.running = false;
        }
    }

    /// Export the authoritative archive to a user-chosen destination.
    ///
    /// `Err(NoArchive)` when nothing has been produced yet (reported
    /// before any destination is asked for); `Ok(None)` when the user
    /// cancelled the dialog.
    pub async fn export_archive(
        &mut self,
        dialog: &mut dyn SaveDialog,
    ) -> MonitorResult<Option<PathBuf>> {
        self.begin()?;
        let result = self.export_archive_inner(dialog).await;
        self.busy = false;
        result
    }

    async fn export_archive_inner(
        &mut self,
        dialog: &mut dyn SaveDialog,
    ) -> MonitorResult<Option<PathBuf>> {
        let archive = self
            .store
            .resolve_archive(self.config_exists)
            .ok_or(MonitorError::NoArchive)?;
        let Some(dest) = dialog.pick_destination(&archive.display_name) else {
            debug!("Archive export cancelled for session {}", self.session_id());
            return Ok(None);
        };
        self.store.export_archive(&archive, &dest).await?;
        Ok(Some(dest))
    }

    /// Re-read the output artifact and re-derive everything downstream
    /// of it. Runs strictly before the busy flag clears, so a consumer
    /// seeing `busy == false` sees state consistent with the last
    /// completed operation.
    async fn reload_output(&mut self, use_filtered: bool) {
        self.loading = true;
        self.records = self.store.load_output(use_filtered).await;
        let len = self.records.as_ref().map_or(0, Vec::len);
        self.pager.rebind(len);
        self.archive_file_name = self
            .store
            .resolve_archive(self.config_exists)
            .map(|a| a.display_name);
        self.loading = false;
    }

    fn begin(&mut self) -> MonitorResult<()> {
        self.ensure_idle()?;
        self.busy = true;
        Ok(())
    }

    fn ensure_idle(&self) -> MonitorResult<()> {
        if !self.open {
            return Err(MonitorError::Closed);
        }
        if self.busy {
            return Err(MonitorError::Busy);
        }
        Ok(())
    }

    // --- observable state ---

    pub fn session_id(&self) -> u64 {
        self.store.layout().session_id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_config_edit(&self) -> bool {
        self.config_edit
    }

    pub fn config_exists(&self) -> bool {
        self.config_exists
    }

    /// The current edit form contents.
    pub fn form(&self) -> &FilterConfig {
        &self.form
    }

    /// Mutable access for the editing surface. Gated fields stay in the
    /// struct even while hidden; the surface decides what to show via
    /// the form's visibility helpers.
    pub fn form_mut(&mut self) -> &mut FilterConfig {
        &mut self.form
    }

    pub fn last_config_error(&self) -> Option<&str> {
        self.last_config_error.as_deref()
    }

    pub fn archive_file_name(&self) -> Option<&str> {
        self.archive_file_name.as_deref()
    }

    /// All loaded records; `None` when no data exists yet.
    pub fn records(&self) -> Option<&[CaptureRecord]> {
        self.records.as_deref()
    }

    /// The records of the current page (empty when no data is loaded).
    pub fn page_records(&self) -> &[CaptureRecord] {
        match &self.records {
            Some(records) => &records[self.pager.page_range()],
            None => &[],
        }
    }

    pub fn page(&self) -> usize {
        self.pager.page()
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count()
    }

    pub fn set_page(&mut self, page: usize) {
        self.pager.set_page(page);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.pager.set_page_size(page_size);
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.pager.is_expanded(index)
    }

    pub fn toggle_expanded(&mut self, index: usize) {
        self.pager.toggle_expanded(index);
    }

    #[cfg(test)]
    pub(crate) fn force_busy(&mut self) {
        self.busy = true;
    }

    #[cfg(test)]
    pub(crate) fn force_running(&mut self) {
        self.running = true;
    }
}
