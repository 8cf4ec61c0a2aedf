use crate::sheet::{RowStatus, RowStore, SheetFormat};
use crate::state::{RunCounts, RunReport, RunState};
use crate::utils::{AppConfig, Result, VerifierError};
use crate::verification::client::{CorrectionClient, CorrectionRequest, HttpCorrectionClient};
use crate::verification::fingerprint::process_fingerprint;
use crate::verification::progress::{
    percent, progress_channel, ProgressEvent, ProgressKind, ProgressReceiver, ProgressSender,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Cloneable handle that requests cancellation of the current run.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

/// Sends every unprocessed row of a [`RowStore`] to the correction service on
/// a background task.
///
/// At most one run is active at a time. The worker owns the store while it
/// runs and persists it to the output path after every row; progress is
/// appended to the channel returned by [`VerificationPipeline::new`].
/// Cancellation is observed between rows, never during a request.
pub struct VerificationPipeline<C: CorrectionClient> {
    client: Arc<C>,
    identity_token: Option<String>,
    progress: ProgressSender,
    cancel: Arc<AtomicBool>,
    state: watch::Receiver<RunState>,
    worker: Option<JoinHandle<RunReport>>,
}

impl VerificationPipeline<HttpCorrectionClient> {
    pub fn from_config(config: &AppConfig) -> Result<(Self, ProgressReceiver)> {
        let client = HttpCorrectionClient::new(&config.api)?;
        tracing::debug!(endpoint = client.endpoint(), "Correction client ready");
        Ok(Self::new(
            Arc::new(client),
            config.api.identity_token.clone(),
        ))
    }
}

impl<C: CorrectionClient> VerificationPipeline<C> {
    /// `identity_token` replaces the executable fingerprint as the request hash.
    pub fn new(client: Arc<C>, identity_token: Option<String>) -> (Self, ProgressReceiver) {
        let (progress, receiver) = progress_channel();
        let (_, state) = watch::channel(RunState::Idle);

        let pipeline = Self {
            client,
            identity_token,
            progress,
            cancel: Arc::new(AtomicBool::new(false)),
            state,
            worker: None,
        };
        (pipeline, receiver)
    }

    pub fn state(&self) -> RunState {
        let state = *self.state.borrow();
        // a worker that died without reporting still counts as finished
        if state == RunState::Running && self.worker.as_ref().map_or(true, |h| h.is_finished()) {
            return RunState::Failed;
        }
        state
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunState::Running
    }

    /// Begins a run over `store`, writing results to `output`.
    ///
    /// Rejected with [`VerifierError::AlreadyRunning`] while a run is active.
    /// Configuration problems are returned here, before any row is touched.
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, store: RowStore, output: impl Into<PathBuf>) -> Result<()> {
        if self.is_running() {
            tracing::warn!("Start requested while a run is active, ignoring");
            return Err(VerifierError::AlreadyRunning);
        }

        let output = output.into();
        preflight_output(&output)?;

        let token = match &self.identity_token {
            Some(token) => token.clone(),
            None => process_fingerprint()
                .map_err(|e| VerifierError::ConfigError(format!("fingerprint: {}", e)))?
                .to_string(),
        };

        if self.worker.take().is_some() {
            tracing::debug!("Discarding report of previous run that was never joined");
        }

        self.cancel.store(false, Ordering::SeqCst);
        let (state_tx, state_rx) = watch::channel(RunState::Running);
        self.state = state_rx;

        let worker = Worker {
            run_id: Uuid::new_v4(),
            client: Arc::clone(&self.client),
            token,
            store,
            output,
            progress: self.progress.clone(),
            cancel: Arc::clone(&self.cancel),
            state: state_tx,
            counts: RunCounts::default(),
            persisted: false,
        };

        tracing::info!(
            run_id = %worker.run_id,
            rows = worker.store.len(),
            output = %worker.output.display(),
            "Starting verification run"
        );

        self.worker = Some(tokio::spawn(worker.run()));
        Ok(())
    }

    /// Asks the active run to stop before its next row.
    pub fn cancel(&self) {
        if self.is_running() {
            tracing::info!("Cancellation requested");
        }
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancel),
        }
    }

    /// Waits for the current run to end and takes back its store.
    /// Returns `None` when nothing was started. Leaves the pipeline idle.
    pub async fn join(&mut self) -> Result<Option<RunReport>> {
        let Some(handle) = self.worker.take() else {
            return Ok(None);
        };

        let result = handle.await;
        let (_, idle) = watch::channel(RunState::Idle);
        self.state = idle;

        result
            .map(Some)
            .map_err(|e| VerifierError::WorkerFailed(e.to_string()))
    }
}

fn preflight_output(output: &Path) -> Result<()> {
    if output.as_os_str().is_empty() {
        return Err(VerifierError::ConfigError("empty output path".to_string()));
    }
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            return Err(VerifierError::ConfigError(format!(
                "output directory does not exist: {}",
                parent.display()
            )));
        }
    }
    SheetFormat::ensure_writable(output)?;
    Ok(())
}

struct Worker<C> {
    run_id: Uuid,
    client: Arc<C>,
    token: String,
    store: RowStore,
    output: PathBuf,
    progress: ProgressSender,
    cancel: Arc<AtomicBool>,
    state: watch::Sender<RunState>,
    counts: RunCounts,
    persisted: bool,
}

impl<C: CorrectionClient> Worker<C> {
    async fn run(mut self) -> RunReport {
        let total = self.store.len();
        let mut processed = 0;
        let mut outcome = RunState::Completed;
        let mut error = None;

        for index in 0..total {
            if self.cancel.load(Ordering::SeqCst) {
                outcome = RunState::Cancelled;
                break;
            }

            let result = self.process_row(index, total).await;
            processed = index + 1;

            if let Err(e) = result {
                tracing::error!(run_id = %self.run_id, row = index, error = %e, "Run halted");
                outcome = RunState::Failed;
                error = Some(format!("row {}: {}", index + 1, e));
                break;
            }
        }

        if outcome == RunState::Completed && !self.persisted {
            if let Err(e) = self.store.save(&self.output) {
                tracing::error!(run_id = %self.run_id, error = %e, "Final save failed");
                outcome = RunState::Failed;
                error = Some(e.to_string());
            }
        }

        self.progress
            .emit(self.terminal_event(outcome, processed, total, error.as_deref()));

        tracing::info!(
            run_id = %self.run_id,
            state = %outcome,
            processed,
            succeeded = self.counts.succeeded,
            failed = self.counts.failed,
            skipped = self.counts.skipped,
            "Verification run finished"
        );

        let _ = self.state.send(outcome);

        RunReport {
            run_id: self.run_id,
            state: outcome,
            store: self.store,
            output: self.output,
            counts: self.counts,
            rows_processed: processed,
            error,
        }
    }

    /// Handles one row. An `Err` means the run must stop after this row; the
    /// row itself has already been recorded and reported.
    async fn process_row(&mut self, index: usize, total: usize) -> Result<()> {
        let request = {
            let row = self.store.row(index).ok_or(VerifierError::RowOutOfRange {
                index,
                len: total,
            })?;

            if row.status() == RowStatus::Success {
                self.counts.skipped += 1;
                self.progress
                    .emit(ProgressEvent::row(index, total, RowStatus::Success, true));
                return Ok(());
            }

            CorrectionRequest {
                hash: self.token.clone(),
                content: row.before().to_string(),
            }
        };

        self.counts.remote_calls += 1;
        let mut halt = None;
        let (status, after) = match self.client.correct(&request).await {
            Ok(response) if response.success => {
                self.counts.succeeded += 1;
                (RowStatus::Success, response.message)
            }
            Ok(response) => {
                tracing::warn!(
                    run_id = %self.run_id,
                    row = index,
                    message = %response.message,
                    "Service declined row"
                );
                self.counts.failed += 1;
                (RowStatus::Fail, response.message)
            }
            Err(e) if e.is_transport() => {
                tracing::error!(run_id = %self.run_id, row = index, error = %e, "Transport failure");
                self.counts.failed += 1;
                let description = format!("error: {}", e);
                halt = Some(e);
                (RowStatus::Fail, description)
            }
            Err(e) => {
                tracing::warn!(run_id = %self.run_id, row = index, error = %e, "Row rejected");
                self.counts.failed += 1;
                (RowStatus::Fail, format!("error: {}", e))
            }
        };

        self.store.set_result(index, status, &after)?;

        match self.store.save(&self.output) {
            Ok(()) => self.persisted = true,
            Err(e) => {
                tracing::error!(run_id = %self.run_id, row = index, error = %e, "Persist failed");
                halt.get_or_insert(e);
            }
        }

        self.progress
            .emit(ProgressEvent::row(index, total, status, false));

        match halt {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn terminal_event(
        &self,
        outcome: RunState,
        processed: usize,
        total: usize,
        error: Option<&str>,
    ) -> ProgressEvent {
        let (message, percent_complete, kind) = match outcome {
            RunState::Cancelled => (
                format!("verification cancelled after {}/{} rows", processed, total),
                percent(processed, total),
                ProgressKind::Cancelled,
            ),
            RunState::Failed => (
                format!(
                    "verification stopped: {}",
                    error.unwrap_or("unknown error")
                ),
                percent(processed, total),
                ProgressKind::Failed,
            ),
            _ => (
                format!(
                    "verification complete ({} succeeded, {} failed), results saved to {}",
                    self.counts.succeeded + self.counts.skipped,
                    self.counts.failed,
                    self.output.display()
                ),
                100.0,
                ProgressKind::Completed,
            ),
        };

        ProgressEvent {
            message,
            percent_complete,
            kind,
        }
    }
}
