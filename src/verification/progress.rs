use crate::sheet::RowStatus;
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ProgressKind {
    Row {
        index: usize,
        status: RowStatus,
        skipped: bool,
    },
    Completed,
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub message: String,
    /// 0-100, never decreasing within a run.
    pub percent_complete: f64,
    pub kind: ProgressKind,
}

impl ProgressEvent {
    pub fn row(index: usize, total: usize, status: RowStatus, skipped: bool) -> Self {
        Self {
            message: format!("processing {}/{}", index + 1, total),
            percent_complete: percent(index + 1, total),
            kind: ProgressKind::Row {
                index,
                status,
                skipped,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.kind, ProgressKind::Row { .. })
    }
}

pub fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        (done as f64 / total as f64 * 100.0).min(100.0)
    }
}

/// Single-producer FIFO from the worker to whoever renders progress.
/// Unbounded: a run emits at most one event per row plus one.
pub fn progress_channel() -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ProgressSender { tx }, ProgressReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct ProgressSender {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ProgressSender {
    pub fn emit(&self, event: ProgressEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Progress receiver dropped, event discarded");
        }
    }
}

#[derive(Debug)]
pub struct ProgressReceiver {
    rx: mpsc::UnboundedReceiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Everything queued so far, oldest first. Never waits.
    pub fn drain(&mut self) -> Vec<ProgressEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }
}
