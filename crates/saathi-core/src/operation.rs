//! Background work with cooperative pause, resume, and stop.
//!
//! A `LongRunningOperation` runs `units` calls of a work function on one
//! spawned tokio task. Pause is a `watch` flag the loop checks before each
//! unit; stop cancels a `CancellationToken`. Neither interrupts a unit that
//! is already running.
//!
//! ```text
//! Pending -> Running -> Completed
//!              |  ^
//!              v  |     (unit error or stop) -> Failed
//!             Paused
//! ```

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use saathi_types::operation::{OperationSnapshot, OperationStatus};
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Units of work used when the caller has no better split.
pub const DEFAULT_UNITS: u32 = 4;

const STOPPED: &str = "operation stopped";

#[derive(Debug)]
struct OperationState {
    status: OperationStatus,
    progress: u8,
    result: Option<Value>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl OperationState {
    fn new() -> Self {
        Self {
            status: OperationStatus::Pending,
            progress: 0,
            result: None,
            error: None,
            started_at: None,
            updated_at: Utc::now(),
            completed_at: None,
        }
    }

    fn finish(&mut self, status: OperationStatus) {
        let now = Utc::now();
        self.status = status;
        self.updated_at = now;
        self.completed_at = Some(now);
    }
}

type SharedState = Arc<Mutex<OperationState>>;

/// A pausable background operation.
pub struct LongRunningOperation {
    id: String,
    state: SharedState,
    pause_tx: watch::Sender<bool>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LongRunningOperation {
    pub fn new() -> Self {
        Self::with_id(format!("op_{}", Uuid::now_v7().simple()))
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        let (pause_tx, _) = watch::channel(false);
        Self {
            id: id.into(),
            state: Arc::new(Mutex::new(OperationState::new())),
            pause_tx,
            cancel: CancellationToken::new(),
            handle: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Spawn the work loop. Only valid from `Pending`; otherwise a no-op
    /// that returns `false`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut, E>(&self, units: u32, work: F) -> bool
    where
        F: FnMut(u32) -> Fut + Send + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        {
            let mut state = self.lock_state();
            if state.status != OperationStatus::Pending {
                warn!(operation = %self.id, status = %state.status, "start refused");
                return false;
            }
            let now = Utc::now();
            state.status = OperationStatus::Running;
            state.started_at = Some(now);
            state.updated_at = now;
        }
        info!(operation = %self.id, units, "operation started");

        let handle = tokio::spawn(run_units(
            self.id.clone(),
            Arc::clone(&self.state),
            self.pause_tx.subscribe(),
            self.cancel.clone(),
            units,
            work,
        ));
        *self.handle.lock().expect("operation handle lock poisoned") = Some(handle);
        true
    }

    /// Pause before the next unit. Only valid from `Running`.
    pub fn pause(&self) -> bool {
        self.transition(OperationStatus::Running, OperationStatus::Paused, true)
    }

    /// Continue after a pause. Only valid from `Paused`.
    pub fn resume(&self) -> bool {
        self.transition(OperationStatus::Paused, OperationStatus::Running, false)
    }

    /// Stop the operation. Valid from any non-terminal state; the
    /// operation ends as `Failed` with error "operation stopped".
    pub fn stop(&self) -> bool {
        {
            let mut state = self.lock_state();
            if state.status.is_terminal() {
                warn!(operation = %self.id, status = %state.status, "stop refused");
                return false;
            }
            state.error = Some(STOPPED.to_string());
            state.finish(OperationStatus::Failed);
        }
        self.cancel.cancel();
        info!(operation = %self.id, "operation stopped");
        true
    }

    pub fn status(&self) -> OperationSnapshot {
        let state = self.lock_state();
        OperationSnapshot {
            operation_id: self.id.clone(),
            status: state.status,
            progress: state.progress,
            result: state.result.clone(),
            error: state.error.clone(),
            started_at: state.started_at,
            updated_at: state.updated_at,
            completed_at: state.completed_at,
        }
    }

    /// Wait for the background task to exit. Returns immediately if the
    /// operation was never started or has already been waited on.
    pub async fn wait(&self) {
        let handle = self
            .handle
            .lock()
            .expect("operation handle lock poisoned")
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(operation = %self.id, error = %e, "operation task did not join");
            }
        }
    }

    fn transition(&self, from: OperationStatus, to: OperationStatus, paused: bool) -> bool {
        {
            let mut state = self.lock_state();
            if state.status != from {
                warn!(
                    operation = %self.id,
                    status = %state.status,
                    requested = %to,
                    "transition refused"
                );
                return false;
            }
            state.status = to;
            state.updated_at = Utc::now();
        }
        self.pause_tx.send_replace(paused);
        info!(operation = %self.id, status = %to, "operation state changed");
        true
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, OperationState> {
        self.state.lock().expect("operation state lock poisoned")
    }
}

impl Default for LongRunningOperation {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LongRunningOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongRunningOperation")
            .field("id", &self.id)
            .field("status", &self.lock_state().status)
            .finish()
    }
}

async fn run_units<F, Fut, E>(
    id: String,
    state: SharedState,
    mut pause_rx: watch::Receiver<bool>,
    cancel: CancellationToken,
    units: u32,
    mut work: F,
) where
    F: FnMut(u32) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Value, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    if units == 0 {
        let mut state = state.lock().expect("operation state lock poisoned");
        if !state.status.is_terminal() {
            state.progress = 100;
            state.finish(OperationStatus::Completed);
        }
        return;
    }

    for unit in 0..units {
        if !wait_while_paused(&mut pause_rx, &cancel).await {
            return;
        }
        let outcome = work(unit).await.map_err(|e| e.to_string());
        if !record_unit(&id, &state, unit, units, outcome) {
            return;
        }
    }
}

/// Block while the pause flag is set. Returns `false` once cancelled.
async fn wait_while_paused(
    pause_rx: &mut watch::Receiver<bool>,
    cancel: &CancellationToken,
) -> bool {
    loop {
        if cancel.is_cancelled() {
            return false;
        }
        if !*pause_rx.borrow_and_update() {
            return true;
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return false,
            changed = pause_rx.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
        }
    }
}

/// Percent complete once `unit` (zero-based) of `units` has finished.
fn progress_after(unit: u32, units: u32) -> u8 {
    let done = (u64::from(unit) + 1) * 100 / u64::from(units.max(1));
    done.min(100) as u8
}

/// Apply one unit's outcome. Returns whether the loop should continue.
fn record_unit(
    id: &str,
    state: &SharedState,
    unit: u32,
    units: u32,
    outcome: Result<Value, String>,
) -> bool {
    let mut state = state.lock().expect("operation state lock poisoned");
    if state.status.is_terminal() {
        // stopped while the unit was running
        return false;
    }

    match outcome {
        Ok(value) => {
            state.progress = progress_after(unit, units);
            state.result = Some(value);
            state.updated_at = Utc::now();
            info!(operation = %id, progress = state.progress, "operation progress");
            if unit + 1 == units {
                state.finish(OperationStatus::Completed);
                info!(operation = %id, "operation completed");
                return false;
            }
            true
        }
        Err(error) => {
            warn!(operation = %id, unit, %error, "operation unit failed");
            state.error = Some(error);
            state.finish(OperationStatus::Failed);
            false
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
