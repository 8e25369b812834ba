//! Shared run state passed into every stage and per-item task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SignError;
use crate::service::HashService;

/// Context shared by every stage of one pipeline run. Built in
/// [`execute_pipeline`](crate::pipeline::execute_pipeline) and handed to each
/// stage thread behind an `Arc`; all state is transient, scoped to one run.
pub struct StageContext {
    /// The digest collaborator. Stages never call it except through here.
    pub service: Arc<dyn HashService>,
    /// Serializes every slow-digest call across the whole run. Held only for
    /// the duration of a single call so the fast digests stay parallel.
    slow_lock: Mutex<()>,
    /// Raised on the first failure so drain loops stop spawning promptly.
    cancelled: AtomicBool,
    /// First failure recorded during the run; later failures are dropped.
    first_error: Mutex<Option<SignError>>,
}

impl StageContext {
    pub fn new(service: Arc<dyn HashService>) -> Self {
        StageContext {
            service,
            slow_lock: Mutex::new(()),
            cancelled: AtomicBool::new(false),
            first_error: Mutex::new(None),
        }
    }

    /// Acquire the shared lock guarding the slow digest. Callers must release
    /// (drop the guard) immediately after the call returns.
    pub fn lock_slow_lane(&self) -> MutexGuard<'_, ()> {
        self.slow_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Record a failure (first one wins) and raise the cancellation flag.
    pub fn record_error(&self, err: SignError) {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_none() {
            log::debug!("recording first pipeline error: {err}");
            *slot = Some(err);
        }
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Take the recorded failure, if any. Called once after the join barrier.
    pub fn take_error(&self) -> Option<SignError> {
        self.first_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}
