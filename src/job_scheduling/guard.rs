//! Process-local overlap guard for pipeline invocations

use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// At most one holder at a time; later callers are turned away, not queued.
///
/// The guarded value lives as long as the guard, so state that must survive
/// between passes (such as verification statistics) can be kept inside it.
#[derive(Debug)]
pub struct PipelineGuard<S> {
    name: &'static str,
    inner: Arc<Mutex<S>>,
}

impl<S> Clone for PipelineGuard<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> PipelineGuard<S> {
    pub fn new(name: &'static str, state: S) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(state)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// `None` while a previous invocation still holds the guard
    pub fn try_acquire(&self) -> Option<OwnedMutexGuard<S>> {
        Arc::clone(&self.inner).try_lock_owned().ok()
    }

    pub fn is_running(&self) -> bool {
        self.inner.try_lock().is_err()
    }
}
