//! Run control: a shared abort token checked by fetch workers.
//!
//! The CLI sets the token on Ctrl-C; workers stop taking new tasks and let
//! in-flight ones finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to one abort flag. All clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    abort: Arc<AtomicBool>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the run stop handing out tasks.
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Relaxed)
    }
}
