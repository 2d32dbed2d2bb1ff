use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// The host asked for the layout to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("layout cancelled")]
pub struct Cancelled;

/// Cooperative cancellation flag shared between the host and a layout run
///
/// Clones observe the same flag, so the host keeps one handle and passes
/// another to the layout. Every pass polls it between loop iterations.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every run observing this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Fail with [`Cancelled`] once cancellation was requested
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
