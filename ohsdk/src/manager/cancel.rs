//! Cooperative cancellation for long-running installs.
//!
//! Cancellation is advisory: pipeline steps poll [`CancellationSignal::is_cancelled`]
//! at their checkpoints (before each network read, before each archive
//! entry, before each relocation step) and bail out with
//! [`ManagerError::Cancelled`](super::ManagerError::Cancelled). In-flight
//! system calls are never interrupted.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::{ManagerError, ManagerResult};

/// Callback run once when cancellation is requested.
pub type CancelCallback = Box<dyn FnOnce() + Send>;

/// Read side of a cancellation request.
pub trait CancellationSignal {
    /// Whether cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Register a callback to run when cancellation is requested.
    ///
    /// If cancellation was already requested the callback runs immediately.
    fn on_cancel(&self, callback: CancelCallback);

    /// Checkpoint helper: `Err(Cancelled)` once cancellation is requested.
    fn checkpoint(&self) -> ManagerResult<()> {
        if self.is_cancelled() {
            Err(ManagerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Signal that is never raised.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverCancel;

impl CancellationSignal for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn on_cancel(&self, _callback: CancelCallback) {}
}

#[derive(Default)]
struct Inner {
    cancelled: AtomicBool,
    callbacks: Mutex<Vec<CancelCallback>>,
}

/// Shared, cloneable cancellation flag.
///
/// The owner (the command driving an install) keeps one clone and calls
/// [`CancelToken::cancel`]; the pipeline observes another clone. Clones may
/// cross threads, so a Ctrl+C handler can cancel a running install.
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and run registered callbacks.
    ///
    /// Only the first call has any effect.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let callbacks = std::mem::take(&mut *self.inner.callbacks.lock());
        for callback in callbacks {
            callback();
        }
    }
}

impl CancellationSignal for CancelToken {
    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn on_cancel(&self, callback: CancelCallback) {
        {
            let mut callbacks = self.inner.callbacks.lock();
            if !self.inner.cancelled.load(Ordering::SeqCst) {
                callbacks.push(callback);
                return;
            }
        }
        callback();
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
