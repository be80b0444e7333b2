// lanview-source/src/cancel.rs
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative cancellation flag shared between an owner and a worker.
///
/// Clones all point at the same flag.  The capture loop checks it once per
/// iteration; discovery checks it between bounded waits.  There is no
/// process-global interrupt state – whoever wants to cancel holds a clone.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
