//! The shared "loading" flag observed by front-ends to block input while a
//! write (and its settle window) is in flight.

use std::sync::Arc;

use tokio::sync::watch;

/// Counts in-flight writes; loading while the count is non-zero.
#[derive(Clone, Debug)]
pub struct LoadingFlag {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Default for LoadingFlag {
    fn default() -> Self {
        LoadingFlag {
            in_flight: Arc::new(watch::Sender::new(0)),
        }
    }
}

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        *self.in_flight.borrow() > 0
    }

    pub fn subscribe(&self) -> LoadingReceiver {
        LoadingReceiver(self.in_flight.subscribe())
    }

    /// Mark a write as started. Loading lasts until the guard is dropped,
    /// including on error paths.
    pub(crate) fn begin(&self) -> LoadingGuard {
        self.in_flight.send_modify(|n| *n += 1);
        LoadingGuard {
            in_flight: self.in_flight.clone(),
        }
    }
}

pub(crate) struct LoadingGuard {
    in_flight: Arc<watch::Sender<usize>>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.in_flight.send_modify(|n| *n = n.saturating_sub(1));
    }
}

pub struct LoadingReceiver(watch::Receiver<usize>);

impl LoadingReceiver {
    pub fn is_loading(&self) -> bool {
        *self.0.borrow() > 0
    }

    /// Wait for the next change. Returns false once the flag is gone.
    pub async fn changed(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}
