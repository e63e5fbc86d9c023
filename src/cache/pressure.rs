//! Memory Pressure Module
//!
//! An explicit low-memory event source. Whatever observes the platform
//! condition calls [`MemoryPressure::notify`]; subscribers registered with
//! [`MemoryPressure::register`] run their callback on each event until their
//! [`PressureSubscription`] is dropped.

use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Pending events per subscriber before older ones are coalesced.
const EVENT_BUFFER: usize = 16;

// == Memory Pressure ==
/// Broadcasts low-memory events to registered callbacks.
#[derive(Debug, Clone)]
pub struct MemoryPressure {
    sender: broadcast::Sender<()>,
}

impl Default for MemoryPressure {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPressure {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUFFER);
        Self { sender }
    }

    // == Notify ==
    /// Signals a low-memory condition.
    ///
    /// Returns the number of subscribers that will observe it.
    pub fn notify(&self) -> usize {
        self.sender.send(()).unwrap_or(0)
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    // == Register ==
    /// Runs `on_pressure` on a background task for every event.
    ///
    /// A callback that returns `false` ends its own subscription. Outside a
    /// Tokio runtime nothing is registered and the returned subscription is
    /// already finished.
    pub fn register<F>(&self, mut on_pressure: F) -> PressureSubscription
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No Tokio runtime, memory pressure callback not registered");
            return PressureSubscription { handle: None };
        };
        let mut receiver = self.sender.subscribe();
        let handle = runtime.spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(()) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Missed events collapse into one callback
                        debug!(skipped, "Memory pressure events coalesced");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
                if !on_pressure() {
                    break;
                }
            }
        });
        PressureSubscription {
            handle: Some(handle),
        }
    }
}

// == Pressure Subscription ==
/// Registration handle; dropping it deregisters the callback.
#[derive(Debug)]
pub struct PressureSubscription {
    handle: Option<JoinHandle<()>>,
}

impl PressureSubscription {
    /// Returns true once the callback will no longer run.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for PressureSubscription {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
