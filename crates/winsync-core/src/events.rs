//! State-change notifications and app-level log helpers.
//!
//! The repository, sync engine and manager publish to an [`EventBus`]; any
//! front end can subscribe and receive every event published afterwards.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info};

use crate::arrangement::ArrangementId;
use crate::errors::WinSyncError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrangementEvent {
    Saved { id: ArrangementId, name: String },
    Deleted { id: ArrangementId },
    Reset,
    Restored {
        id: ArrangementId,
        restored: usize,
        total: usize,
    },
    SyncStarted,
    SyncCompleted { adopted: usize },
    SyncFailed { code: &'static str },
    Uploaded { id: ArrangementId },
    RemoteDeleted { id: ArrangementId },
}

/// Fan-out channel. Clones share subscribers.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<Sender<ArrangementEvent>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<ArrangementEvent> {
        let (tx, rx) = channel();
        self.lock().push(tx);
        rx
    }

    /// Deliver to every live subscriber; dropped receivers are pruned.
    pub fn publish(&self, event: ArrangementEvent) {
        self.lock().retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sender<ArrangementEvent>>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub fn log_app_startup() {
    info!(
        event = "core.app.startup_completed",
        version = env!("CARGO_PKG_VERSION")
    );
}

pub fn log_app_error(error: &dyn WinSyncError) {
    error!(
        event = "core.app.error_occurred",
        error_code = error.error_code(),
        error_message = %error,
        user_error = error.is_user_error()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives_events() {
        let bus = EventBus::new();
        let first = bus.subscribe();
        let second = bus.clone().subscribe();

        bus.publish(ArrangementEvent::Reset);
        bus.publish(ArrangementEvent::SyncCompleted { adopted: 2 });

        for rx in [first, second] {
            let received: Vec<_> = rx.try_iter().collect();
            assert_eq!(
                received,
                [
                    ArrangementEvent::Reset,
                    ArrangementEvent::SyncCompleted { adopted: 2 }
                ]
            );
        }
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = EventBus::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(ArrangementEvent::SyncStarted);

        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(kept.try_recv().unwrap(), ArrangementEvent::SyncStarted);
    }

    #[test]
    fn test_publish_without_subscribers() {
        EventBus::new().publish(ArrangementEvent::Reset);
    }
}
