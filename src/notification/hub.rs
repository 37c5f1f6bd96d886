//! In-memory broadcast hub for change-event fan-out.
//!
//! Delivery is best-effort and at-most-once: there is no acknowledgment, no
//! retry, no backlog. An observer connected at publish time receives events
//! in publish order; an observer connecting later never learns of earlier
//! events. Every observer receives every event regardless of which project
//! it concerns.

use super::ChangeEvent;
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Broadcast hub delivering change events to all connected observers.
///
/// Cloning the hub shares the underlying channel; subscribing and publishing
/// are safe to interleave from concurrent tasks.
#[derive(Debug, Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<ChangeEvent>,
}

impl NotificationHub {
    /// Creates a hub whose per-observer buffer holds `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to every currently connected observer.
    ///
    /// Fire-and-forget: having no observers is not an error, and delivery
    /// failures are never surfaced to the mutation caller.
    pub fn publish(&self, event: ChangeEvent) {
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(receivers, "change event published");
            }
            Err(dropped) => {
                debug!(summary = %dropped.0, "change event dropped; no observers connected");
            }
        }
    }

    /// Registers an observer; dropping the returned receiver cancels
    /// delivery to it.
    #[must_use]
    pub fn subscribe(&self) -> NotificationReceiver {
        NotificationReceiver {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns the number of currently connected observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Observer handle receiving change events in publish order.
#[derive(Debug)]
pub struct NotificationReceiver {
    receiver: broadcast::Receiver<ChangeEvent>,
}

impl NotificationReceiver {
    /// Receives the next event, or `None` once the hub is dropped.
    ///
    /// A receiver that falls behind the channel capacity skips the
    /// overwritten events and continues from the oldest retained one.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "observer lagged; events dropped");
                }
            }
        }
    }

    /// Receives the next event without waiting, or `None` when no event is
    /// ready or the hub is dropped.
    pub fn try_recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Empty
                | broadcast::error::TryRecvError::Closed) => return None,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "observer lagged; events dropped");
                }
            }
        }
    }
}
