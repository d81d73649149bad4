//! Refresh Bus
//!
//! Broadcast channel announcing "data for this entity changed". Delivery is
//! fire-and-forget and at-most-once: nothing is queued for subscribers that
//! join later, and a subscriber that falls behind skips what it missed.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

// == Refresh Event ==
/// An announcement that cached data went stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RefreshEvent {
    /// Everything belonging to a customer account changed
    Account { entity_id: String },
    /// A customer's alert rules changed
    Alerts { entity_id: String },
    /// Every consumer should refresh
    All,
}

impl RefreshEvent {
    pub fn account(entity_id: impl Into<String>) -> Self {
        Self::Account {
            entity_id: entity_id.into(),
        }
    }

    pub fn alerts(entity_id: impl Into<String>) -> Self {
        Self::Alerts {
            entity_id: entity_id.into(),
        }
    }

    /// The entity this event targets, `None` for `All`.
    pub fn entity_id(&self) -> Option<&str> {
        match self {
            Self::Account { entity_id } | Self::Alerts { entity_id } => Some(entity_id),
            Self::All => None,
        }
    }

    /// True when a consumer interested in `entity_id` should react.
    pub fn matches(&self, entity_id: &str) -> bool {
        self.entity_id().map_or(true, |id| id == entity_id)
    }
}

// == Refresh Bus ==
/// Publisher side of the invalidation signal. Cloning shares the channel.
#[derive(Debug, Clone)]
pub struct RefreshBus {
    sender: broadcast::Sender<RefreshEvent>,
}

impl RefreshBus {
    /// Creates a bus buffering up to `capacity` undelivered events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    // == Publish ==
    /// Broadcasts an event and returns how many subscribers were live.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    pub fn publish(&self, event: RefreshEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(receivers, "refresh event published");
                receivers
            }
            Err(broadcast::error::SendError(event)) => {
                debug!(?event, "refresh event published with no subscribers");
                0
            }
        }
    }

    // == Subscribe ==
    /// Subscribes to events for `entity_id`, or to every event when `None`.
    ///
    /// `All` events are always delivered.
    pub fn subscribe(&self, entity_id: Option<String>) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
            entity_id,
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for RefreshBus {
    fn default() -> Self {
        Self::new(64)
    }
}

// == Subscription ==
/// Receiving side of the bus. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<RefreshEvent>,
    entity_id: Option<String>,
}

impl Subscription {
    /// Waits for the next event this subscription accepts.
    ///
    /// Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<RefreshEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "refresh subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next accepted event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<RefreshEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "refresh subscriber lagged, events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// The entity filter, `None` when subscribed to everything.
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    fn accepts(&self, event: &RefreshEvent) -> bool {
        match &self.entity_id {
            Some(id) => event.matches(id),
            None => true,
        }
    }
}
