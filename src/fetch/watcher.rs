//! Resource watcher.
//!
//! A watcher stands in for one mounted consumer of a resource: it loads the
//! resource, then reloads it every time a refresh event for its entity (or
//! `All`) is broadcast. Dropping the watcher stops it and releases its
//! subscription.

use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::fetch::{PaidClient, PaidRequest};

// == Watch State ==
#[derive(Debug, Clone, PartialEq)]
pub enum WatchState {
    Loading,
    Ready(Value),
    Failed(String),
}

// == Resource Watcher ==
#[derive(Debug)]
pub struct ResourceWatcher {
    state: watch::Receiver<WatchState>,
    handle: JoinHandle<()>,
}

impl ResourceWatcher {
    /// Starts watching `request` through `client`.
    ///
    /// The subscription is taken before the first load so an event published
    /// while that load is in flight still triggers a reload. Must be called
    /// from within a Tokio runtime.
    pub fn spawn(client: PaidClient, request: PaidRequest) -> Self {
        let (tx, state) = watch::channel(WatchState::Loading);
        let mut subscription = client
            .cache()
            .subscribe(request.entity_id().map(str::to_string));

        let handle = tokio::spawn(async move {
            if !load(&client, &request, &tx).await {
                return;
            }

            while let Some(event) = subscription.recv().await {
                debug!(?event, endpoint = %request.endpoint, "refreshing watched resource");
                if let Some(key) = request.cache_key() {
                    client.cache().delete(&key).await;
                }
                if !load(&client, &request, &tx).await {
                    break;
                }
            }
        });

        Self { state, handle }
    }

    /// Current state.
    pub fn state(&self) -> WatchState {
        self.state.borrow().clone()
    }

    /// Waits for the next state change. `None` once the watcher has stopped.
    pub async fn changed(&mut self) -> Option<WatchState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Extra receiver for another listener of the same resource.
    pub fn subscribe(&self) -> watch::Receiver<WatchState> {
        self.state.clone()
    }
}

impl Drop for ResourceWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Fetches once and publishes the result. Returns false when nobody listens.
async fn load(client: &PaidClient, request: &PaidRequest, tx: &watch::Sender<WatchState>) -> bool {
    let state = match client.fetch_paid_data(request).await {
        Ok(response) => WatchState::Ready(response.into_data()),
        Err(e) => {
            warn!(endpoint = %request.endpoint, error = %e, "watched fetch failed");
            WatchState::Failed(e.to_string())
        }
    };
    tx.send(state).is_ok()
}
