use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use super::events::RaceEvent;

/// Fan-out hub for live race updates.
///
/// Each subscriber owns the receiving half of an unbounded channel; the
/// hub keeps the senders. Writing to a sender never blocks, so a slow or
/// dead subscriber cannot stall delivery to the others — its send simply
/// fails once the receiver is gone, and the subscriber is evicted.
///
/// A single heartbeat task runs while at least one subscriber exists,
/// sending a keepalive marker every `heartbeat_interval`.
pub struct SseHub {
    // subscriber id -> sender
    subscribers: RwLock<HashMap<String, mpsc::UnboundedSender<RaceEvent>>>,
    heartbeat_interval: Duration,
    heartbeat_task: Mutex<Option<JoinHandle<()>>>,
    // Handed to the heartbeat task so it does not keep the hub alive
    self_ref: Weak<SseHub>,
}

impl SseHub {
    pub fn new(heartbeat_interval: Duration) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            subscribers: RwLock::new(HashMap::new()),
            heartbeat_interval,
            heartbeat_task: Mutex::new(None),
            self_ref: weak.clone(),
        })
    }

    /// Registers a new subscriber, queues its `connected` event and
    /// returns the assigned id plus the event receiver. Starts the
    /// heartbeat task when going from zero to one subscriber.
    pub async fn subscribe(&self) -> (String, mpsc::UnboundedReceiver<RaceEvent>) {
        let id = Uuid::new_v4().to_string();
        let (sender, receiver) = mpsc::unbounded_channel();

        let _ = sender.send(RaceEvent::Connected { id: id.clone() });

        let first_subscriber = {
            let mut subscribers = self.subscribers.write().await;
            subscribers.insert(id.clone(), sender);
            subscribers.len() == 1
        };

        info!(subscriber_id = %id, "SSE subscriber registered");

        if first_subscriber {
            self.start_heartbeats().await;
        }

        (id, receiver)
    }

    /// Broadcasts an event to every subscriber. A failed delivery evicts
    /// only that subscriber; the others are unaffected.
    pub async fn broadcast(&self, event: RaceEvent) {
        // Snapshot the senders so eviction during iteration is safe
        let snapshot: Vec<(String, mpsc::UnboundedSender<RaceEvent>)> = {
            let subscribers = self.subscribers.read().await;
            subscribers
                .iter()
                .map(|(id, sender)| (id.clone(), sender.clone()))
                .collect()
        };

        let mut failed = Vec::new();
        for (id, sender) in snapshot {
            if sender.send(event.clone()).is_err() {
                failed.push(id);
            }
        }

        for id in failed {
            debug!(subscriber_id = %id, "Evicting subscriber after failed delivery");
            self.unsubscribe_by_id(&id).await;
        }
    }

    /// Removes a subscriber, emitting a best-effort `disconnected` event
    /// first. Stops the heartbeat task when the set becomes empty.
    pub async fn unsubscribe_by_id(&self, id: &str) {
        let removed = {
            let mut subscribers = self.subscribers.write().await;
            subscribers.remove(id)
        };

        if let Some(sender) = removed {
            let _ = sender.send(RaceEvent::Disconnected { id: id.to_string() });
            info!(subscriber_id = %id, "SSE subscriber removed");
        }

        let empty = self.subscribers.read().await.is_empty();
        if empty {
            self.stop_heartbeats().await;
        }
    }

    /// Number of currently subscribed streams
    pub async fn size(&self) -> usize {
        self.subscribers.read().await.len()
    }

    async fn start_heartbeats(&self) {
        let mut task = self.heartbeat_task.lock().await;
        if task.is_some() {
            return;
        }

        debug!(
            interval_ms = self.heartbeat_interval.as_millis() as u64,
            "Starting SSE heartbeat task"
        );

        let hub_ref = self.self_ref.clone();
        let interval = self.heartbeat_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so heartbeats are
            // spaced a full interval from subscription
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(hub) = hub_ref.upgrade() else {
                    break;
                };
                hub.broadcast(RaceEvent::Ping {
                    ts: crate::domain::types::now_ms(),
                })
                .await;
            }
        }));
    }

    async fn stop_heartbeats(&self) {
        let mut task = self.heartbeat_task.lock().await;
        // A subscriber that registered after the caller's emptiness check
        // still needs the task; re-check under the task lock
        if !self.subscribers.read().await.is_empty() {
            return;
        }
        if let Some(handle) = task.take() {
            handle.abort();
            debug!("Stopped SSE heartbeat task");
        }
    }
}
