//! Live fan-out to push subscribers
//!
//! Each subscriber owns a bounded queue. A publish snapshots the live set,
//! releases the lock and delivers to everyone concurrently, each send
//! bounded by the configured timeout. Subscribers whose delivery failed
//! are evicted after the sweep, and every eviction is announced on the
//! eviction channel.
//!
//! Flow: subscribe → receive every later publish → unsubscribe or evict.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use types::ids::SubscriberId;

use crate::config::FeedConfig;
use crate::events::{DeliveryFailure, EvictionEvent, PublishReport};
use crate::metrics::FeedMetrics;

/// Handle returned to a new subscriber.
#[derive(Debug)]
pub struct Subscription {
    pub id: SubscriberId,
    pub receiver: mpsc::Receiver<Arc<str>>,
}

type Registry = HashMap<SubscriberId, mpsc::Sender<Arc<str>>>;

/// Subscriber registry plus best-effort fan-out.
pub struct Broadcaster {
    subscribers: RwLock<Registry>,
    evictions: broadcast::Sender<EvictionEvent>,
    queue_capacity: usize,
    send_timeout: Duration,
    metrics: Arc<FeedMetrics>,
}

impl Broadcaster {
    pub fn new(config: &FeedConfig, metrics: Arc<FeedMetrics>) -> Self {
        let (evictions, _) = broadcast::channel(config.eviction_channel_capacity.max(1));

        info!(
            queue_capacity = config.subscriber_queue_capacity,
            send_timeout_ms = config.send_timeout.as_millis() as u64,
            "Broadcaster initialized"
        );

        Self {
            subscribers: RwLock::new(HashMap::new()),
            evictions,
            queue_capacity: config.subscriber_queue_capacity.max(1),
            send_timeout: config.send_timeout,
            metrics,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> Subscription {
        let (tx, receiver) = mpsc::channel(self.queue_capacity);
        let id = SubscriberId::new();

        let count = {
            let mut subscribers = self.write();
            subscribers.insert(id, tx);
            subscribers.len()
        };
        self.metrics.set_connected_subscribers(count as u64);

        info!(subscriber = %id, subscribers = count, "Subscriber connected");
        Subscription { id, receiver }
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let (removed, count) = {
            let mut subscribers = self.write();
            let removed = subscribers.remove(&id).is_some();
            (removed, subscribers.len())
        };

        if removed {
            self.metrics.set_connected_subscribers(count as u64);
            info!(subscriber = %id, subscribers = count, "Subscriber disconnected");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().len()
    }

    pub fn contains(&self, id: SubscriberId) -> bool {
        self.read().contains_key(&id)
    }

    /// Eviction notifications from now on.
    pub fn evictions(&self) -> broadcast::Receiver<EvictionEvent> {
        self.evictions.subscribe()
    }

    /// Deliver `payload` to every subscriber registered at the start of the
    /// call. Never fails; failed subscribers are evicted.
    pub async fn publish(&self, payload: Arc<str>) -> PublishReport {
        let targets: Vec<(SubscriberId, mpsc::Sender<Arc<str>>)> = self
            .read()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        if targets.is_empty() {
            return PublishReport::default();
        }

        let started = Instant::now();
        let send_timeout = self.send_timeout;

        let results = join_all(targets.into_iter().map(|(id, tx)| {
            let payload = payload.clone();
            async move {
                let result = match tokio::time::timeout(send_timeout, tx.send(payload)).await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(_)) => Err(DeliveryFailure::Closed),
                    Err(_) => Err(DeliveryFailure::TimedOut),
                };
                (id, result)
            }
        }))
        .await;

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, result) in results {
            match result {
                Ok(()) => delivered += 1,
                Err(reason) => failed.push((id, reason)),
            }
        }

        let evicted = self.evict(failed);

        self.metrics
            .record_publish(delivered, started.elapsed().as_nanos() as u64);
        debug!(delivered, evicted, bytes = payload.len(), "Publish complete");

        PublishReport { delivered, evicted }
    }

    /// Evict a subscriber whose delivery failed outside a publish sweep,
    /// such as a transport that could not write a frame. Returns whether it
    /// was still registered.
    pub fn evict_one(&self, id: SubscriberId, reason: DeliveryFailure) -> bool {
        self.evict(vec![(id, reason)]) == 1
    }

    /// Drop failed subscribers that are still registered.
    fn evict(&self, failed: Vec<(SubscriberId, DeliveryFailure)>) -> usize {
        if failed.is_empty() {
            return 0;
        }

        let (removed, count) = {
            let mut subscribers = self.write();
            let removed: Vec<_> = failed
                .into_iter()
                .filter(|(id, _)| subscribers.remove(id).is_some())
                .collect();
            (removed, subscribers.len())
        };
        self.metrics.set_connected_subscribers(count as u64);

        for (id, reason) in &removed {
            warn!(subscriber = %id, reason = %reason, "Subscriber evicted");
            self.metrics.record_eviction();
            // No listener is not an error.
            let _ = self.evictions.send(EvictionEvent {
                subscriber: *id,
                reason: *reason,
                at: Utc::now(),
            });
        }
        removed.len()
    }
}
