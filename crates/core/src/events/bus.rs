use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::SystemTime,
};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    error::{Result, StudioError},
    events::{EnrichedEvent, EventHeader, StudioEvent},
    queues::{self, FifoDropOldestReceiver, FifoDropOldestSender, PushOutcome},
};

pub struct BusConfig {
    pub session_id: Uuid,
    pub subscriber_capacity: usize,
}

#[derive(Clone)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

struct EventBusInner {
    session_id: Uuid,
    next_ingest_seq: AtomicU64,
    subscriber_capacity: usize,
    subscribers: Mutex<Vec<FifoDropOldestSender<Arc<EnrichedEvent>>>>,
    drops_total: AtomicU64,
}

impl EventBus {
    pub fn new(cfg: BusConfig) -> Result<Self> {
        if cfg.subscriber_capacity == 0 {
            return Err(StudioError::InvalidConfig {
                reason: "subscriber capacity must be > 0".to_string(),
            });
        }

        Ok(Self {
            inner: Arc::new(EventBusInner {
                session_id: cfg.session_id,
                next_ingest_seq: AtomicU64::new(0),
                subscriber_capacity: cfg.subscriber_capacity,
                subscribers: Mutex::new(Vec::new()),
                drops_total: AtomicU64::new(0),
            }),
        })
    }

    pub fn publish(&self, event: StudioEvent) {
        let mut subscribers = self.inner.subscribers.lock().expect("EventBus poisoned");

        // Sequence is taken under the subscriber lock so every subscriber
        // observes the same publish order.
        let ingest_seq = self.inner.next_ingest_seq.fetch_add(1, Ordering::Relaxed);
        let enriched = Arc::new(EnrichedEvent {
            header: EventHeader {
                event_id: Uuid::new_v4(),
                session_id: self.inner.session_id,
                ingest_seq,
                timestamp: SystemTime::now(),
            },
            event,
        });

        debug!(
            event_type = enriched.event.event_type(),
            ingest_seq,
            subscribers = subscribers.len(),
            "publish"
        );

        subscribers.retain(|sub| match sub.push_overwrite(Arc::clone(&enriched)) {
            PushOutcome::Queued => true,
            PushOutcome::DroppedOldest => {
                self.inner.drops_total.fetch_add(1, Ordering::Relaxed);
                warn!(
                    event_type = enriched.event.event_type(),
                    "subscriber queue full, dropped oldest event"
                );
                true
            }
            PushOutcome::Disconnected => false,
        });
    }

    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = queues::channel(self.inner.subscriber_capacity);
        self.inner
            .subscribers
            .lock()
            .expect("EventBus poisoned")
            .push(tx);
        Subscription { receiver: rx }
    }

    pub fn session_id(&self) -> Uuid {
        self.inner.session_id
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .expect("EventBus poisoned")
            .iter()
            .filter(|sub| sub.is_connected())
            .count()
    }

    /// Events evicted from full subscriber queues since the bus was created.
    pub fn drops_total(&self) -> u64 {
        self.inner.drops_total.load(Ordering::Relaxed)
    }
}

/// One subscriber's view of the bus, in publish order.
pub struct Subscription {
    receiver: FifoDropOldestReceiver<Arc<EnrichedEvent>>,
}

impl Subscription {
    pub async fn next(&mut self) -> Option<Arc<EnrichedEvent>> {
        self.receiver.recv().await
    }

    pub fn try_next(&mut self) -> Option<Arc<EnrichedEvent>> {
        self.receiver.try_recv()
    }

    pub fn drops_total(&self) -> u64 {
        self.receiver.drops_total()
    }
}
