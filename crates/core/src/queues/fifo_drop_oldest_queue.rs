use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use tokio::sync::Notify;

/// Bounded queue that never blocks the producer: when full, the oldest entry
/// is evicted to make room for the new one.
struct FifoDropOldestInner<T> {
    buf: Mutex<VecDeque<T>>,
    capacity: usize,
    notify: Notify,
    closed: AtomicBool,
    drops_total: AtomicU64,
}

/// Producer half. Holds the queue weakly so a dropped receiver frees it.
pub struct FifoDropOldestSender<T> {
    inner: Weak<FifoDropOldestInner<T>>,
}

pub struct FifoDropOldestReceiver<T> {
    inner: Arc<FifoDropOldestInner<T>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    DroppedOldest,
    Disconnected,
}

pub fn channel<T>(capacity: usize) -> (FifoDropOldestSender<T>, FifoDropOldestReceiver<T>) {
    assert!(capacity > 0);

    let inner = Arc::new(FifoDropOldestInner {
        buf: Mutex::new(VecDeque::with_capacity(capacity)),
        capacity,
        notify: Notify::new(),
        closed: AtomicBool::new(false),
        drops_total: AtomicU64::new(0),
    });

    (
        FifoDropOldestSender {
            inner: Arc::downgrade(&inner),
        },
        FifoDropOldestReceiver { inner },
    )
}

impl<T> FifoDropOldestSender<T> {
    pub fn push_overwrite(&self, value: T) -> PushOutcome {
        let Some(inner) = self.inner.upgrade() else {
            return PushOutcome::Disconnected;
        };

        let mut buf = inner.buf.lock().expect("FifoDropOldestQueue poisoned");
        let mut outcome = PushOutcome::Queued;
        if buf.len() >= inner.capacity {
            let _ = buf.pop_front();
            inner.drops_total.fetch_add(1, Ordering::Relaxed);
            outcome = PushOutcome::DroppedOldest;
        }
        buf.push_back(value);
        drop(buf);
        inner.notify.notify_one();
        outcome
    }

    pub fn is_connected(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl<T> Drop for FifoDropOldestSender<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.closed.store(true, Ordering::Release);
            inner.notify.notify_one();
        }
    }
}

impl<T> FifoDropOldestReceiver<T> {
    pub fn try_recv(&self) -> Option<T> {
        self.inner
            .buf
            .lock()
            .expect("FifoDropOldestQueue poisoned")
            .pop_front()
    }

    /// Waits for the next entry. Returns `None` once the sender is gone and
    /// the buffer is drained.
    pub async fn recv(&self) -> Option<T> {
        loop {
            if let Some(value) = self.try_recv() {
                return Some(value);
            }
            if self.inner.closed.load(Ordering::Acquire) {
                return self.try_recv();
            }
            self.inner.notify.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.inner.buf.lock().expect("FifoDropOldestQueue poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn drops_total(&self) -> u64 {
        self.inner.drops_total.load(Ordering::Relaxed)
    }
}
