//! Response cache: request URL -> raw payload of the last successful decode.

use foldhash::HashMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// How the cache bounds its growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// One entry per distinct URL, kept for the life of the process.
    #[default]
    Unbounded,
    /// Keep at most `n` entries; the oldest insertion is evicted first.
    Capacity(usize),
    /// Entries older than the duration are treated as misses.
    Ttl(Duration),
    CapacityAndTtl(usize, Duration),
}

impl CachePolicy {
    pub fn capacity(&self) -> Option<usize> {
        match *self {
            CachePolicy::Capacity(n) | CachePolicy::CapacityAndTtl(n, _) => Some(n),
            _ => None,
        }
    }

    pub fn ttl(&self) -> Option<Duration> {
        match *self {
            CachePolicy::Ttl(d) | CachePolicy::CapacityAndTtl(_, d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    payload: Arc<[u8]>,
    inserted_at: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<String, Slot>,
    /// Insertion order as `(seq, url)`. Entries whose seq no longer matches
    /// the slot are stale and skipped on eviction.
    order: VecDeque<(u64, String)>,
    next_seq: u64,
}

/// Thread-safe payload cache. The lock is never held across an await point.
#[derive(Debug)]
pub struct ResponseCache {
    policy: CachePolicy,
    inner: Mutex<Inner>,
}

impl ResponseCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Returns the cached payload for `url`, or `None` on a miss.
    pub fn get(&self, url: &str) -> Option<Arc<[u8]>> {
        self.get_at(url, Instant::now())
    }

    /// Stores `payload` under `url`, overwriting any previous entry.
    pub fn insert(&self, url: &str, payload: impl Into<Arc<[u8]>>) {
        self.insert_at(url, payload.into(), Instant::now());
    }

    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.slots.clear();
        inner.order.clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_at(&self, url: &str, now: Instant) -> Option<Arc<[u8]>> {
        let mut inner = self.lock();
        let expired = match (inner.slots.get(url), self.policy.ttl()) {
            (None, _) => return None,
            (Some(slot), Some(ttl)) => now.saturating_duration_since(slot.inserted_at) > ttl,
            (Some(_), None) => false,
        };
        if expired {
            inner.slots.remove(url);
            return None;
        }
        inner.slots.get(url).map(|slot| Arc::clone(&slot.payload))
    }

    fn insert_at(&self, url: &str, payload: Arc<[u8]>, now: Instant) {
        let mut inner = self.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.slots.insert(
            url.to_string(),
            Slot {
                payload,
                inserted_at: now,
                seq,
            },
        );
        inner.order.push_back((seq, url.to_string()));

        if let Some(capacity) = self.policy.capacity() {
            while inner.slots.len() > capacity {
                let Some((seq, key)) = inner.order.pop_front() else {
                    break;
                };
                if inner.slots.get(&key).is_some_and(|slot| slot.seq == seq) {
                    inner.slots.remove(&key);
                }
            }
        }

        // Drop stale order records so the queue tracks the live set
        if inner.order.len() > inner.slots.len() * 2 + 16 {
            let Inner { slots, order, .. } = &mut *inner;
            order.retain(|(seq, key)| slots.get(key).is_some_and(|slot| slot.seq == *seq));
        }
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(CachePolicy::Unbounded)
    }
}
