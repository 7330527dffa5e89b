//! Per-client request throttling.
//!
//! The service permits one lookup per client per configured interval. The
//! store is behind an async trait so a shared external store with atomic
//! check-and-set can replace the in-memory map in a multi-process
//! deployment; the check-and-update is atomic per store either way (two
//! near-simultaneous requests from one client cannot both pass).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

/// Pluggable rate-limit state.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Atomically check whether `client` may proceed and, if so, record the
    /// permit. Returns false when the client must wait.
    async fn try_acquire(&self, client: &str, interval: Duration) -> bool;
}

/// In-memory store: client identity to the instant of its last permit.
///
/// Denied calls do not refresh the stored instant, so a client hammering the
/// endpoint still gets one permit per interval rather than none.
pub struct MemoryRateStore {
    last_permit: Mutex<HashMap<String, Instant>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        MemoryRateStore {
            last_permit: Mutex::new(HashMap::new()),
        }
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.last_permit.lock().await.len()
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn try_acquire(&self, client: &str, interval: Duration) -> bool {
        let mut map = self.last_permit.lock().await;
        let now = Instant::now();

        // Lazy sweep: drop entries whose window has long passed so the map
        // does not grow with one entry per client ever seen.
        if map.len() > 1024 {
            map.retain(|_, last| now.duration_since(*last) < interval);
        }

        match map.get(client) {
            Some(last) if now.duration_since(*last) < interval => false,
            _ => {
                map.insert(client.to_string(), now);
                true
            }
        }
    }
}

/// Rate limiter over a store and a fixed interval.
pub struct RateLimiter<S: RateStore> {
    store: S,
    interval: Duration,
}

impl<S: RateStore> RateLimiter<S> {
    pub fn new(store: S, interval: Duration) -> Self {
        RateLimiter { store, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// May `client` issue a lookup now?
    pub async fn allow(&self, client: &str) -> bool {
        self.store.try_acquire(client, self.interval).await
    }
}
