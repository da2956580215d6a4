//! Cached documents with periodic background re-polling.
//!
//! The portal re-reads the tracker document and any directory listing a
//! client has asked for on a fixed interval. Each fetch reserves a
//! generation number *before* the network call; a slower fetch that
//! completes after a newer one is discarded, so an overlapping refresh can
//! never overwrite fresher data with a stale result.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::api::AppState;

struct Entry<T> {
    value: T,
    generation: u64,
    fetched_at: Instant,
}

/// Keyed cache with generation fencing.
pub struct Cache<T> {
    ttl: Duration,
    next_generation: AtomicU64,
    entries: RwLock<HashMap<String, Entry<T>>>,
}

impl<T: Clone> Cache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            next_generation: AtomicU64::new(0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached value if it is still within its TTL.
    pub async fn fresh(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|e| e.fetched_at.elapsed() <= self.ttl)
            .map(|e| e.value.clone())
    }

    /// Reserve a generation number. Call before starting the fetch whose
    /// result will be stored under that generation.
    pub fn begin_fetch(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Store a fetched value. Returns false (and drops the value) when a
    /// newer generation is already present for the key.
    pub async fn store(&self, key: &str, value: T, generation: u64) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(existing) if existing.generation >= generation => false,
            _ => {
                entries.insert(
                    key.to_string(),
                    Entry {
                        value,
                        generation,
                        fetched_at: Instant::now(),
                    },
                );
                true
            }
        }
    }

    /// All keys currently cached, fresh or not.
    pub async fn keys(&self) -> Vec<String> {
        self.entries.read().await.keys().cloned().collect()
    }
}

/// Spawn the background refresh loop for the application state.
pub fn spawn(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(state.config.refresh_interval);
        // The first tick fires immediately; skip it, startup already
        // serves cold-cache fetches on demand.
        interval.tick().await;
        loop {
            interval.tick().await;
            refresh_once(&state).await;
        }
    });
}

async fn refresh_once(state: &AppState) {
    let tracker_path = state.config.tracker_path.clone();
    let generation = state.tracker.begin_fetch();
    match state.store.file_content(&tracker_path).await {
        Ok(text) => {
            if state.tracker.store(&tracker_path, text, generation).await {
                tracing::debug!(path = %tracker_path, "Refreshed tracker document");
            }
        }
        Err(e) => tracing::warn!(path = %tracker_path, "Tracker refresh failed: {}", e),
    }

    for path in state.listings.keys().await {
        let generation = state.listings.begin_fetch();
        match state.store.list_dir(&path).await {
            Ok(entries) => {
                state.listings.store(&path, entries, generation).await;
            }
            Err(e) => tracing::warn!(path = %path, "Listing refresh failed: {}", e),
        }
    }
}
