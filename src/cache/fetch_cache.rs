use crate::cache::clock::{Clock, SystemClock};
use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Per-request settings. Not part of the cache key.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HeaderMap,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: Value,
    fetched_at: DateTime<Utc>,
}

/// In-memory cache for upstream JSON reads, keyed by the full request URL.
///
/// Only successful responses are stored. An entry is served while it is
/// younger than the freshness window; after that the next call goes to the
/// network and a successful response replaces the entry. Entries are never
/// evicted otherwise.
///
/// Concurrent calls for the same uncached URL are coalesced: the first caller
/// performs the request while the others wait and then read the stored entry.
pub struct FetchCache {
    client: reqwest::Client,
    user_agent: String,
    freshness: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FetchCache {
    pub fn new(freshness: chrono::Duration, user_agent: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: user_agent.to_string(),
            freshness,
            clock: Arc::new(SystemClock),
            entries: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(config.freshness, &config.user_agent)
    }

    /// Replace the time source (used by tests to step past the freshness window)
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn freshness(&self) -> chrono::Duration {
        self.freshness
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.fetched_at < self.freshness
    }

    fn lookup(&self, url: &str) -> Option<Value> {
        let entries = self.entries();
        entries
            .get(url)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| entry.payload.clone())
    }

    fn store(&self, url: &str, payload: Value) {
        let entry = CacheEntry {
            payload,
            fetched_at: self.clock.now(),
        };
        self.entries().insert(url.to_string(), entry);
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Whether a call for `url` right now would be served from memory
    pub fn contains_fresh(&self, url: &str) -> bool {
        self.lookup(url).is_some()
    }

    /// Fetch the JSON body at `url`, serving a fresh cached copy when present.
    pub async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<Value> {
        if let Some(payload) = self.lookup(url) {
            log::debug!("Cache hit for {}", url);
            return Ok(payload);
        }

        let gate = self.acquire_gate(url);
        let _turn = gate.lock().await;
        // Another caller may have filled the slot while we waited
        if let Some(payload) = self.lookup(url) {
            log::debug!("Cache hit for {} after waiting on in-flight request", url);
            return Ok(payload);
        }

        let fetched = self.fetch_remote(url, options).await;
        if let Ok(payload) = &fetched {
            self.store(url, payload.clone());
        }
        fetched
    }

    /// Fetch and decode into `T`. A body that does not match `T` is a failed fetch.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &FetchOptions,
    ) -> Result<T> {
        let payload = self.fetch(url, options).await?;
        serde_json::from_value(payload).map_err(|e| {
            log::warn!("Unexpected response shape from {}: {}", url, e);
            TrackerError::fetch_failed(url, format!("Parse error: {}", e))
        })
    }

    async fn fetch_remote(&self, url: &str, options: &FetchOptions) -> Result<Value> {
        log::info!("Cache miss for {}, fetching", url);

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .headers(options.headers.clone())
            .send()
            .await
            .map_err(|e| {
                log::warn!("Request to {} failed: {}", url, e);
                TrackerError::fetch_failed(url, format!("Network error: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Request to {} returned {}", url, status);
            return Err(TrackerError::fetch_failed(
                url,
                format!("HTTP error: {}", status),
            ));
        }

        response.json::<Value>().await.map_err(|e| {
            log::warn!("Failed to decode response from {}: {}", url, e);
            TrackerError::fetch_failed(url, format!("Parse error: {}", e))
        })
    }

    fn acquire_gate<'a>(&'a self, url: &'a str) -> InFlight<'a> {
        let mut gates = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        let gate = gates.entry(url.to_string()).or_default().clone();
        InFlight {
            cache: self,
            url,
            gate,
        }
    }

    #[cfg(test)]
    fn pending_gates(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Claim on the per-URL gate. Dropping it (including when the fetch future
/// is cancelled) removes the gate once no other caller holds it.
struct InFlight<'a> {
    cache: &'a FetchCache,
    url: &'a str,
    gate: Arc<tokio::sync::Mutex<()>>,
}

impl InFlight<'_> {
    async fn lock(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut gates = self
            .cache
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        // One reference in the map, one held here: nobody else is waiting
        let ours = gates
            .get(self.url)
            .is_some_and(|gate| Arc::ptr_eq(gate, &self.gate));
        if ours && Arc::strong_count(&self.gate) <= 2 {
            gates.remove(self.url);
        }
    }
}

#[cfg(test)]
#[path = "fetch_cache_tests.rs"]
mod tests;
