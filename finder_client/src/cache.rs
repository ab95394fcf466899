// In-memory cache in front of a transport: concurrent identical requests share one
// in-flight future, successful results are kept for a TTL, failures are forgotten.

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::time::{sleep, Duration, Instant};
use tracing::debug;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::transport::{RequestOptions, Transport};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

type SharedRequest = Shared<BoxFuture<'static, Result<Value>>>;

enum EntryState {
    /// `shareable` is false for cancellable requests: cancelling them must not reach other callers.
    InFlight { request: SharedRequest, shareable: bool },
    Resolved(Value),
}

struct CacheEntry {
    id: u64,
    timestamp: Instant,
    state: EntryState,
}

enum Lookup {
    Hit(Value),
    Join(SharedRequest),
    Miss,
}

type Entries = Arc<Mutex<HashMap<String, CacheEntry>>>;

#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryStats {
    pub key: String,
    pub age_ms: u64,
    pub has_result: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub entries: Vec<CacheEntryStats>,
}

pub struct RequestCache<T: Transport> {
    transport: Arc<T>,
    entries: Entries,
    next_id: AtomicU64,
    default_ttl: Duration,
}

fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    entries.lock().unwrap_or_else(|e| e.into_inner())
}

/// Remove the entry under `key` only if it is still the one with `id`.
fn remove_if_current(entries: &Entries, key: &str, id: u64) -> bool {
    let mut entries = lock(entries);
    if entries.get(key).is_some_and(|e| e.id == id) {
        entries.remove(key);
        true
    } else {
        false
    }
}

impl<T: Transport> RequestCache<T> {
    pub fn new(transport: T) -> Self {
        Self::with_default_ttl(transport, DEFAULT_CACHE_TTL)
    }

    pub fn with_default_ttl(transport: T, default_ttl: Duration) -> Self {
        Self {
            transport: Arc::new(transport),
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fetch and deserialize. See [`RequestCache::fetch_json`].
    pub async fn fetch<R: DeserializeOwned>(&self, url: &str, options: &RequestOptions, ttl: Option<Duration>) -> Result<R> {
        let value = self.fetch_json(url, options, ttl).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// A result younger than `ttl` is returned without a request. Without a cancellation
    /// token an in-flight request for the same key is joined; with one, a fresh request
    /// is always issued. Failures, cancellation included, remove the entry.
    pub async fn fetch_json(&self, url: &str, options: &RequestOptions, ttl: Option<Duration>) -> Result<Value> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let key = options.cache_key(url);
        let cancellable = options.signal.is_some();

        let request = {
            let mut entries = lock(&self.entries);
            let lookup = match entries.get(&key) {
                Some(CacheEntry {
                    state: EntryState::Resolved(value),
                    timestamp,
                    ..
                }) if timestamp.elapsed() < ttl => {
                    debug!("Cache hit ({} ms old): {}", timestamp.elapsed().as_millis(), url);
                    Lookup::Hit(value.clone())
                }
                Some(CacheEntry {
                    state: EntryState::InFlight { request, shareable: true },
                    ..
                }) if !cancellable => {
                    debug!("Joining in-flight request: {}", url);
                    Lookup::Join(request.clone())
                }
                _ => Lookup::Miss,
            };
            match lookup {
                Lookup::Hit(value) => return Ok(value),
                Lookup::Join(request) => request,
                Lookup::Miss => self.start(&mut entries, key, url, options, ttl),
            }
        };
        request.await
    }

    /// Register a new request before it is polled, so concurrent callers find it. A
    /// cancellable request never displaces a shareable one still in flight; it runs
    /// unregistered and its settlement leaves that entry alone.
    fn start(
        &self,
        entries: &mut HashMap<String, CacheEntry>,
        key: String,
        url: &str,
        options: &RequestOptions,
        ttl: Duration,
    ) -> SharedRequest {
        debug!("Cache miss, requesting: {}", url);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let transport = self.transport.clone();
        let cache_entries = self.entries.clone();
        let url = url.to_string();
        let options = options.clone();
        let shareable = options.signal.is_none();
        let entry_key = key.clone();

        let request = async move {
            let result = match &options.signal {
                Some(signal) => {
                    tokio::select! {
                        biased;
                        _ = signal.cancelled() => Err(Error::Cancelled),
                        result = transport.execute(&url, &options) => result,
                    }
                }
                None => transport.execute(&url, &options).await,
            };
            settle(&cache_entries, &entry_key, id, &url, &result, ttl);
            result
        }
        .boxed()
        .shared();

        let occupied = matches!(
            entries.get(&key),
            Some(CacheEntry {
                state: EntryState::InFlight { shareable: true, .. },
                ..
            })
        );
        if shareable || !occupied {
            entries.insert(
                key,
                CacheEntry {
                    id,
                    timestamp: Instant::now(),
                    state: EntryState::InFlight {
                        request: request.clone(),
                        shareable,
                    },
                },
            );
        }
        // Completes and settles the entry even if every caller goes away.
        tokio::spawn(request.clone());
        request
    }

    pub fn clear(&self, url: &str, options: &RequestOptions) {
        lock(&self.entries).remove(&options.cache_key(url));
        debug!("Cache cleared: {}", url);
    }

    pub fn clear_all(&self) {
        lock(&self.entries).clear();
        debug!("Cache cleared");
    }

    pub fn stats(&self) -> CacheStats {
        let entries = lock(&self.entries);
        let mut stats: Vec<CacheEntryStats> = entries
            .iter()
            .map(|(key, entry)| CacheEntryStats {
                key: key.clone(),
                age_ms: entry.timestamp.elapsed().as_millis() as u64,
                has_result: matches!(entry.state, EntryState::Resolved(_)),
            })
            .collect();
        stats.sort_by(|a, b| a.key.cmp(&b.key));
        CacheStats {
            size: entries.len(),
            entries: stats,
        }
    }
}

fn settle(entries: &Entries, key: &str, id: u64, url: &str, result: &Result<Value>, ttl: Duration) {
    match result {
        Ok(value) => {
            {
                let mut entries = lock(entries);
                if let Some(entry) = entries.get_mut(key).filter(|e| e.id == id) {
                    entry.state = EntryState::Resolved(value.clone());
                    entry.timestamp = Instant::now();
                }
            }
            let entries = entries.clone();
            let key = key.to_string();
            let url = url.to_string();
            tokio::spawn(async move {
                sleep(ttl).await;
                if remove_if_current(&entries, &key, id) {
                    debug!("Cache expired: {}", url);
                }
            });
        }
        Err(e) => {
            if remove_if_current(entries, key, id) {
                debug!("Dropped failed request {}: {}", url, e);
            }
        }
    }
}
