use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::*;

/// Answers from a script, then with a fixed fallback, after a fixed latency.
struct MockTransport {
    calls: Arc<AtomicUsize>,
    script: Mutex<VecDeque<Result<Value>>>,
    fallback: Value,
    latency: Duration,
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, _url: &str, _options: &RequestOptions) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        sleep(self.latency).await;
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback.clone()))
    }
}

fn mock(latency_ms: u64, script: Vec<Result<Value>>, fallback: Value) -> (MockTransport, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let transport = MockTransport {
        calls: calls.clone(),
        script: Mutex::new(script.into()),
        fallback,
        latency: Duration::from_millis(latency_ms),
    };
    (transport, calls)
}

fn cache(latency_ms: u64, script: Vec<Result<Value>>) -> (RequestCache<MockTransport>, Arc<AtomicUsize>) {
    let (transport, calls) = mock(latency_ms, script, json!({"data": "test"}));
    (RequestCache::new(transport), calls)
}

fn status(status: u16) -> Error {
    Error::Status {
        status,
        reason: "test".to_string(),
    }
}

fn get() -> RequestOptions {
    RequestOptions::default()
}

fn secs(s: u64) -> Option<Duration> {
    Some(Duration::from_secs(s))
}

// MARK: Request cache

#[tokio::test(start_paused = true)]
async fn test_concurrent_requests_share_one_call() {
    let (cache, calls) = cache(100, vec![]);
    let options = get();
    let (a, b, c) = tokio::join!(
        cache.fetch_json("/api/farms", &options, None),
        cache.fetch_json("/api/farms", &options, None),
        cache.fetch_json("/api/farms", &options, None),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(a.unwrap(), json!({"data": "test"}));
    assert_eq!(b.unwrap(), c.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_different_requests_not_shared() {
    let (cache, calls) = cache(10, vec![]);
    let get = get();
    let post = RequestOptions::post("{\"id\":1}".to_string());
    let _ = tokio::join!(
        cache.fetch_json("/api/farms", &get, None),
        cache.fetch_json("/api/geocode", &get, None),
        cache.fetch_json("/api/farms", &post, None),
    );
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(cache.stats().size, 3);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_result_is_returned_without_request() {
    let (cache, calls) = cache(10, vec![]);
    cache.fetch_json("/api/test", &get(), secs(5)).await.unwrap();
    sleep(Duration::from_secs(3)).await;
    cache.fetch_json("/api/test", &get(), secs(5)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    sleep(Duration::from_secs(3)).await;
    cache.fetch_json("/api/test", &get(), secs(5)).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_entries_expire() {
    let (cache, _) = cache(0, vec![]);
    cache.fetch_json("/api/test", &get(), secs(1)).await.unwrap();
    let stats = cache.stats();
    assert_eq!(stats.size, 1);
    assert!(stats.entries[0].key.contains("/api/test"));
    assert!(stats.entries[0].has_result);

    sleep(Duration::from_millis(1100)).await;
    assert_eq!(cache.stats().size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_expiry_keeps_newer_entry() {
    let (cache, _) = cache(0, vec![]);
    cache.fetch_json("/api/test", &get(), secs(1)).await.unwrap();
    cache.clear("/api/test", &get());
    sleep(Duration::from_millis(500)).await;
    cache.fetch_json("/api/test", &get(), secs(1)).await.unwrap();

    sleep(Duration::from_millis(700)).await;
    assert_eq!(cache.stats().size, 1);
    sleep(Duration::from_millis(400)).await;
    assert_eq!(cache.stats().size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_failures_not_cached() {
    let (cache, calls) = cache(10, vec![Err(status(500))]);
    let result = cache.fetch_json("/api/test", &get(), None).await;
    assert!(matches!(result, Err(Error::Status { status: 500, .. })));
    assert_eq!(cache.stats().size, 0);

    let result = cache.fetch_json("/api/test", &get(), None).await;
    assert_eq!(result.unwrap(), json!({"data": "test"}));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_reaches_every_waiting_caller() {
    let (cache, calls) = cache(100, vec![Err(status(502))]);
    let options = get();
    let (a, b) = tokio::join!(
        cache.fetch_json("/api/test", &options, None),
        cache.fetch_json("/api/test", &options, None),
    );
    assert!(a.is_err() && b.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancellable_requests_not_shared() {
    let (cache, calls) = cache(100, vec![]);
    let first = get().with_signal(CancellationToken::new());
    let second = get().with_signal(CancellationToken::new());
    let plain = get();
    let (a, b, c) = tokio::join!(
        cache.fetch_json("/api/test", &plain, None),
        cache.fetch_json("/api/test", &first, None),
        cache.fetch_json("/api/test", &second, None),
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellable_request_keeps_shared_entry() {
    let (cache, calls) = cache(1000, vec![]);
    let cancellable = get().with_signal(CancellationToken::new());
    let plain = get();
    let late = async {
        sleep(Duration::from_millis(100)).await;
        cache.fetch_json("/api/test", &plain, None).await
    };
    let (a, b, c) = tokio::join!(
        cache.fetch_json("/api/test", &plain, None),
        cache.fetch_json("/api/test", &cancellable, None),
        late,
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // The shared result is cached.
    cache.fetch_json("/api/test", &plain, None).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(cache.stats().entries[0].has_result);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_affects_only_its_caller() {
    let (cache, calls) = cache(1000, vec![]);
    let token = CancellationToken::new();
    let cancellable = get().with_signal(token.clone());
    let plain = get();
    let cancel = async {
        sleep(Duration::from_millis(100)).await;
        token.cancel();
    };
    let (shared, cancelled, _) = tokio::join!(
        cache.fetch_json("/api/test", &plain, None),
        cache.fetch_json("/api/test", &cancellable, None),
        cancel,
    );
    assert!(matches!(cancelled, Err(Error::Cancelled)));
    assert_eq!(shared.unwrap(), json!({"data": "test"}));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_request_removed() {
    let (cache, _) = cache(1000, vec![]);
    let token = CancellationToken::new();
    token.cancel();
    let result = cache.fetch_json("/api/test", &get().with_signal(token), None).await;
    assert!(matches!(result, Err(Error::Cancelled)));
    assert_eq!(cache.stats().size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_clear_and_clear_all() {
    let (cache, _) = cache(0, vec![]);
    for url in ["/api/farms", "/api/geocode", "/api/directions"] {
        cache.fetch_json(url, &get(), None).await.unwrap();
    }
    assert_eq!(cache.stats().size, 3);

    cache.clear("/api/farms", &get());
    let stats = cache.stats();
    assert_eq!(stats.size, 2);
    assert!(stats.entries.iter().all(|e| !e.key.starts_with("/api/farms|")));

    cache.clear_all();
    assert_eq!(cache.stats().size, 0);
}

#[tokio::test(start_paused = true)]
async fn test_typed_fetch() {
    let (cache, _) = cache(0, vec![Ok(json!([1, 2, 3]))]);
    let numbers: Vec<u32> = cache.fetch("/api/numbers", &get(), None).await.unwrap();
    assert_eq!(numbers, vec![1, 2, 3]);

    let result: Result<Vec<String>> = cache.fetch("/api/numbers", &get(), None).await;
    assert!(matches!(result, Err(Error::JSONError(_))));
}

// MARK: Location client

fn client(script: Vec<Result<Value>>, fallback: Value) -> (LocationClient<MockTransport>, Arc<AtomicUsize>) {
    let (transport, calls) = mock(10, script, fallback);
    let client = LocationClient::with_transport("http://backend.test", transport, Duration::from_secs(300)).unwrap();
    (client, calls)
}

#[tokio::test(start_paused = true)]
async fn test_locations_skip_malformed_records() {
    let records = json!([
        {"type": "farm_stand", "Name": "Happy Farm", "slug": "happy-farm", "lat": 43.7, "lng": -70.3, "eggs": "yes"},
        {"type": "spaceport", "Name": "Nope"},
        {"type": "winery", "Name": "Vineyard", "slug": "vineyard"},
    ]);
    let (client, calls) = client(vec![], records);
    let locations = client.locations().await.unwrap();
    assert_eq!(locations.len(), 2);
    assert!(locations[0].has_product("eggs"));

    client.locations().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_locations_retry_server_errors() {
    let (client, calls) = client(vec![Err(status(503)), Err(status(500))], json!([]));
    let locations = client.locations().await.unwrap();
    assert!(locations.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_geocode() {
    let response = json!({"lat": 43.6591, "lng": -70.2568, "formatted_address": "Portland, ME, USA", "place_id": "abc"});
    let (client, _) = client(vec![Ok(response)], json!({}));
    let result = client.geocode("  Portland, ME ").await.unwrap();
    let location = result.to_search_location().unwrap();
    assert_eq!(location.name, "Portland, ME, USA");
    assert_eq!(location.place_id.as_deref(), Some("abc"));
    assert!(location.is_complete());
}

#[tokio::test(start_paused = true)]
async fn test_geocode_client_error_not_retried() {
    let (client, calls) = client(vec![Err(status(404))], json!({}));
    assert!(client.geocode("nowhere").await.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_place_details() {
    let (client, _) = client(vec![], json!({"name": "Happy Farm", "rating": 4.5}));
    let details = client.place_details("abc", Some("name,rating")).await.unwrap();
    assert_eq!(details.get("rating"), Some(&json!(4.5)));
    let key = &client.cache().stats().entries[0].key;
    assert!(key.starts_with("http://backend.test/api/places/details?placeId=abc&fields=name%2Crating|"));
}
