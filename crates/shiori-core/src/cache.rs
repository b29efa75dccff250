//! Keyed query cache with staleness deadlines and request deduplication.
//!
//! Each key holds at most one cached value and at most one in-flight
//! request. Callers that arrive while a request for their key is running
//! await that request instead of starting another, and all of them observe
//! the same outcome. Only successes are stored.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tokio::time::Instant;

type InFlight<V, E> = Shared<BoxFuture<'static, Result<V, Arc<E>>>>;

/// Whether a fresh cached value may satisfy the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    #[default]
    Cached,
    /// Skip the cached value. Still joins a request already in flight.
    Force,
}

/// Observable state of a query.
#[derive(Debug, Clone)]
pub enum QueryState<V, E> {
    /// Never requested, or the guard declined to run it.
    Idle,
    Loading,
    Ready(V),
    Failed(Arc<E>),
}

impl<V, E> QueryState<V, E> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn data(&self) -> Option<&V> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Failed(err) => Some(&**err),
            _ => None,
        }
    }

    /// `None` for `Idle`/`Loading`.
    pub fn into_result(self) -> Option<Result<V, Arc<E>>> {
        match self {
            Self::Ready(value) => Some(Ok(value)),
            Self::Failed(err) => Some(Err(err)),
            Self::Idle | Self::Loading => None,
        }
    }
}

impl<V, E> From<Result<V, Arc<E>>> for QueryState<V, E> {
    fn from(result: Result<V, Arc<E>>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(err) => Self::Failed(err),
        }
    }
}

/// Counters for monitoring cache effectiveness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Callers that awaited a request someone else started.
    pub joined: u64,
    pub entries: usize,
}

struct Cached<V> {
    value: V,
    stale_at: Instant,
}

struct Entry<V, E> {
    cached: Option<Cached<V>>,
    in_flight: Option<InFlight<V, E>>,
    last_error: Option<Arc<E>>,
}

impl<V, E> Default for Entry<V, E> {
    fn default() -> Self {
        Self {
            cached: None,
            in_flight: None,
            last_error: None,
        }
    }
}

impl<V: Clone, E> Entry<V, E> {
    fn fresh(&self, now: Instant) -> Option<V> {
        self.cached
            .as_ref()
            .filter(|c| now < c.stale_at)
            .map(|c| c.value.clone())
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.in_flight.is_none() && self.cached.as_ref().map_or(true, |c| now >= c.stale_at)
    }
}

/// Cache table mapping a query key to its entry.
pub struct QueryCache<K, V, E> {
    entries: Mutex<HashMap<K, Entry<V, E>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    joined: AtomicU64,
}

impl<K, V, E> fmt::Debug for QueryCache<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<K, V, E> Default for QueryCache<K, V, E> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            joined: AtomicU64::new(0),
        }
    }
}

impl<K, V, E> QueryCache<K, V, E>
where
    K: Eq + Hash + Clone + fmt::Display + Send + Sync,
    V: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key`, running `fetcher` only when no fresh value
    /// is cached and no request for `key` is already in flight.
    ///
    /// A successful result is stored until `stale_time` after it completes.
    pub async fn fetch<F, Fut>(
        &self,
        key: K,
        stale_time: Duration,
        policy: FetchPolicy,
        fetcher: F,
    ) -> Result<V, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let request = {
            let mut entries = self.entries.lock().await;
            let entry = entries.entry(key.clone()).or_default();

            if policy == FetchPolicy::Cached {
                if let Some(value) = entry.fresh(Instant::now()) {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(%key, "query cache hit");
                    return Ok(value);
                }
            }

            match &entry.in_flight {
                Some(request) => {
                    self.joined.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(%key, "joining in-flight query");
                    request.clone()
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(%key, ?policy, "query cache miss, fetching");
                    let request = fetcher().map(|r| r.map_err(Arc::new)).boxed().shared();
                    entry.in_flight = Some(request.clone());
                    request
                }
            }
        };

        let outcome = request.clone().await;
        self.settle(&key, &request, &outcome, stale_time).await;
        outcome
    }

    /// Record a finished request. Only the first caller to settle a given
    /// request writes; later callers find it already cleared.
    async fn settle(
        &self,
        key: &K,
        request: &InFlight<V, E>,
        outcome: &Result<V, Arc<E>>,
        stale_time: Duration,
    ) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if !entry.in_flight.as_ref().is_some_and(|f| f.ptr_eq(request)) {
            return;
        }

        entry.in_flight = None;
        match outcome {
            Ok(value) => {
                entry.cached = Some(Cached {
                    value: value.clone(),
                    stale_at: Instant::now() + stale_time,
                });
                entry.last_error = None;
            }
            Err(err) => {
                tracing::debug!(%key, "query failed, nothing cached");
                entry.last_error = Some(err.clone());
            }
        }
    }

    /// Current state of `key` without starting a request. A stale value is
    /// still reported as `Ready`.
    pub async fn state(&self, key: &K) -> QueryState<V, E> {
        let entries = self.entries.lock().await;
        let Some(entry) = entries.get(key) else {
            return QueryState::Idle;
        };

        if let Some(request) = &entry.in_flight {
            return match request.peek() {
                Some(outcome) => outcome.clone().into(),
                None => QueryState::Loading,
            };
        }
        if let Some(err) = &entry.last_error {
            return QueryState::Failed(err.clone());
        }
        match &entry.cached {
            Some(cached) => QueryState::Ready(cached.value.clone()),
            None => QueryState::Idle,
        }
    }

    /// Drop the cached value for `key` so the next call refetches. An
    /// in-flight request is left running.
    pub async fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.cached = None;
            entry.last_error = None;
            if entry.in_flight.is_none() {
                entries.remove(key);
            }
        }
    }

    /// Forget every entry. Requests still running complete for their
    /// callers but are not stored.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Remove entries whose value is stale and that have nothing in flight.
    /// Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            entries: self.entries.lock().await.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    type TestCache = QueryCache<String, u32, String>;

    const STALE: Duration = Duration::from_secs(300);

    /// Fetcher that counts invocations and takes 100ms to answer.
    fn counting(
        calls: &Arc<AtomicUsize>,
        result: Result<u32, String>,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u32, String>> {
        let calls = calls.clone();
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(100)).await;
                result
            }
            .boxed()
        }
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_value_is_served_without_refetch() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(1)))
            .await;
        let second = cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(2)))
            .await;

        assert_eq!(first.unwrap(), 1);
        assert_eq!(second.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_value_triggers_new_request() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(1)))
            .await
            .unwrap();

        tokio::time::advance(STALE - Duration::from_secs(1)).await;
        let still_fresh = cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(2)))
            .await;
        assert_eq!(still_fresh.unwrap(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        let refetched = cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(2)))
            .await;
        assert_eq!(refetched.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_keys_do_not_share_entries() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let a = cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(1)))
            .await;
        let b = cache
            .fetch(key("b"), STALE, FetchPolicy::Cached, counting(&calls, Ok(2)))
            .await;

        assert_eq!((a.unwrap(), b.unwrap()), (1, 2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_request() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, second) = tokio::join!(
            cache.fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(7))),
            cache.fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(8))),
        );

        assert_eq!(first.unwrap(), 7);
        assert_eq!(second.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().await.joined, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shared_failure_reaches_every_caller_and_is_not_cached() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let (first, second) = tokio::join!(
            cache.fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Err("boom".into()))),
            cache.fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(1))),
        );

        assert_eq!(first.unwrap_err().as_str(), "boom");
        assert_eq!(second.unwrap_err().as_str(), "boom");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state(&key("a")).await.error().map(String::as_str), Some("boom"));

        let retried = cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(3)))
            .await;
        assert_eq!(retried.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn force_bypasses_fresh_value() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache
            .fetch(key("a"), STALE, FetchPolicy::Cached, counting(&calls, Ok(1)))
            .await
            .unwrap();
        let forced = cache
            .fetch(key("a"), STALE, FetchPolicy::Force, counting(&calls, Ok(2)))
            .await;

        assert_eq!(forced.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn state_reports_loading_then_ready() {
        let cache = Arc::new(TestCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        assert!(cache.state(&key("a")).await.is_idle());

        let task = tokio::spawn({
            let cache = cache.clone();
            let fetcher = counting(&calls, Ok(5));
            async move { cache.fetch(key("a"), STALE, FetchPolicy::Cached, fetcher).await }
        });
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert!(cache.state(&key("a")).await.is_loading());
        assert_eq!(task.await.unwrap().unwrap(), 5);
        assert_eq!(cache.state(&key("a")).await.data(), Some(&5));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_and_purge() {
        let cache = TestCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        for k in ["a", "b"] {
            cache
                .fetch(key(k), STALE, FetchPolicy::Cached, counting(&calls, Ok(1)))
                .await
                .unwrap();
        }

        cache.invalidate(&key("a")).await;
        assert!(cache.state(&key("a")).await.is_idle());
        assert_eq!(cache.stats().await.entries, 1);

        assert_eq!(cache.purge_expired().await, 0);
        tokio::time::advance(STALE).await;
        assert_eq!(cache.purge_expired().await, 1);

        cache.clear().await;
        assert_eq!(cache.stats().await.entries, 0);
    }
}
