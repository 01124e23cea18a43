//! TTL status cache with in-flight request coalescing.
//!
//! One cache instance serves every component interested in a kind of entity
//! status. Within the minimum fetch interval callers get cached values and
//! no network call happens; while a fetch is in flight all callers await
//! that same fetch instead of issuing their own. N components asking about
//! overlapping vendor sets therefore produce O(1) network traffic.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use nearvend_client::{ApiError, DiscoveryClient, OnlineStatus};

/// Coalesced fetch results are shared between awaiters, so the error side
/// has to be cloneable.
pub type SharedApiError = Arc<ApiError>;

type FetchResult<S> = Result<HashMap<String, S>, SharedApiError>;
type SharedFetch<S> = Shared<BoxFuture<'static, FetchResult<S>>>;
type Fetcher<S> =
    Arc<dyn Fn(Vec<String>) -> BoxFuture<'static, Result<HashMap<String, S>, ApiError>> + Send + Sync>;

struct CacheState<S> {
    data: HashMap<String, S>,
    last_fetch: Option<Instant>,
    /// At most one fetch in flight; all concurrent callers await this.
    pending: Option<SharedFetch<S>>,
}

struct PollRegistry {
    subscribers: HashMap<u64, Vec<String>>,
    task: Option<JoinHandle<()>>,
}

/// A process-wide status cache, parameterized by the status type and wired
/// to one batched fetch function at construction.
pub struct StatusCache<S> {
    min_interval: Duration,
    fetcher: Fetcher<S>,
    state: Arc<Mutex<CacheState<S>>>,
    pollers: Arc<std::sync::Mutex<PollRegistry>>,
    next_subscriber: AtomicU64,
    /// Handed to the poll task so it can run fetches without keeping the
    /// cache alive.
    weak_self: std::sync::Weak<Self>,
}

impl<S: Clone + Send + Sync + 'static> StatusCache<S> {
    /// Builds a cache around `fetcher`. Returned as `Arc` because the whole
    /// point is one shared instance with many subscribers.
    pub fn new<F, Fut>(min_interval: Duration, fetcher: F) -> Arc<Self>
    where
        F: Fn(Vec<String>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<HashMap<String, S>, ApiError>> + Send + 'static,
    {
        Arc::new_cyclic(|weak_self| Self {
            min_interval,
            fetcher: Arc::new(move |ids| fetcher(ids).boxed()),
            state: Arc::new(Mutex::new(CacheState {
                data: HashMap::new(),
                last_fetch: None,
                pending: None,
            })),
            pollers: Arc::new(std::sync::Mutex::new(PollRegistry {
                subscribers: HashMap::new(),
                task: None,
            })),
            next_subscriber: AtomicU64::new(0),
            weak_self: weak_self.clone(),
        })
    }

    /// Returns statuses for `ids`, fetching at most once per minimum
    /// interval.
    ///
    /// In order: a fetch completed within the interval serves cached values
    /// with no network call; a fetch in flight is awaited rather than
    /// duplicated; otherwise one batched request goes out for the full ID
    /// set. An empty ID list is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the (shared) API error when the batched fetch fails. Failures
    /// are not cached; the next call issues a fresh fetch.
    pub async fn fetch_batch(&self, ids: &[String]) -> Result<HashMap<String, S>, SharedApiError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let fut = {
            let mut state = self.state.lock().await;
            let fresh = state
                .last_fetch
                .is_some_and(|at| at.elapsed() < self.min_interval);
            if fresh {
                debug!(count = ids.len(), "status cache fresh, serving cached values");
                return Ok(Self::subset(&state.data, ids));
            }
            if let Some(pending) = &state.pending {
                debug!("joining in-flight status fetch");
                pending.clone()
            } else {
                let fut = self.start_fetch(ids.to_vec());
                state.pending = Some(fut.clone());
                fut
            }
        };

        fut.await?;

        let state = self.state.lock().await;
        Ok(Self::subset(&state.data, ids))
    }

    /// Statuses currently cached, without any fetch.
    pub async fn cached(&self, ids: &[String]) -> HashMap<String, S> {
        let state = self.state.lock().await;
        Self::subset(&state.data, ids)
    }

    fn subset(data: &HashMap<String, S>, ids: &[String]) -> HashMap<String, S> {
        ids.iter()
            .filter_map(|id| data.get(id).map(|status| (id.clone(), status.clone())))
            .collect()
    }

    /// Builds the shared in-flight future. It performs the batched fetch,
    /// then takes the state lock to commit results and clear the pending
    /// slot before any awaiter resumes.
    fn start_fetch(&self, ids: Vec<String>) -> SharedFetch<S> {
        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        async move {
            let result = fetcher(ids).await;
            let mut state = state.lock().await;
            state.pending = None;
            match result {
                Ok(statuses) => {
                    state.last_fetch = Some(Instant::now());
                    state.data.extend(statuses.clone());
                    Ok(statuses)
                }
                Err(e) => Err(Arc::new(e)),
            }
        }
        .boxed()
        .shared()
    }

    /// Subscribes `ids` to background refresh. All subscribers share one
    /// timer (the first subscriber's `interval` wins) and this cache's
    /// single in-flight slot, so overlapping subscriptions cost one request
    /// per tick. The subscription ends when the returned handle drops; the
    /// timer stops with the last subscriber.
    #[must_use]
    pub fn poll(&self, ids: Vec<String>, interval: Duration) -> PollSubscription {
        let id = self.next_subscriber.fetch_add(1, Ordering::Relaxed);
        let mut registry = self
            .pollers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        registry.subscribers.insert(id, ids);

        if registry.task.is_none() {
            let cache = self.weak_self.clone();
            let pollers = Arc::clone(&self.pollers);
            registry.task = Some(tokio::spawn(async move {
                loop {
                    tokio::time::sleep(interval).await;
                    let Some(cache) = cache.upgrade() else { break };
                    let union: Vec<String> = {
                        let registry = pollers
                            .lock()
                            .unwrap_or_else(std::sync::PoisonError::into_inner);
                        registry
                            .subscribers
                            .values()
                            .flatten()
                            .cloned()
                            .collect::<BTreeSet<_>>()
                            .into_iter()
                            .collect()
                    };
                    if union.is_empty() {
                        continue;
                    }
                    if let Err(e) = cache.fetch_batch(&union).await {
                        debug!(error = %e, "status poll tick failed");
                    }
                }
            }));
        }

        PollSubscription {
            pollers: Arc::clone(&self.pollers),
            id,
        }
    }
}

/// Keeps one subscriber registered with the shared poll timer; dropping it
/// unsubscribes, and the last drop stops the timer.
pub struct PollSubscription {
    pollers: Arc<std::sync::Mutex<PollRegistry>>,
    id: u64,
}

impl Drop for PollSubscription {
    fn drop(&mut self) {
        let mut registry = self
            .pollers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        registry.subscribers.remove(&self.id);
        if registry.subscribers.is_empty() {
            if let Some(task) = registry.task.take() {
                task.abort();
            }
        }
    }
}

/// The production cache: vendor online status via the batch endpoint.
pub type OnlineStatusCache = StatusCache<OnlineStatus>;

#[must_use]
pub fn online_status_cache(
    client: Arc<DiscoveryClient>,
    min_interval: Duration,
) -> Arc<OnlineStatusCache> {
    StatusCache::new(min_interval, move |ids: Vec<String>| {
        let client = Arc::clone(&client);
        async move { client.online_status_batch(&ids).await }
    })
}
