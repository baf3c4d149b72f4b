//! Dashboard refresh controller
//!
//! Decides, on every load, whether to serve the persisted cache, fetch fresh
//! data from upstream, or stay off the network because upstream rate-limited
//! us recently. The decision tree, in priority order:
//!
//! 1. An active rate-limit lock short-circuits to the cache-only path.
//! 2. A cache entry younger than the freshness window is served as-is.
//! 3. Otherwise upstream is fetched. A 429 writes a new lock; any failure
//!    falls back to whatever is cached, however old.
//!
//! Nothing is retried automatically. Calling [`RefreshController::refresh_dashboard`]
//! again re-runs the tree from step 1.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, DashboardCache, RateLimitLock};
use crate::clock::Clock;
use crate::data::{FetchError, LeagueData, Upstream};
use crate::store::KeyValueStore;

/// How long a cached payload is served without touching the network (10 min)
pub const CACHE_DURATION_MS: i64 = 600_000;

/// How long to stay off the network after a 429 (30 min)
pub const RATE_LIMIT_BACKOFF_MS: i64 = 1_800_000;

/// Freshness and back-off windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub cache_duration: Duration,
    pub rate_limit_backoff: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            cache_duration: Duration::milliseconds(CACHE_DURATION_MS),
            rate_limit_backoff: Duration::milliseconds(RATE_LIMIT_BACKOFF_MS),
        }
    }
}

/// Why a fetch did not produce data
#[derive(Debug, Error)]
pub enum RefreshError {
    /// Upstream answered 429 and a lock was recorded
    #[error("Rate limited by upstream until {blocked_until}")]
    RateLimited { blocked_until: DateTime<Utc> },

    /// Transport failure, non-success status or malformed body
    #[error("Failed to fetch league data: {0}")]
    Fetch(#[source] FetchError),
}

/// Where the data handed to the renderers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Fetched from upstream during this refresh
    Network,
    /// Cached entry inside the freshness window
    FreshCache,
    /// Cached entry served because fetching was impossible or failed
    StaleCache,
    /// No fetch and no cache: nothing to render
    Nothing,
}

/// Warning banner shown alongside (possibly missing) data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Upstream is rate-limiting us; minutes until the lock lifts
    RateLimited { minutes_remaining: i64 },
    /// Upstream could not be reached or returned garbage
    Offline,
}

impl Notice {
    /// User-facing banner text
    pub fn message(&self, has_data: bool) -> String {
        let tail = if has_data {
            "Showing cached data."
        } else {
            "No cached data available."
        };
        match self {
            Notice::RateLimited { minutes_remaining } => format!(
                "Rate limited by the FPL API. Try again in {} min. {}",
                minutes_remaining, tail
            ),
            Notice::Offline => format!("Could not reach the FPL API. {}", tail),
        }
    }
}

/// Result of one refresh
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    /// Payload for the renderers; `None` means nothing can be shown
    pub data: Option<LeagueData>,
    pub source: DataSource,
    pub notice: Option<Notice>,
    /// Timestamp of the payload in `data`
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RefreshOutcome {
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Banner text, if there is something to warn about
    pub fn banner(&self) -> Option<String> {
        self.notice.map(|n| n.message(self.has_data()))
    }
}

/// Explicit cache + upstream + clock, replacing ambient global state
pub struct RefreshController<S, U, C> {
    cache: DashboardCache<S>,
    upstream: U,
    clock: C,
    policy: RefreshPolicy,
}

impl<S, U, C> RefreshController<S, U, C>
where
    S: KeyValueStore,
    U: Upstream,
    C: Clock,
{
    pub fn new(store: S, upstream: U, clock: C) -> Self {
        Self {
            cache: DashboardCache::new(store),
            upstream,
            clock,
            policy: RefreshPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &DashboardCache<S> {
        &self.cache
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// Runs the decision tree once and returns what the renderers should show
    pub async fn refresh_dashboard(&self) -> RefreshOutcome {
        let now = self.clock.now();

        if let Some(lock) = self.cache.read_lock() {
            if lock.is_active(now) {
                let minutes_remaining = lock.minutes_remaining(now);
                info!(
                    blocked_until = %lock.blocked_until,
                    minutes_remaining, "rate limit lock active, skipping network"
                );
                return self.load_from_cache_only(Notice::RateLimited { minutes_remaining });
            }
        }

        if let Some(entry) = self.cache.read_entry() {
            if entry.is_fresh(now, self.policy.cache_duration) {
                debug!(
                    age_secs = entry.age(now).num_seconds(),
                    "serving fresh cache"
                );
                return RefreshOutcome {
                    fetched_at: Some(entry.timestamp),
                    data: Some(entry.content),
                    source: DataSource::FreshCache,
                    notice: None,
                };
            }
        }

        match self.fetch_and_store().await {
            Ok(entry) => RefreshOutcome {
                fetched_at: Some(entry.timestamp),
                data: Some(entry.content),
                source: DataSource::Network,
                notice: None,
            },
            Err(RefreshError::RateLimited { blocked_until }) => {
                let lock = RateLimitLock::until(blocked_until);
                let minutes_remaining = lock.minutes_remaining(self.clock.now());
                self.load_from_cache_only(Notice::RateLimited { minutes_remaining })
            }
            Err(e) => {
                warn!(error = %e, "refresh failed, falling back to cache");
                self.load_from_cache_only(Notice::Offline)
            }
        }
    }

    /// Fetches upstream and persists the result
    ///
    /// On 429 a lock is written before the error is returned. Cache write
    /// failures are logged and do not fail the fetch.
    pub async fn fetch_and_store(&self) -> Result<CacheEntry, RefreshError> {
        let result = self.upstream.fetch_league().await;
        let completed_at = self.clock.now();

        match result {
            Ok(content) => {
                let entry = CacheEntry::new(completed_at, content);
                if let Err(e) = self.cache.write_entry(&entry) {
                    warn!(error = %e, "failed to persist fetched data");
                }
                info!(
                    players = entry.content.elements.len(),
                    fixtures = entry.content.fixtures.len(),
                    "fetched fresh league data"
                );
                Ok(entry)
            }
            Err(e) if e.is_rate_limited() => {
                let blocked_until = completed_at
                    .checked_add_signed(self.policy.rate_limit_backoff)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                self.record_rate_limit(blocked_until);
                Err(RefreshError::RateLimited { blocked_until })
            }
            Err(e) => Err(RefreshError::Fetch(e)),
        }
    }

    /// Serves whatever is cached, however old, with a warning
    pub fn load_from_cache_only(&self, notice: Notice) -> RefreshOutcome {
        match self.cache.read_entry() {
            Some(entry) => RefreshOutcome {
                fetched_at: Some(entry.timestamp),
                data: Some(entry.content),
                source: DataSource::StaleCache,
                notice: Some(notice),
            },
            None => {
                warn!(?notice, "no cached data available, nothing to render");
                RefreshOutcome {
                    data: None,
                    source: DataSource::Nothing,
                    notice: Some(notice),
                    fetched_at: None,
                }
            }
        }
    }

    fn record_rate_limit(&self, blocked_until: DateTime<Utc>) {
        warn!(%blocked_until, "upstream rate limit hit, backing off");
        if let Err(e) = self.cache.write_lock(&RateLimitLock::until(blocked_until)) {
            warn!(error = %e, "failed to persist rate limit lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::data::sample::sample_league;
    use crate::store::{MemoryStore, StoreError};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Upstream that replays canned results and counts calls
    struct ScriptedUpstream {
        responses: Mutex<Vec<Result<LeagueData, FetchError>>>,
        calls: AtomicUsize,
        latency: Mutex<Option<(Arc<ManualClock>, Duration)>>,
    }

    impl ScriptedUpstream {
        fn new(responses: Vec<Result<LeagueData, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
                latency: Mutex::new(None),
            })
        }

        /// Moves `clock` forward by `by` during every fetch
        fn take_time(&self, clock: &Arc<ManualClock>, by: Duration) {
            *self.latency.lock().unwrap() = Some((Arc::clone(clock), by));
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Upstream for Arc<ScriptedUpstream> {
        async fn fetch_league(&self) -> Result<LeagueData, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((clock, by)) = self.latency.lock().unwrap().as_ref() {
                clock.advance(*by);
            }
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                panic!("unexpected upstream call");
            }
            responses.remove(0)
        }
    }

    /// Store whose writes always fail
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    type TestController = RefreshController<Arc<MemoryStore>, Arc<ScriptedUpstream>, Arc<ManualClock>>;

    fn controller(
        responses: Vec<Result<LeagueData, FetchError>>,
    ) -> (TestController, Arc<MemoryStore>, Arc<ScriptedUpstream>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let upstream = ScriptedUpstream::new(responses);
        let clock = Arc::new(ManualClock::new(t()));
        let controller =
            RefreshController::new(Arc::clone(&store), Arc::clone(&upstream), Arc::clone(&clock));
        (controller, store, upstream, clock)
    }

    fn seed_cache(store: &Arc<MemoryStore>, timestamp: DateTime<Utc>, content: LeagueData) {
        DashboardCache::new(Arc::clone(store))
            .write_entry(&CacheEntry::new(timestamp, content))
            .unwrap();
    }

    fn seed_lock(store: &Arc<MemoryStore>, blocked_until: DateTime<Utc>) {
        DashboardCache::new(Arc::clone(store))
            .write_lock(&RateLimitLock::until(blocked_until))
            .unwrap();
    }

    #[tokio::test]
    async fn test_no_cache_no_lock_fetches_and_caches_at_now() {
        let payload = sample_league();
        let (controller, store, upstream, _clock) = controller(vec![Ok(payload.clone())]);

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        assert_eq!(outcome.source, DataSource::Network);
        assert_eq!(outcome.data.as_ref(), Some(&payload));
        assert!(outcome.notice.is_none());

        let entry = DashboardCache::new(store).read_entry().expect("cache should be written");
        assert_eq!(entry.timestamp, t());
        assert_eq!(entry.content, payload);
    }

    #[tokio::test]
    async fn test_cache_timestamp_is_fetch_completion_time() {
        let (controller, store, upstream, clock) = controller(vec![Ok(sample_league())]);
        upstream.take_time(&clock, Duration::seconds(3));

        let outcome = controller.refresh_dashboard().await;

        let entry = DashboardCache::new(store).read_entry().expect("cache should be written");
        assert_eq!(entry.timestamp, t() + Duration::seconds(3));
        assert_eq!(outcome.fetched_at, Some(t() + Duration::seconds(3)));
    }

    #[tokio::test]
    async fn test_lock_is_set_from_completion_time_after_slow_429() {
        let (controller, store, upstream, clock) =
            controller(vec![Err(FetchError::RateLimited)]);
        upstream.take_time(&clock, Duration::seconds(5));

        controller.refresh_dashboard().await;

        let lock = DashboardCache::new(store).read_lock().expect("lock should be written");
        assert_eq!(lock.blocked_until, t() + Duration::seconds(5) + Duration::minutes(30));
    }

    #[tokio::test]
    async fn test_unbounded_backoff_saturates_instead_of_overflowing() {
        let (controller, store, _upstream, _clock) =
            controller(vec![Err(FetchError::RateLimited)]);
        let controller = controller.with_policy(RefreshPolicy {
            rate_limit_backoff: Duration::MAX,
            ..RefreshPolicy::default()
        });

        let outcome = controller.refresh_dashboard().await;

        let lock = DashboardCache::new(store).read_lock().expect("lock should be written");
        assert_eq!(lock.blocked_until, DateTime::<Utc>::MAX_UTC);
        assert!(matches!(outcome.notice, Some(Notice::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_network() {
        let (controller, store, upstream, _clock) = controller(vec![]);
        seed_cache(&store, t() - Duration::minutes(5), sample_league());

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 0);
        assert_eq!(outcome.source, DataSource::FreshCache);
        assert_eq!(outcome.data, Some(sample_league()));
        assert_eq!(outcome.fetched_at, Some(t() - Duration::minutes(5)));
    }

    #[tokio::test]
    async fn test_cache_exactly_ten_minutes_old_is_refetched() {
        let mut newer = sample_league();
        newer.total_players = 42;
        let (controller, store, upstream, _clock) = controller(vec![Ok(newer.clone())]);
        seed_cache(&store, t() - Duration::minutes(10), sample_league());

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        assert_eq!(outcome.data, Some(newer));
    }

    #[tokio::test]
    async fn test_stale_cache_and_429_writes_lock_and_serves_stale() {
        let (controller, store, upstream, _clock) =
            controller(vec![Err(FetchError::RateLimited)]);
        seed_cache(&store, t() - Duration::minutes(15), sample_league());

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        let lock = DashboardCache::new(Arc::clone(&store))
            .read_lock()
            .expect("lock should be written");
        assert_eq!(lock.blocked_until, t() + Duration::milliseconds(1_800_000));
        assert_eq!(outcome.source, DataSource::StaleCache);
        assert_eq!(outcome.data, Some(sample_league()));
        assert_eq!(
            outcome.notice,
            Some(Notice::RateLimited {
                minutes_remaining: 30
            })
        );
    }

    #[tokio::test]
    async fn test_active_lock_without_cache_renders_nothing() {
        let (controller, store, upstream, _clock) = controller(vec![]);
        seed_lock(&store, t() + Duration::minutes(10));

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 0);
        assert_eq!(outcome.source, DataSource::Nothing);
        assert!(outcome.data.is_none());
        assert_eq!(
            outcome.notice,
            Some(Notice::RateLimited {
                minutes_remaining: 10
            })
        );
        assert!(outcome.banner().unwrap().contains("10 min"));
    }

    #[tokio::test]
    async fn test_active_lock_beats_fresh_cache_but_still_serves_it() {
        let (controller, store, upstream, _clock) = controller(vec![]);
        seed_cache(&store, t() - Duration::minutes(1), sample_league());
        seed_lock(&store, t() + Duration::seconds(30));

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 0);
        assert_eq!(outcome.source, DataSource::StaleCache);
        assert_eq!(
            outcome.notice,
            Some(Notice::RateLimited {
                minutes_remaining: 1
            })
        );
    }

    #[tokio::test]
    async fn test_expired_lock_allows_fetch() {
        let (controller, store, upstream, _clock) = controller(vec![Ok(sample_league())]);
        seed_lock(&store, t() - Duration::seconds(1));

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        assert_eq!(outcome.source, DataSource::Network);
    }

    #[tokio::test]
    async fn test_server_error_falls_back_to_stale_cache_offline() {
        let (controller, store, upstream, _clock) = controller(vec![Err(FetchError::Status(500))]);
        seed_cache(&store, t() - Duration::hours(3), sample_league());

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        assert_eq!(outcome.source, DataSource::StaleCache);
        assert_eq!(outcome.notice, Some(Notice::Offline));
        assert!(DashboardCache::new(store).read_lock().is_none());
    }

    #[tokio::test]
    async fn test_parse_failure_without_cache_renders_nothing() {
        let parse_error = serde_json::from_str::<LeagueData>("nope").unwrap_err();
        let (controller, _store, _upstream, _clock) =
            controller(vec![Err(FetchError::ParseError(parse_error))]);

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(outcome.source, DataSource::Nothing);
        assert!(outcome.data.is_none());
        assert_eq!(outcome.notice, Some(Notice::Offline));
        assert_eq!(
            outcome.banner().as_deref(),
            Some("Could not reach the FPL API. No cached data available.")
        );
    }

    #[tokio::test]
    async fn test_second_refresh_within_window_does_not_fetch() {
        let (controller, _store, upstream, clock) = controller(vec![Ok(sample_league())]);

        controller.refresh_dashboard().await;
        clock.advance(Duration::minutes(9));
        let outcome = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        assert_eq!(outcome.source, DataSource::FreshCache);
        assert_eq!(outcome.fetched_at, Some(t()));
    }

    #[tokio::test]
    async fn test_lock_blocks_until_it_expires() {
        let (controller, _store, upstream, clock) =
            controller(vec![Err(FetchError::RateLimited), Ok(sample_league())]);

        controller.refresh_dashboard().await;
        clock.advance(Duration::minutes(29));
        let blocked = controller.refresh_dashboard().await;
        clock.advance(Duration::minutes(1));
        let unblocked = controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 2);
        assert_eq!(
            blocked.notice,
            Some(Notice::RateLimited {
                minutes_remaining: 1
            })
        );
        assert_eq!(unblocked.source, DataSource::Network);
    }

    #[tokio::test]
    async fn test_fetch_and_store_reports_rate_limit() {
        let (controller, _store, _upstream, _clock) =
            controller(vec![Err(FetchError::RateLimited)]);

        let result = controller.fetch_and_store().await;

        match result {
            Err(RefreshError::RateLimited { blocked_until }) => {
                assert_eq!(blocked_until, t() + Duration::milliseconds(RATE_LIMIT_BACKOFF_MS))
            }
            other => panic!("Expected RateLimited, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_policy_shortens_windows() {
        let (controller, store, upstream, _clock) = controller(vec![Ok(sample_league())]);
        let controller = controller.with_policy(RefreshPolicy {
            cache_duration: Duration::minutes(1),
            rate_limit_backoff: Duration::minutes(2),
        });
        seed_cache(&store, t() - Duration::minutes(2), sample_league());

        controller.refresh_dashboard().await;

        assert_eq!(upstream.calls(), 1);
        assert_eq!(controller.policy().cache_duration, Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_renders_fetched_data() {
        let upstream = ScriptedUpstream::new(vec![Ok(sample_league())]);
        let controller = RefreshController::new(
            ReadOnlyStore,
            Arc::clone(&upstream),
            ManualClock::new(t()),
        );

        let outcome = controller.refresh_dashboard().await;

        assert_eq!(outcome.source, DataSource::Network);
        assert_eq!(outcome.data, Some(sample_league()));
    }
}
