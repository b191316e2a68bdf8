use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::{JsonFileCache, PersistentCache};
use crate::config::GeocoderSettings;
use crate::error::{ProcessingError, Result};
use crate::models::{GeocodeCacheEntry, GeocodeOutcome, ReverseOutcome};
use crate::processors::RateLimiter;
use crate::services::GeocodingService;
use crate::utils::coordinates::{reverse_geocode_key, validate_coordinates};
use crate::utils::text::title_case;

/// Counters for one run of the geocoder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeocodeStats {
    pub cache_hits: usize,
    pub network_hits: usize,
    pub misses: usize,
    pub failures: usize,
    pub reverse_lookups: usize,
    pub reverse_memo_hits: usize,
    pub reverse_resolved: usize,
    pub reverse_no_match: usize,
    pub reverse_failures: usize,
}

impl GeocodeStats {
    pub fn forward_requests(&self) -> usize {
        self.network_hits + self.misses + self.failures
    }
}

/// Forward and reverse geocoding over a rate-limited service.
///
/// Forward results, misses included, go to the durable cache so a rerun never
/// repeats a query. Reverse results live only in an in-memory memo that is
/// cleared by [`Geocoder::begin_run`].
pub struct Geocoder<S, C = JsonFileCache<GeocodeCacheEntry>> {
    service: S,
    cache: C,
    forward_limiter: RateLimiter,
    reverse_limiter: RateLimiter,
    reverse_memo: HashMap<String, ReverseOutcome>,
    retry_unresolved: bool,
    stats: GeocodeStats,
}

impl<S, C> Geocoder<S, C>
where
    S: GeocodingService,
    C: PersistentCache<GeocodeCacheEntry>,
{
    pub fn new(service: S, cache: C, settings: &GeocoderSettings) -> Self {
        Self {
            service,
            cache,
            forward_limiter: RateLimiter::new(settings.min_delay()),
            reverse_limiter: RateLimiter::new(settings.min_delay()),
            reverse_memo: HashMap::new(),
            retry_unresolved: settings.retry_unresolved,
            stats: GeocodeStats::default(),
        }
    }

    /// Replace both limiters, e.g. to run against a local mock without pacing
    pub fn with_rate_limiters(mut self, forward: RateLimiter, reverse: RateLimiter) -> Self {
        self.forward_limiter = forward;
        self.reverse_limiter = reverse;
        self
    }

    pub fn with_retry_unresolved(mut self, retry_unresolved: bool) -> Self {
        self.retry_unresolved = retry_unresolved;
        self
    }

    /// Start a fresh run: clears the reverse memo and the counters
    pub fn begin_run(&mut self) {
        self.reverse_memo.clear();
        self.stats = GeocodeStats::default();
    }

    pub fn stats(&self) -> &GeocodeStats {
        &self.stats
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn reset_cache(&mut self) -> Result<()> {
        self.reverse_memo.clear();
        self.cache.reset()
    }

    /// Resolve a query to coordinates and a raw region.
    ///
    /// A cached entry, resolved or not, is authoritative unless the geocoder
    /// was built with `retry_unresolved`. Service errors are logged and
    /// recorded as unresolved; only cache I/O errors propagate.
    pub async fn forward_geocode(&mut self, query: &str) -> Result<GeocodeOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ProcessingError::InvalidInput(
                "geocode query must not be empty".to_string(),
            ));
        }

        if let Some(entry) = self.cache.get(query)? {
            if entry.is_resolved() || !self.retry_unresolved {
                self.stats.cache_hits += 1;
                return Ok(entry.to_outcome());
            }
            debug!("Retrying unresolved query '{}'", query);
        }

        self.forward_limiter.wait().await;

        let result = self.service.search(query).await.and_then(|found| match found {
            Some(point) => {
                validate_coordinates(point.latitude, point.longitude)?;
                Ok(Some(point))
            }
            None => Ok(None),
        });

        let entry = match result {
            Ok(Some(point)) => {
                self.stats.network_hits += 1;
                debug!(
                    "Geocoded '{}' -> ({:.5}, {:.5}) {:?}",
                    query, point.latitude, point.longitude, point.region
                );
                GeocodeCacheEntry::from(&point)
            }
            Ok(None) => {
                self.stats.misses += 1;
                debug!("No geocoding match for '{}'", query);
                GeocodeCacheEntry::unresolved()
            }
            Err(e) => {
                self.stats.failures += 1;
                warn!("Geocoding '{}' failed: {}", query, e);
                GeocodeCacheEntry::unresolved()
            }
        };

        self.cache.put(query, entry.clone())?;
        Ok(entry.to_outcome())
    }

    /// Administrative region containing a coordinate, title-cased.
    ///
    /// Never fails: service errors come back as `ServiceFailure` so the caller
    /// can tell them apart from a genuine no-match.
    pub async fn reverse_geocode(&mut self, latitude: f64, longitude: f64) -> ReverseOutcome {
        let key = reverse_geocode_key(latitude, longitude);
        if let Some(outcome) = self.reverse_memo.get(&key) {
            self.stats.reverse_memo_hits += 1;
            return outcome.clone();
        }

        self.reverse_limiter.wait().await;
        self.stats.reverse_lookups += 1;

        let outcome = match self.service.reverse(latitude, longitude).await {
            Ok(Some(region)) => {
                self.stats.reverse_resolved += 1;
                ReverseOutcome::Region(title_case(&region))
            }
            Ok(None) => {
                self.stats.reverse_no_match += 1;
                ReverseOutcome::NoMatch
            }
            Err(e) => {
                self.stats.reverse_failures += 1;
                warn!("Reverse geocoding ({}) failed: {}", key, e);
                ReverseOutcome::ServiceFailure(e.to_string())
            }
        };

        self.reverse_memo.insert(key, outcome.clone());
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Calls {
        search: AtomicUsize,
        reverse: AtomicUsize,
    }

    struct StubService {
        calls: Arc<Calls>,
    }

    #[async_trait]
    impl GeocodingService for StubService {
        async fn search(&self, query: &str) -> Result<Option<GeoPoint>> {
            self.calls.search.fetch_add(1, Ordering::SeqCst);
            match query {
                "Hampta Pass, India" => Ok(Some(GeoPoint {
                    latitude: 32.2396,
                    longitude: 77.1887,
                    region: Some("Himachal Pradesh".to_string()),
                })),
                "Broken, India" => Err(ProcessingError::service("stub", "connection reset")),
                "Garbled, India" => Ok(Some(GeoPoint {
                    latitude: 132.0,
                    longitude: 77.0,
                    region: None,
                })),
                _ => Ok(None),
            }
        }

        async fn reverse(&self, latitude: f64, _longitude: f64) -> Result<Option<String>> {
            self.calls.reverse.fetch_add(1, Ordering::SeqCst);
            if latitude > 40.0 {
                Err(ProcessingError::service("stub", "timeout"))
            } else if latitude < 0.0 {
                Ok(None)
            } else {
                Ok(Some("UTTARAKHAND".to_string()))
            }
        }
    }

    fn geocoder(dir: &TempDir, calls: &Arc<Calls>) -> Geocoder<StubService> {
        let cache = JsonFileCache::open(&dir.path().join("geocode_cache.json")).unwrap();
        Geocoder::new(
            StubService {
                calls: Arc::clone(calls),
            },
            cache,
            &GeocoderSettings::default(),
        )
        .with_rate_limiters(RateLimiter::unlimited(), RateLimiter::unlimited())
    }

    #[tokio::test]
    async fn test_forward_hit_is_cached() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        let first = geocoder.forward_geocode("Hampta Pass, India").await.unwrap();
        let second = geocoder.forward_geocode("Hampta Pass, India").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.point().unwrap().region.as_deref(), Some("Himachal Pradesh"));
        assert_eq!(calls.search.load(Ordering::SeqCst), 1);
        assert_eq!(geocoder.stats().cache_hits, 1);
        assert_eq!(geocoder.stats().network_hits, 1);
    }

    #[tokio::test]
    async fn test_cache_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());

        {
            let mut geocoder = geocoder(&dir, &calls);
            geocoder.forward_geocode("Hampta Pass, India").await.unwrap();
            geocoder.forward_geocode("Nowhere, India").await.unwrap();
        }

        let mut geocoder = geocoder(&dir, &calls);
        geocoder.forward_geocode("Hampta Pass, India").await.unwrap();
        let miss = geocoder.forward_geocode("Nowhere, India").await.unwrap();

        assert_eq!(miss, GeocodeOutcome::Unresolved);
        assert_eq!(calls.search.load(Ordering::SeqCst), 2);
        assert_eq!(geocoder.stats().forward_requests(), 0);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_unresolved() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        let outcome = geocoder.forward_geocode("Broken, India").await.unwrap();
        assert_eq!(outcome, GeocodeOutcome::Unresolved);
        assert_eq!(geocoder.stats().failures, 1);
        assert!(geocoder.cache().contains_key("Broken, India"));
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_are_unresolved() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        let outcome = geocoder.forward_geocode("Garbled, India").await.unwrap();
        assert_eq!(outcome, GeocodeOutcome::Unresolved);
        assert_eq!(geocoder.stats().failures, 1);
    }

    #[tokio::test]
    async fn test_retry_unresolved_queries_again() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls).with_retry_unresolved(true);

        geocoder.forward_geocode("Nowhere, India").await.unwrap();
        geocoder.forward_geocode("Nowhere, India").await.unwrap();
        assert_eq!(calls.search.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        assert!(geocoder.forward_geocode("   ").await.is_err());
        assert_eq!(calls.search.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reverse_is_memoized_and_title_cased() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        let first = geocoder.reverse_geocode(30.728491, 79.605012).await;
        // same key at 5 decimals
        let second = geocoder.reverse_geocode(30.7284912, 79.6050123).await;

        assert_eq!(first, ReverseOutcome::Region("Uttarakhand".to_string()));
        assert_eq!(first, second);
        assert_eq!(calls.reverse.load(Ordering::SeqCst), 1);
        assert_eq!(geocoder.stats().reverse_memo_hits, 1);
    }

    #[tokio::test]
    async fn test_reverse_distinguishes_failure_from_no_match() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        assert_eq!(
            geocoder.reverse_geocode(-10.0, 20.0).await,
            ReverseOutcome::NoMatch
        );
        assert!(matches!(
            geocoder.reverse_geocode(45.0, 20.0).await,
            ReverseOutcome::ServiceFailure(_)
        ));
        assert_eq!(geocoder.stats().reverse_no_match, 1);
        assert_eq!(geocoder.stats().reverse_failures, 1);
    }

    #[tokio::test]
    async fn test_begin_run_clears_reverse_memo() {
        let dir = TempDir::new().unwrap();
        let calls = Arc::new(Calls::default());
        let mut geocoder = geocoder(&dir, &calls);

        geocoder.reverse_geocode(30.0, 79.0).await;
        geocoder.begin_run();
        geocoder.reverse_geocode(30.0, 79.0).await;

        assert_eq!(calls.reverse.load(Ordering::SeqCst), 2);
        assert_eq!(geocoder.stats().reverse_lookups, 1);
    }
}
