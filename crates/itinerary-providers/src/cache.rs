//! Reverse-geocode cache.
//!
//! Itinerary markers get recreated whenever a waypoint moves, and users tend
//! to click the same few places; caching by rounded position keeps repeat
//! lookups off the geocoding service.

use async_trait::async_trait;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use itinerary_core::GeoPoint;

use crate::{Geocoder, ProviderError};

/// Rounding applied to cache keys, in degrees (about 1 m at the equator).
const KEY_RESOLUTION_DEG: f64 = 1e-5;

pub trait CacheEntry {
    fn fetched_at(&self) -> Instant;
}

#[derive(Debug, Clone)]
struct AddressEntry {
    fetched_at: Instant,
    address: String,
}

impl CacheEntry for AddressEntry {
    fn fetched_at(&self) -> Instant {
        self.fetched_at
    }
}

/// Drop entries older than `max_age`, then the oldest ones until at most
/// `max_entries` remain.
pub fn prune_cache<K, V>(cache: &DashMap<K, V>, max_entries: usize, max_age: Duration)
where
    K: Clone + Eq + Hash,
    V: CacheEntry,
{
    let now = Instant::now();
    let mut entries: Vec<(K, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().fetched_at()))
        .collect();

    for (key, fetched_at) in &entries {
        if now.duration_since(*fetched_at) > max_age {
            cache.remove(key);
        }
    }

    if cache.len() <= max_entries {
        return;
    }

    entries.sort_by_key(|(_, fetched_at)| *fetched_at);
    for (key, _) in entries {
        if cache.len() <= max_entries {
            break;
        }
        cache.remove(&key);
    }
}

/// A [`Geocoder`] that remembers successful lookups.
pub struct CachedGeocoder {
    inner: Arc<dyn Geocoder>,
    entries: DashMap<(i64, i64), AddressEntry>,
    max_entries: usize,
    ttl: Duration,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, max_entries: usize, ttl: Duration) -> Self {
        Self {
            inner,
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
            ttl,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cache_key(position: GeoPoint) -> (i64, i64) {
    (
        (position.lat / KEY_RESOLUTION_DEG).round() as i64,
        (position.lon / KEY_RESOLUTION_DEG).round() as i64,
    )
}

#[async_trait]
impl Geocoder for CachedGeocoder {
    async fn reverse_geocode(&self, position: GeoPoint) -> Result<String, ProviderError> {
        let key = cache_key(position);
        if let Some(entry) = self.entries.get(&key) {
            if entry.fetched_at.elapsed() <= self.ttl {
                tracing::debug!("Address cache hit for {}", position);
                return Ok(entry.address.clone());
            }
        }

        let address = self.inner.reverse_geocode(position).await?;
        self.entries.insert(
            key,
            AddressEntry {
                fetched_at: Instant::now(),
                address: address.clone(),
            },
        );
        if self.entries.len() > self.max_entries {
            prune_cache(&self.entries, self.max_entries, self.ttl);
        }
        Ok(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGeocoder {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn reverse_geocode(&self, position: GeoPoint) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::InvalidResponse("down".to_string()));
            }
            Ok(format!("{:.1},{:.1}", position.lat, position.lon))
        }
    }

    fn counting(fail: bool) -> Arc<CountingGeocoder> {
        Arc::new(CountingGeocoder {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn repeat_lookups_hit_the_cache() {
        let inner = counting(false);
        let cache = CachedGeocoder::new(inner.clone(), 16, Duration::from_secs(60));

        let first = cache.reverse_geocode(GeoPoint::new(52.5, 13.4)).await.unwrap();
        let second = cache
            .reverse_geocode(GeoPoint::new(52.500_000_1, 13.4))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = counting(true);
        let cache = CachedGeocoder::new(inner.clone(), 16, Duration::from_secs(60));
        assert!(cache.reverse_geocode(GeoPoint::new(1.0, 1.0)).await.is_err());
        assert!(cache.reverse_geocode(GeoPoint::new(1.0, 1.0)).await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn cache_size_is_bounded() {
        let cache = CachedGeocoder::new(counting(false), 3, Duration::from_secs(60));
        for i in 0..10 {
            cache
                .reverse_geocode(GeoPoint::new(i as f64, 0.0))
                .await
                .unwrap();
        }
        assert!(cache.len() <= 3);
    }

    #[test]
    fn prune_drops_expired_entries() {
        let cache = DashMap::new();
        cache.insert(
            (0, 0),
            AddressEntry {
                fetched_at: Instant::now(),
                address: "fresh".to_string(),
            },
        );
        prune_cache(&cache, 10, Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        prune_cache(&cache, 10, Duration::ZERO);
        assert!(cache.is_empty());
    }
}
