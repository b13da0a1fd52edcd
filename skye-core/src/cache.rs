//! Single-entry expiring cache for the last fetched [`WeatherSnapshot`].
//!
//! The store is untrusted: on read the entry is parsed, checked structurally
//! and decoded before its age is compared against the time-to-live. Corrupt
//! entries are removed; stale ones are ignored and left for the next write.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;

use crate::{
    clock::Clock,
    error::WeatherError,
    model::{CacheEntry, WeatherSnapshot},
    storage::KeyValueStore,
    validation::validate_weather_data,
};

pub const CACHE_KEY: &str = "weather_cache";

pub fn cache_ttl() -> Duration {
    Duration::minutes(10)
}

#[derive(Debug, Clone)]
pub struct WeatherCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl WeatherCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: cache_ttl(),
        }
    }

    /// Store `snapshot` stamped with the current time. Failures are logged, never returned.
    pub fn write(&self, snapshot: &WeatherSnapshot) {
        if let Err(e) = self.try_write(snapshot) {
            tracing::error!("Error caching weather data: {e:#}");
        }
    }

    fn try_write(&self, snapshot: &WeatherSnapshot) -> anyhow::Result<()> {
        let entry = CacheEntry {
            snapshot: snapshot.clone(),
            timestamp: self.clock.now(),
        };

        let value = serde_json::to_value(&entry)?;
        let check = validate_weather_data(&value["weatherData"]);
        if !check.is_valid {
            tracing::warn!(errors = ?check.errors, "Refusing to cache invalid weather data");
            return Ok(());
        }

        self.store.set(CACHE_KEY, &serde_json::to_string(&value)?)
    }

    /// The cached snapshot, if one exists, is intact, and is younger than the TTL.
    pub fn read(&self) -> Option<WeatherSnapshot> {
        let raw = match self.store.get(CACHE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!("Error reading cached weather data: {e:#}");
                return None;
            }
        };

        let (snapshot, timestamp) = match decode_entry(&raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!("{e}, discarding cached entry");
                self.clear();
                return None;
            }
        };

        let age = self.clock.now() - timestamp;
        if age >= self.ttl {
            tracing::debug!(age_secs = age.num_seconds(), "Cache expired");
            return None;
        }

        Some(snapshot)
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(CACHE_KEY) {
            tracing::error!("Error clearing cache: {e:#}");
        }
    }
}

fn decode_entry(raw: &str) -> Result<(WeatherSnapshot, DateTime<Utc>), WeatherError> {
    let corrupt = |msg: String| WeatherError::CacheCorruption(msg);

    let parsed: Value =
        serde_json::from_str(raw).map_err(|e| corrupt(format!("unparseable entry: {e}")))?;
    if !parsed.is_object() {
        return Err(corrupt("entry is not an object".into()));
    }

    let timestamp = parsed
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| corrupt("invalid cache timestamp".into()))?;

    let data = parsed.get("weatherData").unwrap_or(&Value::Null);
    let check = validate_weather_data(data);
    if !check.is_valid {
        return Err(corrupt(check.errors.join("; ")));
    }

    let snapshot = serde_json::from_value(data.clone())
        .map_err(|e| corrupt(format!("snapshot does not decode: {e}")))?;

    Ok((snapshot, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        model::{Coordinate, CurrentConditions, HourlySlice, LocationInfo},
        storage::MemoryStore,
    };

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            current: CurrentConditions {
                temp: 15,
                feels_like: 13,
                humidity: 82,
                wind_speed: 5,
                visibility: 9,
                description: "light rain".into(),
                icon: "rainy".into(),
                precipitation: 75,
                uv_index: 4.5,
                sunrise: "6:43 AM".into(),
                sunset: "4:53 PM".into(),
                aqi: 2,
                aqi_status: "Good".into(),
                aqi_color: "#7ed957".into(),
            },
            hourly: vec![HourlySlice {
                hour: "3:00 PM".into(),
                temp: 14,
                icon: "rainy".into(),
            }],
            daily: vec![],
            location: LocationInfo {
                coordinate: Coordinate {
                    latitude: 37.7749,
                    longitude: -122.4194,
                },
                city: "San Francisco".into(),
                country: "US".into(),
            },
            last_updated: "2:55:10 PM".into(),
        }
    }

    fn setup() -> (WeatherCache, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = WeatherCache::new(store.clone(), clock.clone());
        (cache, store, clock)
    }

    #[test]
    fn read_empty_is_none() {
        let (cache, _, _) = setup();
        assert!(cache.read().is_none());
    }

    #[test]
    fn write_then_read_within_ttl() {
        let (cache, _, clock) = setup();
        cache.write(&snapshot());

        clock.advance(Duration::minutes(9));
        assert_eq!(cache.read(), Some(snapshot()));
    }

    #[test]
    fn read_at_ttl_is_stale_but_kept() {
        let (cache, store, clock) = setup();
        cache.write(&snapshot());

        clock.advance(cache_ttl());
        assert!(cache.read().is_none());
        assert!(store.get(CACHE_KEY).unwrap().is_some());
    }

    #[test]
    fn rewrite_refreshes_stale_entry() {
        let (cache, _, clock) = setup();
        cache.write(&snapshot());
        clock.advance(Duration::minutes(30));
        assert!(cache.read().is_none());

        cache.write(&snapshot());
        assert!(cache.read().is_some());
    }

    #[test]
    fn corrupt_entry_is_cleared() {
        let (cache, store, _) = setup();
        store.set(CACHE_KEY, "{not json").unwrap();

        assert!(cache.read().is_none());
        assert_eq!(store.get(CACHE_KEY).unwrap(), None);
    }

    #[test]
    fn structurally_invalid_entry_is_cleared() {
        let (cache, store, clock) = setup();
        let blob = serde_json::json!({
            "weatherData": {"current": {}, "hourly": "x"},
            "timestamp": clock.now().to_rfc3339(),
        });
        store.set(CACHE_KEY, &blob.to_string()).unwrap();

        assert!(cache.read().is_none());
        assert_eq!(store.get(CACHE_KEY).unwrap(), None);
        assert!(cache.read().is_none());
    }

    #[test]
    fn bad_timestamp_is_cleared() {
        let (cache, store, _) = setup();
        let mut value = serde_json::to_value(CacheEntry {
            snapshot: snapshot(),
            timestamp: Utc::now(),
        })
        .unwrap();
        value["timestamp"] = "yesterday".into();
        store.set(CACHE_KEY, &value.to_string()).unwrap();

        assert!(cache.read().is_none());
        assert_eq!(store.get(CACHE_KEY).unwrap(), None);
    }

    #[test]
    fn clear_removes_entry() {
        let (cache, _, _) = setup();
        cache.write(&snapshot());
        cache.clear();
        assert!(cache.read().is_none());
    }

    #[test]
    fn arbitrary_coordinates_survive_round_trip() {
        let (cache, _, _) = setup();
        let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut unit = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        };

        for _ in 0..2_000 {
            let mut s = snapshot();
            s.location.coordinate = Coordinate {
                latitude: unit() * 180.0 - 90.0,
                longitude: unit() * 360.0 - 180.0,
            };
            cache.write(&s);
            assert_eq!(cache.read(), Some(s));
        }
    }

    #[derive(Debug)]
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk unavailable")
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk unavailable")
        }

        fn remove(&self, _key: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk unavailable")
        }
    }

    #[test]
    fn store_failures_are_swallowed() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = WeatherCache::new(Arc::new(BrokenStore), clock);

        cache.write(&snapshot());
        assert!(cache.read().is_none());
        cache.clear();
    }

    #[test]
    fn invalid_snapshot_is_not_written() {
        let (cache, store, _) = setup();
        let mut bad = snapshot();
        bad.location.city.clear();
        cache.write(&bad);
        assert_eq!(store.get(CACHE_KEY).unwrap(), None);
    }
}
