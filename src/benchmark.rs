//! Benchmark (CDI) rate sourcing policy
//!
//! Sources are pluggable; this module only decides when to ask them and
//! what to answer when they fail:
//! 1. A cached rate younger than the TTL is returned as is
//! 2. Otherwise the source is asked and a good answer is cached; NaN,
//!    infinite or negative answers count as failures
//! 3. On failure the stale cached rate wins, then the configured fallback
//!
//! The engine never calls into this module. Callers resolve one rate per
//! rendering pass and hand the same number to every valuation.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::ValuationConfig;
use crate::error::ValuationError;

/// CDI trades this many percentage points below the Selic target
pub const SELIC_CDI_SPREAD: f64 = 0.10;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("Provider error: {0}")]
    Provider(String),
    #[error("No rate returned")]
    NoData,
    #[error("Parsing error: {0}")]
    Parsing(String),
}

/// Anything that can report an annual benchmark rate in percent
pub trait BenchmarkSource: Send + Sync {
    fn fetch(&self) -> Result<f64, BenchmarkError>;
}

/// Source that always answers the same rate
#[derive(Debug, Clone, Copy)]
pub struct StaticSource(pub f64);

impl BenchmarkSource for StaticSource {
    fn fetch(&self) -> Result<f64, BenchmarkError> {
        Ok(self.0)
    }
}

/// Adapts a Selic source into a CDI source
#[derive(Debug, Clone)]
pub struct CdiFromSelic<S>(pub S);

impl<S: BenchmarkSource> BenchmarkSource for CdiFromSelic<S> {
    fn fetch(&self) -> Result<f64, BenchmarkError> {
        let selic = self.0.fetch()?;
        if !selic.is_finite() {
            return Err(BenchmarkError::Parsing(format!("Selic rate {}", selic)));
        }
        Ok(cdi_from_selic(selic))
    }
}

fn usable_rate(rate: f64) -> Result<f64, BenchmarkError> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(rate)
    } else {
        Err(BenchmarkError::Parsing(format!("unusable benchmark rate {}", rate)))
    }
}

/// CDI estimate from the Selic rate, rounded to 2 decimals
pub fn cdi_from_selic(selic: f64) -> f64 {
    ((selic - SELIC_CDI_SPREAD) * 100.0).round() / 100.0
}

/// Rate remembered from the last successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CachedRate {
    pub rate: f64,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRate {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Read a persisted cache entry; a missing file is an empty cache
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Option<CachedRate>, ValuationError> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

/// Persist a cache entry as JSON
pub fn save_snapshot<P: AsRef<Path>>(path: P, snapshot: &CachedRate) -> Result<(), ValuationError> {
    fs::write(path, serde_json::to_string(snapshot)?)?;
    Ok(())
}

/// Time-expiring cache in front of a benchmark source. Never fails to produce a rate.
#[derive(Debug)]
pub struct CachedBenchmark<S> {
    source: S,
    ttl: Duration,
    fallback_rate: f64,
    cached: Option<CachedRate>,
}

impl<S: BenchmarkSource> CachedBenchmark<S> {
    pub fn new(source: S, config: &ValuationConfig) -> Self {
        Self {
            source,
            ttl: Duration::hours(config.benchmark_cache_ttl_hours),
            fallback_rate: config.fallback_benchmark_rate,
            cached: None,
        }
    }

    /// Seed the cache, e.g. from a persisted snapshot
    pub fn with_snapshot(mut self, snapshot: Option<CachedRate>) -> Self {
        self.cached = snapshot;
        self
    }

    pub fn snapshot(&self) -> Option<CachedRate> {
        self.cached
    }

    /// Benchmark annual rate (percent) to use at `now`
    pub fn current(&mut self, now: DateTime<Utc>) -> f64 {
        if let Some(cached) = self.cached {
            if cached.is_fresh(now, self.ttl) {
                return cached.rate;
            }
        }

        match self.source.fetch().and_then(usable_rate) {
            Ok(rate) => {
                log::info!("Fetched benchmark rate {:.2}%", rate);
                self.cached = Some(CachedRate { rate, fetched_at: now });
                rate
            }
            Err(e) => match self.cached {
                Some(stale) => {
                    log::warn!(
                        "Benchmark fetch failed ({}), using cached {:.2}% from {}",
                        e, stale.rate, stale.fetched_at
                    );
                    stale.rate
                }
                None => {
                    log::warn!(
                        "Benchmark fetch failed ({}), using fallback {:.2}%",
                        e, self.fallback_rate
                    );
                    self.fallback_rate
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Source that counts calls and answers from a script
    struct ScriptedSource {
        calls: Arc<AtomicUsize>,
        answer: Option<f64>,
    }

    impl BenchmarkSource for ScriptedSource {
        fn fetch(&self) -> Result<f64, BenchmarkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.ok_or_else(|| BenchmarkError::Provider("unreachable".to_string()))
        }
    }

    fn scripted(answer: Option<f64>) -> (ScriptedSource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (ScriptedSource { calls: calls.clone(), answer }, calls)
    }

    fn at(hour: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_750_000_000, 0).unwrap() + Duration::hours(hour)
    }

    #[test]
    fn test_cdi_from_selic() {
        assert_eq!(cdi_from_selic(11.25), 11.15);
        assert_eq!(cdi_from_selic(15.0), 14.9);
        assert_eq!(CdiFromSelic(StaticSource(10.5)).fetch().unwrap(), 10.4);
    }

    #[test]
    fn test_fresh_cache_skips_source() {
        let (source, calls) = scripted(Some(14.9));
        let mut benchmark = CachedBenchmark::new(source, &ValuationConfig::default());

        assert_eq!(benchmark.current(at(0)), 14.9);
        assert_eq!(benchmark.current(at(11)), 14.9);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_cache_refetches() {
        let (source, calls) = scripted(Some(14.9));
        let mut benchmark = CachedBenchmark::new(source, &ValuationConfig::default())
            .with_snapshot(Some(CachedRate { rate: 13.65, fetched_at: at(0) }));

        assert_eq!(benchmark.current(at(12)), 14.9);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(benchmark.snapshot().unwrap().fetched_at, at(12));
    }

    #[test]
    fn test_failure_uses_stale_rate() {
        let (source, calls) = scripted(None);
        let mut benchmark = CachedBenchmark::new(source, &ValuationConfig::default())
            .with_snapshot(Some(CachedRate { rate: 13.65, fetched_at: at(0) }));

        assert_eq!(benchmark.current(at(48)), 13.65);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failure_without_cache_uses_fallback() {
        let (source, _) = scripted(None);
        let mut benchmark = CachedBenchmark::new(source, &ValuationConfig::default());

        assert_eq!(benchmark.current(at(0)), 11.15);
        assert!(benchmark.snapshot().is_none());
    }

    #[test]
    fn test_unusable_rate_is_not_cached() {
        let mut benchmark =
            CachedBenchmark::new(StaticSource(f64::NAN), &ValuationConfig::default());
        assert_eq!(benchmark.current(at(0)), 11.15);
        assert!(benchmark.snapshot().is_none());

        let mut benchmark =
            CachedBenchmark::new(StaticSource(-1.0), &ValuationConfig::default());
        assert_eq!(benchmark.current(at(0)), 11.15);
        assert!(benchmark.snapshot().is_none());
    }

    #[test]
    fn test_unusable_rate_keeps_stale_cache() {
        let stale = CachedRate { rate: 13.65, fetched_at: at(0) };
        let mut benchmark =
            CachedBenchmark::new(StaticSource(f64::INFINITY), &ValuationConfig::default())
                .with_snapshot(Some(stale));

        assert_eq!(benchmark.current(at(24)), 13.65);
        assert_eq!(benchmark.snapshot(), Some(stale));
    }

    #[test]
    fn test_snapshot_persistence() {
        let path = std::env::temp_dir()
            .join(format!("benchmark_snapshot_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        assert_eq!(load_snapshot(&path).unwrap(), None);

        let snapshot = CachedRate { rate: 14.9, fetched_at: at(3) };
        save_snapshot(&path, &snapshot).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), Some(snapshot));

        fs::remove_file(&path).unwrap();
    }
}
