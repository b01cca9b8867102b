//! Runtime configuration for valuation runs

use std::env;

/// Default number of points sampled for a history chart
pub const DEFAULT_MAX_HISTORY_POINTS: usize = 60;

/// Benchmark annual rate (percent) used when no source has ever answered
pub const DEFAULT_FALLBACK_BENCHMARK_RATE: f64 = 11.15;

/// Share of the benchmark (percent) earned by a benchmark-linked holding with no rate set
pub const DEFAULT_BENCHMARK_SHARE_PERCENT: f64 = 100.0;

/// How long a fetched benchmark rate stays fresh
pub const DEFAULT_BENCHMARK_CACHE_TTL_HOURS: i64 = 12;

/// Configuration for valuation and benchmark handling
#[derive(Debug, Clone)]
pub struct ValuationConfig {
    /// Upper bound on sampled history points (the final point may add one)
    pub max_history_points: usize,

    /// Benchmark share assumed for benchmark-linked holdings without a rate
    pub default_benchmark_share_percent: f64,

    /// Benchmark rate used when the source fails and nothing is cached
    pub fallback_benchmark_rate: f64,

    /// Freshness window for a cached benchmark rate
    pub benchmark_cache_ttl_hours: i64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            max_history_points: DEFAULT_MAX_HISTORY_POINTS,
            default_benchmark_share_percent: DEFAULT_BENCHMARK_SHARE_PERCENT,
            fallback_benchmark_rate: DEFAULT_FALLBACK_BENCHMARK_RATE,
            benchmark_cache_ttl_hours: DEFAULT_BENCHMARK_CACHE_TTL_HOURS,
        }
    }
}

impl ValuationConfig {
    /// Defaults overridden by environment variables:
    ///   VALUATION_MAX_HISTORY_POINTS, BENCHMARK_DEFAULT_SHARE_PERCENT,
    ///   BENCHMARK_FALLBACK_RATE, BENCHMARK_CACHE_TTL_HOURS
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_history_points = lookup("VALUATION_MAX_HISTORY_POINTS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.max_history_points);

        let default_benchmark_share_percent = lookup("BENCHMARK_DEFAULT_SHARE_PERCENT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.default_benchmark_share_percent);

        let fallback_benchmark_rate = lookup("BENCHMARK_FALLBACK_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.fallback_benchmark_rate);

        let benchmark_cache_ttl_hours = lookup("BENCHMARK_CACHE_TTL_HOURS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.benchmark_cache_ttl_hours);

        Self {
            max_history_points,
            default_benchmark_share_percent,
            fallback_benchmark_rate,
            benchmark_cache_ttl_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ValuationConfig::default();
        assert_eq!(config.max_history_points, 60);
        assert_eq!(config.default_benchmark_share_percent, 100.0);
        assert_eq!(config.fallback_benchmark_rate, 11.15);
        assert_eq!(config.benchmark_cache_ttl_hours, 12);
    }

    #[test]
    fn test_overrides() {
        let config = ValuationConfig::from_lookup(|key| match key {
            "VALUATION_MAX_HISTORY_POINTS" => Some("120".to_string()),
            "BENCHMARK_DEFAULT_SHARE_PERCENT" => Some("95".to_string()),
            "BENCHMARK_FALLBACK_RATE" => Some("not-a-number".to_string()),
            _ => None,
        });
        assert_eq!(config.max_history_points, 120);
        assert_eq!(config.default_benchmark_share_percent, 95.0);
        assert_eq!(config.fallback_benchmark_rate, 11.15);
        assert_eq!(config.benchmark_cache_ttl_hours, 12);
    }
}
