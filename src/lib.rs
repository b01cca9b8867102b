//! Investment Valuation - fixed-income valuation engine for CDI-linked and fixed-rate holdings
//!
//! This library provides:
//! - Daily-compounded accrual on business-day (252) or calendar-day (365) bases
//! - Brazilian IOF and regressive IR taxation on redemption
//! - Net value, annualized net yield and sampled value history
//! - Benchmark rate caching with stale-on-error fallback
//! - Portfolio totals valued against one benchmark snapshot

pub mod config;
pub mod error;
pub mod investment;
pub mod valuation;
pub mod benchmark;
pub mod portfolio;

// Re-export commonly used types
pub use config::ValuationConfig;
pub use error::ValuationError;
pub use investment::{Investment, AssetClass, RateMode};
pub use valuation::{ValuationEngine, Valuation, History, HistoryPoint, TaxBreakdown};
pub use benchmark::{BenchmarkSource, CachedBenchmark};
pub use portfolio::{value_portfolio, PortfolioValuation};
