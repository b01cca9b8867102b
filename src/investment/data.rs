//! Investment data structures matching the holdings format

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;

/// Broad class of the holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssetClass {
    FixedIncome,
    Stock,
    Crypto,
    RealEstate,
}

impl AssetClass {
    /// Parse the stored spelling
    pub fn parse(value: &str) -> Result<Self, ValuationError> {
        match value.trim() {
            "FIXED_INCOME" => Ok(AssetClass::FixedIncome),
            "STOCK" => Ok(AssetClass::Stock),
            "CRYPTO" => Ok(AssetClass::Crypto),
            "REAL_ESTATE" => Ok(AssetClass::RealEstate),
            other => Err(ValuationError::unknown("asset_class", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::FixedIncome => "FIXED_INCOME",
            AssetClass::Stock => "STOCK",
            AssetClass::Crypto => "CRYPTO",
            AssetClass::RealEstate => "REAL_ESTATE",
        }
    }
}

/// How the holding earns its yield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateMode {
    /// Percentage of the benchmark annual rate (e.g. 110% of CDI)
    BenchmarkLinked,
    /// Fixed annual rate (e.g. 12.5% a.a.)
    FixedAnnual,
    /// Current value typed in by the user, no accrual
    Manual,
}

impl RateMode {
    /// Parse the stored spelling; accepts the legacy `CDI` / `FIXED` names
    pub fn parse(value: &str) -> Result<Self, ValuationError> {
        match value.trim() {
            "BENCHMARK_LINKED" | "CDI" => Ok(RateMode::BenchmarkLinked),
            "FIXED_ANNUAL" | "FIXED" => Ok(RateMode::FixedAnnual),
            "MANUAL" | "" => Ok(RateMode::Manual),
            other => Err(ValuationError::unknown("rate_mode", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RateMode::BenchmarkLinked => "BENCHMARK_LINKED",
            RateMode::FixedAnnual => "FIXED_ANNUAL",
            RateMode::Manual => "MANUAL",
        }
    }
}

/// A single holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    /// Identifier assigned by the store
    pub id: String,

    /// Display label
    pub name: String,

    pub asset_class: AssetClass,

    /// Amount deposited at `start_date`
    #[serde(default)]
    pub principal: Option<f64>,

    /// Date the principal was deposited
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    pub rate_mode: RateMode,

    /// Benchmark share for `BenchmarkLinked`, annual rate for `FixedAnnual` (both in percent)
    #[serde(default)]
    pub rate_percent: Option<f64>,

    /// Accrue every calendar day on a 365 base instead of business days on a 252 base
    #[serde(default)]
    pub accrue_on_weekends: bool,

    /// Last known gross value (computed or typed in)
    pub gross_value: f64,

    /// Display change in percent
    #[serde(default)]
    pub change_percent: f64,
}

impl Investment {
    /// Create a holding whose value is maintained by hand
    pub fn manual(
        id: impl Into<String>,
        name: impl Into<String>,
        asset_class: AssetClass,
        gross_value: f64,
        change_percent: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_class,
            principal: None,
            start_date: None,
            rate_mode: RateMode::Manual,
            rate_percent: None,
            accrue_on_weekends: false,
            gross_value,
            change_percent,
        }
    }

    /// Create a fixed-income holding valued by the engine
    pub fn fixed_income(
        id: impl Into<String>,
        name: impl Into<String>,
        principal: f64,
        start_date: NaiveDate,
        rate_mode: RateMode,
        rate_percent: f64,
        accrue_on_weekends: bool,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            asset_class: AssetClass::FixedIncome,
            principal: Some(principal),
            start_date: Some(start_date),
            rate_mode,
            rate_percent: Some(rate_percent),
            accrue_on_weekends,
            gross_value: principal,
            change_percent: 0.0,
        }
    }

    /// Whether the valuation engine owns this holding's value.
    /// A zero principal counts as missing.
    pub fn is_auto_valued(&self) -> bool {
        self.asset_class == AssetClass::FixedIncome
            && self.rate_mode != RateMode::Manual
            && self.start_date.is_some()
            && self.principal.is_some_and(|p| p != 0.0)
    }

    /// Annual growth factor as a decimal (0.12 for 12% a.a.).
    /// A benchmark-linked holding without a rate earns `default_share_percent` of the benchmark.
    pub fn annual_factor(&self, benchmark_rate: f64, default_share_percent: f64) -> f64 {
        match self.rate_mode {
            RateMode::BenchmarkLinked => {
                let share = self.rate_percent.unwrap_or(default_share_percent);
                (benchmark_rate / 100.0) * (share / 100.0)
            }
            RateMode::FixedAnnual => self.rate_percent.unwrap_or(0.0) / 100.0,
            RateMode::Manual => 0.0,
        }
    }

    /// Days in the accrual year: 365 when weekends accrue, 252 business days otherwise
    pub fn annual_base(&self) -> f64 {
        if self.accrue_on_weekends { 365.0 } else { 252.0 }
    }
}
