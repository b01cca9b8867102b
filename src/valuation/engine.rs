//! Core valuation engine for fixed-income holdings

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ValuationConfig;
use crate::error::ValuationError;
use crate::investment::Investment;
use super::days::{business_days_between, calendar_days_between};
use super::history::{sample_history, History};
use super::taxes::{apply_taxes, TaxBreakdown};

/// Point-in-time valuation of one holding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    /// Accrued value before taxes
    pub gross_value: f64,

    /// Redeemable value after IOF and IR
    pub net_value: f64,

    /// Gross value minus principal
    pub profit: f64,

    pub taxes: TaxBreakdown,

    pub calendar_days: u32,

    pub business_days: u32,

    /// Net return compounded to a 365-day year, percent, 2 decimals
    pub annualized_net_yield_percent: f64,

    /// Gross change over principal, percent, 2 decimals
    pub change_percent: f64,
}

impl Valuation {
    /// Valuation that carries a stored value through unchanged
    pub fn identity(value: f64, change_percent: f64) -> Self {
        Self {
            gross_value: value,
            net_value: value,
            profit: 0.0,
            taxes: TaxBreakdown::default(),
            calendar_days: 0,
            business_days: 0,
            annualized_net_yield_percent: 0.0,
            change_percent,
        }
    }

    pub fn total_taxes(&self) -> f64 {
        self.taxes.total()
    }
}

/// Gross, taxes and net at a single elapsed-day offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AccruedPoint {
    pub gross_value: f64,
    pub profit: f64,
    pub taxes: TaxBreakdown,
    pub net_value: f64,
}

/// Validated accrual parameters for an auto-valued holding
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AccrualTerms {
    pub principal: f64,
    pub start_date: NaiveDate,
    pub daily_rate: f64,
    pub accrue_on_weekends: bool,
}

impl AccrualTerms {
    /// Extract terms from a holding. `Ok(None)` when the engine does not own its value.
    /// `default_share_percent` applies to benchmark-linked holdings without a rate.
    pub fn from_investment(
        investment: &Investment,
        benchmark_rate: f64,
        default_share_percent: f64,
    ) -> Result<Option<Self>, ValuationError> {
        if !investment.is_auto_valued() {
            return Ok(None);
        }

        // is_auto_valued guarantees both are present
        let (Some(principal), Some(start_date)) = (investment.principal, investment.start_date)
        else {
            return Ok(None);
        };

        if !principal.is_finite() || principal < 0.0 {
            return Err(ValuationError::invalid(
                "principal",
                format!("must be non-negative, got {}", principal),
            ));
        }
        if !benchmark_rate.is_finite() {
            return Err(ValuationError::invalid("benchmark_rate", "must be finite"));
        }
        if let Some(rate) = investment.rate_percent {
            if !rate.is_finite() {
                return Err(ValuationError::invalid("rate_percent", "must be finite"));
            }
        }

        let annual_factor = investment.annual_factor(benchmark_rate, default_share_percent);
        if annual_factor <= -1.0 {
            return Err(ValuationError::invalid(
                "rate_percent",
                format!("annual factor {} would wipe out the principal", annual_factor),
            ));
        }

        Ok(Some(Self {
            principal,
            start_date,
            daily_rate: daily_rate(annual_factor, investment.annual_base()),
            accrue_on_weekends: investment.accrue_on_weekends,
        }))
    }

    /// Business days used for accrual up to `date`.
    ///
    /// Offset 0 is forced to 0 so a same-day deposit accrues nothing. Later
    /// dates use the inclusive count, which includes the start day: a Monday
    /// deposit valued on Tuesday counts 2. The first weekday step therefore
    /// jumps from 0 to 2 accrual days.
    pub fn business_days_to(&self, date: NaiveDate) -> u32 {
        if date <= self.start_date {
            0
        } else {
            business_days_between(self.start_date, date)
        }
    }

    /// Value the holding `calendar_days` after the deposit, with `business_days` elapsed
    pub fn accrue_at(&self, calendar_days: u32, business_days: u32) -> AccruedPoint {
        let days_to_consider = if self.accrue_on_weekends {
            calendar_days
        } else {
            business_days
        };
        let gross_value = accrue(self.principal, self.daily_rate, days_to_consider);
        let profit = gross_value - self.principal;
        let taxes = apply_taxes(profit, calendar_days);

        AccruedPoint {
            gross_value,
            profit,
            taxes,
            net_value: gross_value - taxes.total(),
        }
    }
}

/// Daily compounding rate equivalent to `annual_factor` over `annual_base` days
pub fn daily_rate(annual_factor: f64, annual_base: f64) -> f64 {
    (1.0 + annual_factor).powf(1.0 / annual_base) - 1.0
}

/// Principal compounded at `daily_rate` for `days`
pub fn accrue(principal: f64, daily_rate: f64, days: u32) -> f64 {
    principal * (1.0 + daily_rate).powi(days as i32)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Stateless valuation engine; the benchmark rate and valuation date are
/// passed on every call
#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: ValuationConfig,
}

impl ValuationEngine {
    pub fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Value a holding on `now` against an annual `benchmark_rate` (percent).
    ///
    /// Holdings the engine does not own (manual rate, non fixed income,
    /// missing principal or start date) come back as the identity of their
    /// stored value. Deposits dated on or after `now` have not accrued yet and
    /// come back at principal.
    pub fn evaluate(
        &self,
        investment: &Investment,
        benchmark_rate: f64,
        now: NaiveDate,
    ) -> Result<Valuation, ValuationError> {
        let terms = AccrualTerms::from_investment(
            investment,
            benchmark_rate,
            self.config.default_benchmark_share_percent,
        )?;
        let Some(terms) = terms else {
            return Ok(Valuation::identity(investment.gross_value, investment.change_percent));
        };

        if terms.start_date >= now {
            log::debug!(
                "{}: start date {} not before {}, no accrual",
                investment.id, terms.start_date, now
            );
            return Ok(Valuation::identity(terms.principal, 0.0));
        }

        let calendar_days = calendar_days_between(terms.start_date, now);
        let business_days = terms.business_days_to(now);
        let point = terms.accrue_at(calendar_days, business_days);

        let annualized_net_yield_percent = if calendar_days > 0 {
            let growth = point.net_value / terms.principal;
            round2((growth.powf(365.0 / calendar_days as f64) - 1.0) * 100.0)
        } else {
            0.0
        };

        log::debug!(
            "{}: {} calendar / {} business days, gross {:.2}, net {:.2}",
            investment.id, calendar_days, business_days, point.gross_value, point.net_value
        );

        Ok(Valuation {
            gross_value: point.gross_value,
            net_value: point.net_value,
            profit: point.profit,
            taxes: point.taxes,
            calendar_days,
            business_days,
            annualized_net_yield_percent,
            change_percent: round2((point.gross_value / terms.principal - 1.0) * 100.0),
        })
    }

    /// Sampled gross/net history from the deposit date up to `now`, with the
    /// configured number of points
    pub fn project_history(
        &self,
        investment: &Investment,
        benchmark_rate: f64,
        now: NaiveDate,
    ) -> Result<History, ValuationError> {
        self.project_history_sampled(
            investment,
            benchmark_rate,
            now,
            self.config.max_history_points,
        )
    }

    /// Same as `project_history` with an explicit point budget
    pub fn project_history_sampled(
        &self,
        investment: &Investment,
        benchmark_rate: f64,
        now: NaiveDate,
        max_points: usize,
    ) -> Result<History, ValuationError> {
        sample_history(
            investment,
            benchmark_rate,
            now,
            max_points,
            self.config.default_benchmark_share_percent,
        )
    }
}
