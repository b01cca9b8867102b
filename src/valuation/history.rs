//! Sampled value history for charting
//!
//! A `History` only holds the accrual terms and the sampling grid; points are
//! computed on demand, so iterating twice recomputes the same sequence.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_BENCHMARK_SHARE_PERCENT;
use crate::error::ValuationError;
use crate::investment::Investment;
use super::days::calendar_days_between;
use super::engine::AccrualTerms;

/// One sampled point of a holding's history
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub calendar_days: u32,
    pub gross_value: f64,
    pub net_value: f64,
    pub profit: f64,
    pub total_taxes: f64,
}

/// Restartable, lazily evaluated history of a holding
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    terms: Option<AccrualTerms>,
    total_days: u32,
    step: u32,
}

impl History {
    fn empty() -> Self {
        Self { terms: None, total_days: 0, step: 1 }
    }

    /// Days between consecutive samples
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Number of points the sequence yields
    pub fn len(&self) -> usize {
        match self.terms {
            Some(_) => (self.total_days / self.step) as usize + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a fresh pass over the points
    pub fn iter(&self) -> HistoryIter<'_> {
        HistoryIter {
            history: self,
            next_offset: 0,
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = HistoryPoint;
    type IntoIter = HistoryIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the sampled points of a `History`
#[derive(Debug, Clone)]
pub struct HistoryIter<'a> {
    history: &'a History,
    next_offset: u32,
}

impl Iterator for HistoryIter<'_> {
    type Item = HistoryPoint;

    fn next(&mut self) -> Option<HistoryPoint> {
        let terms = self.history.terms.as_ref()?;
        if self.next_offset > self.history.total_days {
            return None;
        }

        let offset = self.next_offset;
        self.next_offset += self.history.step;

        let date = terms.start_date + Duration::days(offset as i64);
        let point = terms.accrue_at(offset, terms.business_days_to(date));

        Some(HistoryPoint {
            date,
            calendar_days: offset,
            gross_value: point.gross_value,
            net_value: point.net_value,
            profit: point.profit,
            total_taxes: point.taxes.total(),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.history.terms {
            Some(_) if self.next_offset <= self.history.total_days => {
                ((self.history.total_days - self.next_offset) / self.history.step) as usize + 1
            }
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for HistoryIter<'_> {}

/// Sample a holding's value between its start date and `now`, with at most
/// `max_points` intervals of `ceil(total_days / max_points)` days each.
///
/// Empty for holdings the engine does not value and for deposits dated
/// after `now`. A `max_points` of zero is treated as one. Invalid inputs
/// (negative principal, non-finite rates) fail with `InvalidInput`, as in
/// `ValuationEngine::evaluate`.
///
/// Benchmark-linked holdings without a rate earn the default share; use
/// `ValuationEngine::project_history_sampled` to apply a configured one.
pub fn project_history(
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
        DEFAULT_BENCHMARK_SHARE_PERCENT,
    )
}

pub(crate) fn sample_history(
    investment: &Investment,
    benchmark_rate: f64,
    now: NaiveDate,
    max_points: usize,
    default_share_percent: f64,
) -> Result<History, ValuationError> {
    let terms = AccrualTerms::from_investment(investment, benchmark_rate, default_share_percent)?;
    let Some(terms) = terms else {
        return Ok(History::empty());
    };

    if terms.start_date > now {
        return Ok(History::empty());
    }

    let total_days = calendar_days_between(terms.start_date, now);
    let max_points = max_points.max(1) as u32;
    let step = total_days.div_ceil(max_points).max(1);

    log::debug!(
        "{}: history over {} days, step {}",
        investment.id, total_days, step
    );

    Ok(History {
        terms: Some(terms),
        total_days,
        step,
    })
}
