//! Brazilian fixed-income taxation: IOF on short holdings and regressive IR
//!
//! - IOF applies to profit on redemptions within 30 calendar days, at a rate
//!   read from a daily table.
//! - IR applies to the profit left after IOF, at a single bracket rate chosen
//!   by holding tenure (not marginal).

use serde::{Deserialize, Serialize};

/// IOF rate in percent, indexed by calendar days held (0..=29)
pub const IOF_TABLE: [u8; 30] = [
    96, 93, 90, 86, 83, 80, 76, 73, 70, 66, 63, 60, 56, 53, 50,
    46, 43, 40, 36, 33, 30, 26, 23, 20, 16, 13, 10, 6, 3, 0,
];

/// IR brackets as (days held strictly greater than, rate in percent), longest tenure first
pub const WITHHOLDING_BRACKETS: [(u32, f64); 3] = [(720, 15.0), (360, 17.5), (180, 20.0)];

/// IR rate for holdings of 180 days or less
pub const SHORT_TERM_WITHHOLDING_RATE: f64 = 22.5;

/// Taxes due on redemption
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxBreakdown {
    /// IOF amount
    pub transaction_tax_value: f64,
    /// IOF rate applied, in percent
    pub transaction_tax_rate_percent: f64,
    /// IR amount
    pub withholding_tax_value: f64,
    /// IR rate applied, in percent
    pub withholding_tax_rate_percent: f64,
}

impl TaxBreakdown {
    pub fn total(&self) -> f64 {
        self.transaction_tax_value + self.withholding_tax_value
    }
}

/// IOF rate in percent for a holding of `calendar_days`
pub fn transaction_tax_rate_percent(calendar_days: u32) -> f64 {
    IOF_TABLE
        .get(calendar_days as usize)
        .map(|&rate| rate as f64)
        .unwrap_or(0.0)
}

/// IR rate in percent for a holding of `calendar_days`
pub fn withholding_tax_rate_percent(calendar_days: u32) -> f64 {
    WITHHOLDING_BRACKETS
        .iter()
        .find(|(threshold, _)| calendar_days > *threshold)
        .map(|(_, rate)| *rate)
        .unwrap_or(SHORT_TERM_WITHHOLDING_RATE)
}

/// Compute IOF and IR on `profit` for a holding of `calendar_days`.
/// Non-positive profit is untaxed; the bracket rates are still reported.
pub fn apply_taxes(profit: f64, calendar_days: u32) -> TaxBreakdown {
    let transaction_rate = transaction_tax_rate_percent(calendar_days);
    let withholding_rate = withholding_tax_rate_percent(calendar_days);

    if profit <= 0.0 {
        return TaxBreakdown {
            transaction_tax_rate_percent: transaction_rate,
            withholding_tax_rate_percent: withholding_rate,
            ..Default::default()
        };
    }

    let transaction_tax_value = profit * transaction_rate / 100.0;
    let profit_after_transaction_tax = profit - transaction_tax_value;
    let withholding_tax_value = profit_after_transaction_tax * withholding_rate / 100.0;

    TaxBreakdown {
        transaction_tax_value,
        transaction_tax_rate_percent: transaction_rate,
        withholding_tax_value,
        withholding_tax_rate_percent: withholding_rate,
    }
}
