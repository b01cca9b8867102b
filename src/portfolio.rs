//! Portfolio-wide valuation against a single benchmark snapshot
//!
//! Every holding in a pass is valued with the same benchmark rate and date,
//! so totals are consistent. Holdings are independent and valued in parallel.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ValuationError;
use crate::investment::Investment;
use crate::valuation::{Valuation, ValuationEngine};

/// A holding paired with its valuation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuedInvestment {
    pub investment: Investment,
    pub valuation: Valuation,
}

impl ValuedInvestment {
    /// Copy of the holding with the computed gross value and change written back
    pub fn refreshed(&self) -> Investment {
        Investment {
            gross_value: self.valuation.gross_value,
            change_percent: self.valuation.change_percent,
            ..self.investment.clone()
        }
    }
}

/// Valuation of every holding plus totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioValuation {
    pub as_of: NaiveDate,
    pub benchmark_rate: f64,
    pub rows: Vec<ValuedInvestment>,
    pub total_gross: f64,
    pub total_net: f64,
    pub total_taxes: f64,
}

/// Value all holdings on `now` with one benchmark rate. Order is preserved.
pub fn value_portfolio(
    engine: &ValuationEngine,
    investments: &[Investment],
    benchmark_rate: f64,
    now: NaiveDate,
) -> Result<PortfolioValuation, ValuationError> {
    let rows = investments
        .par_iter()
        .map(|investment| {
            engine
                .evaluate(investment, benchmark_rate, now)
                .map(|valuation| ValuedInvestment {
                    investment: investment.clone(),
                    valuation,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_gross: f64 = rows.iter().map(|r| r.valuation.gross_value).sum();
    let total_net: f64 = rows.iter().map(|r| r.valuation.net_value).sum();
    let total_taxes: f64 = rows.iter().map(|r| r.valuation.total_taxes()).sum();

    log::info!(
        "Valued {} holdings as of {} at {:.2}% benchmark: gross {:.2}, net {:.2}",
        rows.len(), now, benchmark_rate, total_gross, total_net
    );

    Ok(PortfolioValuation {
        as_of: now,
        benchmark_rate,
        rows,
        total_gross,
        total_net,
        total_taxes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::investment::{AssetClass, RateMode};
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn now() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn holdings() -> Vec<Investment> {
        vec![
            Investment::fixed_income(
                "cdb",
                "CDB 110% CDI",
                10_000.0,
                now() - Duration::days(500),
                RateMode::BenchmarkLinked,
                110.0,
                false,
            ),
            Investment::fixed_income(
                "lci",
                "LCI 12%",
                5_000.0,
                now() - Duration::days(20),
                RateMode::FixedAnnual,
                12.0,
                true,
            ),
            Investment::manual("petr4", "PETR4", AssetClass::Stock, 3_480.0, 4.2),
        ]
    }

    #[test]
    fn test_totals_are_row_sums() {
        let engine = ValuationEngine::default();
        let result = value_portfolio(&engine, &holdings(), 14.9, now()).unwrap();

        assert_eq!(result.rows.len(), 3);
        assert_eq!(result.rows[0].investment.id, "cdb");
        assert_eq!(result.rows[2].investment.id, "petr4");

        let gross: f64 = result.rows.iter().map(|r| r.valuation.gross_value).sum();
        let net: f64 = result.rows.iter().map(|r| r.valuation.net_value).sum();
        assert_relative_eq!(result.total_gross, gross, max_relative = 1e-12);
        assert_relative_eq!(result.total_net, net, max_relative = 1e-12);
        assert_relative_eq!(
            result.total_net + result.total_taxes,
            result.total_gross,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_manual_rows_count_at_stored_value() {
        let engine = ValuationEngine::default();
        let result = value_portfolio(&engine, &holdings(), 14.9, now()).unwrap();
        let stock = &result.rows[2].valuation;

        assert_eq!(stock.gross_value, 3_480.0);
        assert_eq!(stock.net_value, 3_480.0);
        assert_eq!(stock.change_percent, 4.2);
    }

    #[test]
    fn test_refreshed_writes_back_value() {
        let engine = ValuationEngine::default();
        let result = value_portfolio(&engine, &holdings(), 14.9, now()).unwrap();
        let refreshed = result.rows[0].refreshed();

        assert!(refreshed.gross_value > 10_000.0);
        assert_eq!(refreshed.gross_value, result.rows[0].valuation.gross_value);
        assert_eq!(refreshed.principal, Some(10_000.0));
    }

    #[test]
    fn test_invalid_holding_fails_the_pass() {
        let mut investments = holdings();
        investments[1].principal = Some(-1.0);
        assert!(value_portfolio(&ValuationEngine::default(), &investments, 14.9, now()).is_err());
    }
}
