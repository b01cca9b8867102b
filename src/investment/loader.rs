//! Load holdings from CSV

use super::{AssetClass, Investment, RateMode};
use crate::error::ValuationError;
use chrono::NaiveDate;
use csv::Reader;
use std::path::Path;

/// Default path to the sample holdings file
pub const DEFAULT_INVESTMENTS_PATH: &str = "data/investments.csv";

/// Raw CSV row matching the holdings export columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    id: String,
    name: String,
    asset_class: String,
    principal: Option<f64>,
    start_date: Option<String>,
    rate_mode: Option<String>,
    rate_percent: Option<f64>,
    #[serde(default)]
    accrue_on_weekends: Option<bool>,
    gross_value: f64,
    #[serde(default)]
    change_percent: Option<f64>,
}

impl CsvRow {
    fn to_investment(self) -> Result<Investment, ValuationError> {
        let asset_class = AssetClass::parse(&self.asset_class)?;
        let rate_mode = RateMode::parse(self.rate_mode.as_deref().unwrap_or(""))?;

        let start_date = match self.start_date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
            _ => None,
        };

        Ok(Investment {
            id: self.id,
            name: self.name,
            asset_class,
            principal: self.principal,
            start_date,
            rate_mode,
            rate_percent: self.rate_percent,
            accrue_on_weekends: self.accrue_on_weekends.unwrap_or(false),
            gross_value: self.gross_value,
            change_percent: self.change_percent.unwrap_or(0.0),
        })
    }
}

/// Load all holdings from a CSV file
pub fn load_investments<P: AsRef<Path>>(path: P) -> Result<Vec<Investment>, ValuationError> {
    let path = path.as_ref();
    let reader = Reader::from_path(path)?;
    let investments = read_rows(reader)?;
    log::info!("Loaded {} investments from {}", investments.len(), path.display());
    Ok(investments)
}

/// Load holdings from any reader (e.g., string buffer, network stream)
pub fn load_investments_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<Investment>, ValuationError> {
    read_rows(Reader::from_reader(reader))
}

/// Load holdings from the default sample location
pub fn load_default_investments() -> Result<Vec<Investment>, ValuationError> {
    load_investments(DEFAULT_INVESTMENTS_PATH)
}

fn read_rows<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<Investment>, ValuationError> {
    let mut investments = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        investments.push(row.to_investment()?);
    }

    Ok(investments)
}
