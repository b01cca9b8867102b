//! Fixed-income valuation: day counting, compounding, taxation and history

pub mod days;
pub mod taxes;
mod engine;
mod history;

pub use engine::{ValuationEngine, Valuation, daily_rate, accrue};
pub use history::{History, HistoryIter, HistoryPoint, project_history};
pub use taxes::{TaxBreakdown, apply_taxes};
