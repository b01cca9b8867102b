//! Investment data structures and holdings loading

mod data;
pub mod loader;

pub use data::{Investment, AssetClass, RateMode};
pub use loader::{load_investments, load_investments_from_reader, load_default_investments};
