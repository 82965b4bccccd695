mod models;
mod symbol;

pub use models::{HistoricalRecord, Quote, StockPerformance};
pub use symbol::Symbol;
