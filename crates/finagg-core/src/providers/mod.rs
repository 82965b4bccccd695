//! Built-in provider adapters.

mod alphavantage;
mod yahoo;

pub use alphavantage::AlphaVantageProvider;
pub use yahoo::YahooFinanceProvider;
