use serde::Serialize;
use serde_json::Value;

use finagg_core::{HistoricalRecord, MarketDataService, Symbol};

use crate::cli::HistoryArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct HistoryResponse {
    symbol: Symbol,
    period: String,
    records: Vec<HistoricalRecord>,
}

pub async fn run(args: &HistoryArgs, service: &MarketDataService) -> Result<Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let records = service.historical(&symbol, &args.period).await?;

    Ok(serde_json::to_value(HistoryResponse {
        symbol,
        period: args.period.clone(),
        records,
    })?)
}
