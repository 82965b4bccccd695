use serde::Serialize;
use serde_json::Value;

use finagg_core::{MarketDataService, StockPerformance, Symbol};

use crate::cli::CompareArgs;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct CompareResponse {
    period: String,
    performances: Vec<StockPerformance>,
}

pub async fn run(args: &CompareArgs, service: &MarketDataService) -> Result<Value, CliError> {
    let symbols = args
        .symbols
        .iter()
        .map(|raw| Symbol::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let performances = service.compare_symbols(&symbols, &args.period).await?;

    Ok(serde_json::to_value(CompareResponse {
        period: args.period.clone(),
        performances,
    })?)
}
