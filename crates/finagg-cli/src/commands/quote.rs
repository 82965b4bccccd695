use serde_json::Value;

use finagg_core::{MarketDataService, Symbol};

use crate::cli::QuoteArgs;
use crate::error::CliError;

pub async fn run(args: &QuoteArgs, service: &MarketDataService) -> Result<Value, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let quote = service.quote(&symbol).await?;
    Ok(serde_json::to_value(quote)?)
}
