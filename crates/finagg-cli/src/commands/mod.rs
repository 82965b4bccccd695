mod compare;
mod history;
mod quote;

use serde_json::Value;

use finagg_core::MarketDataService;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, service: &MarketDataService) -> Result<Value, CliError> {
    match &cli.command {
        Command::Quote(args) => quote::run(args, service).await,
        Command::History(args) => history::run(args, service).await,
        Command::Compare(args) => compare::run(args, service).await,
    }
}
