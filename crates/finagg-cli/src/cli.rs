use clap::{Args, Parser, Subcommand};

/// Stock market data from the command line.
#[derive(Debug, Parser)]
#[command(name = "finagg", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current quote for one symbol.
    Quote(QuoteArgs),
    /// Daily price history for one symbol.
    History(HistoryArgs),
    /// Performance comparison across several symbols.
    Compare(CompareArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Ticker symbol, e.g. IBM.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Ticker symbol, e.g. IBM.
    pub symbol: String,

    /// History window, e.g. 5d, 1mo, 1y.
    #[arg(long, default_value = "1mo")]
    pub period: String,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Ticker symbols to compare.
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    /// History window the comparison is computed over.
    #[arg(long, default_value = "1mo")]
    pub period: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_takes_a_positional_symbol() {
        let cli = Cli::try_parse_from(["finagg", "quote", "IBM"]).expect("must parse");
        match cli.command {
            Command::Quote(args) => assert_eq!(args.symbol, "IBM"),
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(!cli.pretty);
    }

    #[test]
    fn history_period_defaults_to_one_month() {
        let cli = Cli::try_parse_from(["finagg", "history", "IBM"]).expect("must parse");
        match cli.command {
            Command::History(args) => {
                assert_eq!(args.symbol, "IBM");
                assert_eq!(args.period, "1mo");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn compare_requires_at_least_one_symbol() {
        assert!(Cli::try_parse_from(["finagg", "compare"]).is_err());

        let cli = Cli::try_parse_from([
            "finagg", "compare", "AAPL", "GOOG", "--period", "1y", "--pretty",
        ])
        .expect("must parse");
        match cli.command {
            Command::Compare(args) => {
                assert_eq!(args.symbols, ["AAPL", "GOOG"]);
                assert_eq!(args.period, "1y");
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.pretty);
    }
}
