//! Behavior tests for multi-symbol performance comparison.

use finagg_tests::*;

fn window(closes: &[(&str, f64)]) -> Vec<HistoricalRecord> {
    closes.iter().map(|(date, close)| record(date, *close)).collect()
}

#[tokio::test]
async fn comparison_computes_performance_over_the_window() {
    // Given: a two-day window, newest record first
    let provider = Arc::new(ScriptedProvider::new(ProviderId::Yahoo).with_historical(
        "GOOG",
        Ok(window(&[("2023-01-02", 103.0), ("2023-01-01", 100.0)])),
    ));
    let service = service_with(vec![provider]);

    // When: the symbol is compared over the period
    let performances = service
        .compare_symbols(&[symbol("GOOG")], "1mo")
        .await
        .expect("comparison succeeds");

    // Then: the window opens on the oldest close and closes on the newest
    assert_eq!(performances.len(), 1);
    let performance = &performances[0];
    assert_eq!(performance.start_price, 100.0);
    assert_eq!(performance.end_price, 103.0);
    assert_eq!(performance.change, 3.0);
    assert!((performance.change_percent - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn comparison_keeps_the_input_order_of_surviving_symbols() {
    let provider = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo)
            .with_historical(
                "AAPL",
                Ok(window(&[("2023-01-02", 130.0), ("2023-01-01", 125.0)])),
            )
            .with_historical(
                "MSFT",
                Err(ProviderError::network("connection refused")),
            )
            .with_historical(
                "GOOG",
                Ok(window(&[("2023-01-02", 103.0), ("2023-01-01", 100.0)])),
            ),
    );
    let service = service_with(vec![provider]);

    let symbols = [symbol("AAPL"), symbol("MSFT"), symbol("GOOG")];
    let performances = service
        .compare_symbols(&symbols, "1mo")
        .await
        .expect("two symbols survive");

    let names: Vec<&str> = performances
        .iter()
        .map(|performance| performance.symbol.as_str())
        .collect();
    assert_eq!(names, ["AAPL", "GOOG"]);
}

#[tokio::test]
async fn a_single_record_window_drops_the_symbol() {
    // A one-record window has no start and end to compare.
    let provider = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo)
            .with_historical("AAPL", Ok(window(&[("2023-01-02", 130.0)])))
            .with_historical(
                "GOOG",
                Ok(window(&[("2023-01-02", 103.0), ("2023-01-01", 100.0)])),
            ),
    );
    let service = service_with(vec![provider]);

    let performances = service
        .compare_symbols(&[symbol("AAPL"), symbol("GOOG")], "1mo")
        .await
        .expect("one symbol survives");

    assert_eq!(performances.len(), 1);
    assert_eq!(performances[0].symbol.as_str(), "GOOG");
}

#[tokio::test]
async fn a_zero_start_price_yields_zero_percent_change() {
    let provider = Arc::new(ScriptedProvider::new(ProviderId::Yahoo).with_historical(
        "GOOG",
        Ok(window(&[("2023-01-02", 10.0), ("2023-01-01", 0.0)])),
    ));
    let service = service_with(vec![provider]);

    let performances = service
        .compare_symbols(&[symbol("GOOG")], "1mo")
        .await
        .expect("comparison succeeds");

    assert_eq!(performances[0].change, 10.0);
    assert_eq!(performances[0].change_percent, 0.0);
}

#[tokio::test]
async fn when_every_symbol_drops_out_the_comparison_fails() {
    let provider = Arc::new(ScriptedProvider::new(ProviderId::Yahoo));
    let service = service_with(vec![provider]);

    let error = service
        .compare_symbols(&[symbol("AAPL"), symbol("GOOG")], "1mo")
        .await
        .expect_err("nothing survives");

    assert!(matches!(error, ServiceError::ComparisonExhausted { .. }));
    assert!(error
        .to_string()
        .starts_with("comparison failed for all requested symbols:"));
}

#[tokio::test]
async fn comparison_windows_come_from_the_same_cache_as_direct_history_reads() {
    // Given: a window already fetched directly
    let provider = Arc::new(ScriptedProvider::new(ProviderId::Yahoo).with_historical(
        "GOOG",
        Ok(window(&[("2023-01-02", 103.0), ("2023-01-01", 100.0)])),
    ));
    let service = service_with(vec![provider.clone()]);
    service
        .historical(&symbol("GOOG"), "1mo")
        .await
        .expect("direct read");

    // When: the same symbol and period are compared
    service
        .compare_symbols(&[symbol("GOOG")], "1mo")
        .await
        .expect("comparison succeeds");

    // Then: the comparison reused the cached window
    assert_eq!(provider.historical_calls(), 1);
}
