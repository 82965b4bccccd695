//! Behavior tests for the provider fallback chain.
//!
//! The service walks providers in registration order and only fails a
//! read once every provider has been consulted; the resulting error
//! carries one line per attempt, in chain order.

use finagg_tests::*;

#[tokio::test]
async fn when_primary_provider_fails_the_next_one_answers() {
    // Given: a rate-limited primary and a healthy secondary
    let primary = Arc::new(
        ScriptedProvider::new(ProviderId::Alphavantage)
            .with_quote("IBM", Err(ProviderError::rate_limited("quota exhausted"))),
    );
    let secondary = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo).with_quote("IBM", Ok(quote("IBM", 150.0))),
    );
    let service = service_with(vec![primary.clone(), secondary.clone()]);

    // When: a quote is requested
    let fetched = service
        .quote(&symbol("IBM"))
        .await
        .expect("secondary provider should answer");

    // Then: the secondary's data is returned and both were consulted once
    assert_eq!(fetched.price, 150.0);
    assert_eq!(primary.quote_calls(), 1);
    assert_eq!(secondary.quote_calls(), 1);
}

#[tokio::test]
async fn when_primary_succeeds_the_secondary_is_never_consulted() {
    let primary = Arc::new(
        ScriptedProvider::new(ProviderId::Alphavantage)
            .with_quote("IBM", Ok(quote("IBM", 150.0))),
    );
    let secondary = Arc::new(ScriptedProvider::new(ProviderId::Yahoo));
    let service = service_with(vec![primary, secondary.clone()]);

    service
        .quote(&symbol("IBM"))
        .await
        .expect("primary provider should answer");

    assert_eq!(secondary.quote_calls(), 0);
}

#[tokio::test]
async fn when_every_provider_fails_the_error_lists_each_attempt_in_order() {
    // Given: two providers that fail differently
    let primary = Arc::new(
        ScriptedProvider::new(ProviderId::Alphavantage)
            .with_quote("IBM", Err(ProviderError::rate_limited("quota exhausted"))),
    );
    let secondary = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo)
            .with_quote("IBM", Err(ProviderError::network("connection refused"))),
    );
    let service = service_with(vec![primary, secondary]);

    // When: a quote is requested
    let error = service
        .quote(&symbol("IBM"))
        .await
        .expect_err("no provider can answer");

    // Then: the message names the operation, the symbol, and every attempt
    let message = error.to_string();
    assert!(
        message.starts_with("failed to fetch quote for IBM after trying all providers:"),
        "unexpected message: {message}"
    );
    let alphavantage_at = message
        .find("provider alphavantage failed for IBM: quota exhausted")
        .expect("first attempt should be listed");
    let yahoo_at = message
        .find("provider yahoo failed for IBM: connection refused")
        .expect("second attempt should be listed");
    assert!(alphavantage_at < yahoo_at, "attempts should keep chain order");
}

#[tokio::test]
async fn when_a_provider_returns_an_empty_window_the_chain_continues() {
    // Given: a primary with an empty window and a secondary with data
    let primary = Arc::new(
        ScriptedProvider::new(ProviderId::Alphavantage).with_historical("IBM", Ok(vec![])),
    );
    let secondary = Arc::new(ScriptedProvider::new(ProviderId::Yahoo).with_historical(
        "IBM",
        Ok(vec![record("2023-01-02", 103.0), record("2023-01-01", 100.0)]),
    ));
    let service = service_with(vec![primary.clone(), secondary.clone()]);

    // When: history is requested
    let records = service
        .historical(&symbol("IBM"), "1mo")
        .await
        .expect("secondary provider has the window");

    // Then: the empty result was treated as a failure, not an answer
    assert_eq!(records.len(), 2);
    assert_eq!(primary.historical_calls(), 1);
    assert_eq!(secondary.historical_calls(), 1);
}

#[tokio::test]
async fn when_every_window_is_empty_the_error_names_symbol_and_period() {
    let only = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo).with_historical("IBM", Ok(vec![])),
    );
    let service = service_with(vec![only]);

    let error = service
        .historical(&symbol("IBM"), "5d")
        .await
        .expect_err("no provider has the window");

    let message = error.to_string();
    assert!(
        message.starts_with(
            "failed to fetch historical data for IBM, period 5d after trying all providers:"
        ),
        "unexpected message: {message}"
    );
    assert!(
        message.contains("provider yahoo returned empty historical data for IBM, period 5d"),
        "unexpected message: {message}"
    );
}

#[tokio::test]
async fn when_a_provider_fails_unexpectedly_the_chain_still_continues() {
    // Given: a primary that fails with an internal adapter error
    let primary = Arc::new(
        ScriptedProvider::new(ProviderId::Alphavantage)
            .with_quote("IBM", Err(ProviderError::internal("adapter bug"))),
    );
    let secondary = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo).with_quote("IBM", Ok(quote("IBM", 150.0))),
    );
    let service = service_with(vec![primary, secondary.clone()]);

    // When: a quote is requested
    let fetched = service
        .quote(&symbol("IBM"))
        .await
        .expect("every failure kind is recovered by fallback");

    // Then: the secondary answered as usual
    assert_eq!(fetched.price, 150.0);
    assert_eq!(secondary.quote_calls(), 1);
}

#[tokio::test]
async fn when_a_symbol_is_unknown_to_the_primary_the_secondary_still_gets_asked() {
    // Given: an invalid-symbol answer is recoverable; listings differ
    // between providers
    let primary = Arc::new(
        ScriptedProvider::new(ProviderId::Alphavantage)
            .with_quote("BRK.B", Err(ProviderError::invalid_symbol("unknown symbol"))),
    );
    let secondary = Arc::new(
        ScriptedProvider::new(ProviderId::Yahoo).with_quote("BRK.B", Ok(quote("BRK.B", 305.0))),
    );
    let service = service_with(vec![primary, secondary]);

    let fetched = service
        .quote(&symbol("BRK.B"))
        .await
        .expect("secondary lists the symbol");
    assert_eq!(fetched.price, 305.0);
}

#[test]
fn building_a_service_without_providers_is_rejected() {
    let error = MarketDataService::builder()
        .build()
        .expect_err("providers are required");
    assert!(matches!(error, ServiceError::NoProvidersConfigured));
}
