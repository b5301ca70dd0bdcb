//! Live API integration tests against the FXCM demo environment.
//!
//! These tests need network access and a demo account token in `FXCM_TOKEN`.
//! Run with: `cargo test --features integration-tests`

#![cfg(feature = "integration-tests")]

use chrono::{TimeZone, Utc};

use fxcm_api::models::TimeUnit;
use fxcm_api::{Environment, FxcmClient, FxcmError, Session};

const SYMBOL: &str = "EUR/GBP";

async fn demo_session() -> (FxcmClient, Session) {
    let token = std::env::var("FXCM_TOKEN").expect("FXCM_TOKEN must be set");
    let client = FxcmClient::new(Environment::Demo, token).expect("Failed to build client");
    let session = client.connect().await.expect("Failed to connect");
    (client, session)
}

async fn is_subscribed(client: &FxcmClient, session: &Session, symbol: &str) -> bool {
    client
        .get_instruments(session)
        .await
        .expect("Failed to get instruments")
        .iter()
        .any(|i| i.symbol == symbol && i.visible)
}

async fn has_offer(client: &FxcmClient, session: &Session, symbol: &str) -> bool {
    client
        .get_offers(session)
        .await
        .expect("Failed to get offers")
        .iter()
        .any(|o| o.currency == symbol)
}

/// Offer id of the first subscribed offer, subscribing to an unsubscribed
/// instrument when the account has none.
async fn first_offer_id(client: &FxcmClient, session: &Session) -> u64 {
    let offers = client.get_offers(session).await.expect("Failed to get offers");
    if let Some(offer) = offers.first() {
        return offer.offer_id;
    }

    let instruments = client
        .get_instruments(session)
        .await
        .expect("Failed to get instruments");
    let symbol = &instruments
        .iter()
        .find(|i| !i.visible)
        .expect("No instrument to subscribe to")
        .symbol;
    client
        .subscribe(session, symbol)
        .await
        .expect("Failed to subscribe");

    client
        .get_offers(session)
        .await
        .expect("Failed to get offers")
        .first()
        .expect("No offers after subscribing")
        .offer_id
}

#[tokio::test]
async fn test_connect_to_demo() {
    let (_client, session) = demo_session().await;
    assert!(!session.id().is_empty());
    assert!(session.is_open());
    session.disconnect();
}

#[tokio::test]
async fn test_candles_before_history_are_empty() {
    let (client, session) = demo_session().await;
    let offer_id = first_offer_id(&client, &session).await;
    let from = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();

    let candles = client
        .get_candles(&session, offer_id, TimeUnit::M1, from, None)
        .await
        .expect("Failed to get candles");

    assert!(candles.is_empty());
}

#[tokio::test]
async fn test_candles_for_known_window() {
    let (client, session) = demo_session().await;
    let offer_id = first_offer_id(&client, &session).await;
    let from = Utc.with_ymd_and_hms(2017, 4, 2, 11, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(2017, 4, 12, 18, 0, 0).unwrap();

    let candles = client
        .get_candles(&session, offer_id, TimeUnit::M1, from, Some(to))
        .await
        .expect("Failed to get candles");

    assert_eq!(candles.len(), 11364);
    assert!(candles.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn test_subscribe_and_unsubscribe() {
    let (client, session) = demo_session().await;

    // Start from a known state.
    if is_subscribed(&client, &session, SYMBOL).await {
        client
            .unsubscribe(&session, SYMBOL)
            .await
            .expect("Failed to unsubscribe");
    }
    assert!(!is_subscribed(&client, &session, SYMBOL).await);
    assert!(!has_offer(&client, &session, SYMBOL).await);

    client
        .subscribe(&session, SYMBOL)
        .await
        .expect("Failed to subscribe");
    assert!(is_subscribed(&client, &session, SYMBOL).await);
    assert!(has_offer(&client, &session, SYMBOL).await);

    client
        .unsubscribe(&session, SYMBOL)
        .await
        .expect("Failed to unsubscribe");
    assert!(!is_subscribed(&client, &session, SYMBOL).await);
    assert!(!has_offer(&client, &session, SYMBOL).await);
}

#[tokio::test]
async fn test_unknown_symbol_is_rejected() {
    let (client, session) = demo_session().await;

    let err = client.subscribe(&session, "abrak").await.unwrap_err();
    assert!(matches!(err, FxcmError::Server(_)));
    assert_eq!(err.to_string(), "Invalid symbol.");

    let err = client.unsubscribe(&session, "abrak").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid symbol.");
}

#[tokio::test]
async fn test_invalid_token_fails_connect() {
    let client = FxcmClient::new(Environment::Demo, "not-a-token").expect("Failed to build client");

    let err = client.connect().await.unwrap_err();
    assert!(matches!(err, FxcmError::Connection(_)));
}
