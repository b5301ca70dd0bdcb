use chrono::{TimeDelta, Utc};
use tracing::info;
use zeroize::Zeroizing;

use fxcm_api::FxcmClient;
use fxcm_api::FxcmError;
use fxcm_api::config::fetch_config;
use fxcm_api::credentials::{populate_env_from_keychain, save_token};
use fxcm_api::models::TimeUnit;

#[tokio::main]
async fn main() -> Result<(), FxcmError> {
    // Initialize tracing subscriber for logging output.
    tracing_subscriber::fmt::init();

    if std::env::args().nth(1).as_deref() == Some("--store-token") {
        return store_token();
    }

    populate_env_from_keychain();
    let app_config = fetch_config()?;
    info!(environment = %app_config.fxcm.environment, "Loaded configuration");

    let client = FxcmClient::from_config(&app_config.fxcm)?;
    let session = client.connect().await?;

    let offers = client.get_offers(&session).await?;
    for offer in &offers {
        info!(
            offer_id = offer.offer_id,
            currency = %offer.currency,
            buy = ?offer.buy,
            sell = ?offer.sell,
            "Offer"
        );
    }

    if let Some(offer) = offers.first() {
        let from = Utc::now() - TimeDelta::days(1);
        let candles = client
            .get_candles(&session, offer.offer_id, TimeUnit::H1, from, Some(Utc::now()))
            .await?;
        info!(currency = %offer.currency, count = candles.len(), "Fetched hourly candles");
        if let Some(last) = candles.last() {
            info!(date = %last.date, bid_close = last.bid_close, ask_close = last.ask_close, "Latest candle");
        }
    }

    session.disconnect();

    Ok(())
}

/// Reads a token from stdin and saves it to the keychain.
fn store_token() -> Result<(), FxcmError> {
    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| FxcmError::Config(format!("failed to read token from stdin: {e}")))?;

    save_token(&line)?;
    info!("Stored token in the keychain");
    Ok(())
}
