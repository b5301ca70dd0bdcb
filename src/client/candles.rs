//! Historical candle retrieval.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::FxcmClient;
use crate::Result;
use crate::models::{Candle, CandleRange, CandlesResponse, TimeUnit};
use crate::websocket::Session;

impl FxcmClient {
    /// Fetches candles for `offer_id` between `from` and `to`.
    ///
    /// GET candles/{offer_id}/{time_unit}/?from={from}&to={to}
    ///
    /// Without `to` the window ends 15 days after `from`.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::Validation`](crate::FxcmError::Validation)
    /// without contacting the server if `to` is more than 15 days after
    /// `from`.
    pub async fn get_candles(
        &self,
        session: &Session,
        offer_id: u64,
        time_unit: TimeUnit,
        from: DateTime<Utc>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<Candle>> {
        let range = CandleRange::new(from, to)?;
        let path = candles_path(offer_id, time_unit, &range);

        let response: CandlesResponse = self.get(session, &path).await?;
        debug!(
            offer_id,
            time_unit = time_unit.as_str(),
            count = response.candles.len(),
            "Received candles"
        );

        response
            .candles
            .iter()
            .map(|row| Candle::try_from(row.as_slice()))
            .collect()
    }
}

fn candles_path(offer_id: u64, time_unit: TimeUnit, range: &CandleRange) -> String {
    format!(
        "candles/{offer_id}/{time_unit}/?from={}&to={}",
        range.from_secs(),
        range.to_secs()
    )
}
