//! Offer models returned by `trading/get_model?models=Offer`.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Payload of the `Offer` model query.
#[derive(Debug, Clone, Deserialize)]
pub struct OffersResponse {
    #[serde(default)]
    pub offers: Vec<Offer>,
}

/// A subscribed instrument with its platform-assigned offer id and the
/// latest quote snapshot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub offer_id: u64,
    /// Symbol, e.g. `"EUR/USD"`.
    pub currency: String,
    #[serde(default)]
    pub buy: Option<Decimal>,
    #[serde(default)]
    pub sell: Option<Decimal>,
    #[serde(default)]
    pub high: Option<Decimal>,
    #[serde(default)]
    pub low: Option<Decimal>,
    #[serde(default)]
    pub spread: Option<Decimal>,
    /// Size of one pip in price units.
    #[serde(default)]
    pub pip: Option<Decimal>,
    #[serde(default)]
    pub volume: Option<Decimal>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub instrument_type: Option<u32>,
    #[serde(default)]
    pub rate_precision: Option<u32>,
    #[serde(default)]
    pub buy_tradable: Option<bool>,
    #[serde(default)]
    pub sell_tradable: Option<bool>,
}
