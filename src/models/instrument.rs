//! Instrument (tradable symbol) models.

use serde::Deserialize;

/// Payload of `GET trading/get_instruments`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentsResponse {
    pub data: InstrumentList,
}

/// Container for the instrument list.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentList {
    #[serde(default)]
    pub instrument: Vec<Instrument>,
}

/// A tradable symbol and whether the account is subscribed to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    /// `true` when the symbol is in the account's subscription list.
    pub visible: bool,
    /// Display position in the platform's symbol list.
    #[serde(default)]
    pub order: Option<i64>,
}
