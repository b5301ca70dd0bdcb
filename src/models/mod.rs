//! Shared models for FXCM REST responses.
//!
//! Every response is wrapped in an envelope carrying an execution flag;
//! the per-endpoint payload types live in the submodules.

pub mod candle;
pub mod instrument;
pub mod offer;
pub mod subscription;

use serde::Deserialize;

pub use candle::{Candle, CandleRange, CandlesResponse, TimeUnit};
pub use instrument::{Instrument, InstrumentList, InstrumentsResponse};
pub use offer::{Offer, OffersResponse};
pub use subscription::UpdateSubscriptionRequest;

/// The `response` object present in every envelope.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseStatus {
    pub executed: bool,
    /// Error payload; a string for most failures, empty on success.
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// A decoded response envelope with its payload fields left untyped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope {
    pub response: ResponseStatus,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Envelope {
    /// Returns a payload field by name.
    pub fn field(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }
}

/// FXCM model names accepted by `trading/get_model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    Offer,
}

impl Model {
    /// Returns the wire-format model name expected by the API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Offer => "Offer",
        }
    }
}
