//! Historical candle models and the request range policy.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{FxcmError, Result};

/// Longest span the candle endpoint accepts in one request.
pub const MAX_RANGE_DAYS: i64 = 15;

/// Message returned when a requested range exceeds [`MAX_RANGE_DAYS`].
pub const RANGE_TOO_LONG: &str = "The requested date range can not be longer than 15 days";

/// Number of leading columns a candle row must carry.
pub const CANDLE_COLUMNS: usize = 10;

/// Candle granularity (wire names are FXCM period ids).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "m1")]
    M1,
    #[serde(rename = "m5")]
    M5,
    #[serde(rename = "m15")]
    M15,
    #[serde(rename = "m30")]
    M30,
    H1,
    H2,
    H3,
    H4,
    H6,
    H8,
    D1,
    W1,
    /// One calendar month (wire name: `"M1"`).
    #[serde(rename = "M1")]
    Month1,
}

impl TimeUnit {
    /// Returns the period id as it appears in the candle path.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::M1 => "m1",
            TimeUnit::M5 => "m5",
            TimeUnit::M15 => "m15",
            TimeUnit::M30 => "m30",
            TimeUnit::H1 => "H1",
            TimeUnit::H2 => "H2",
            TimeUnit::H3 => "H3",
            TimeUnit::H4 => "H4",
            TimeUnit::H6 => "H6",
            TimeUnit::H8 => "H8",
            TimeUnit::D1 => "D1",
            TimeUnit::W1 => "W1",
            TimeUnit::Month1 => "M1",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `[from, to]` window for a candle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandleRange {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl CandleRange {
    /// Applies the range policy: a missing `to` becomes `from + 15 days`,
    /// an explicit `to` more than 15 days after `from` is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::Validation`] if the span exceeds the limit or
    /// the defaulted upper bound is not representable.
    pub fn new(from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Result<Self> {
        let max_span = TimeDelta::days(MAX_RANGE_DAYS);
        let to = match to {
            Some(to) if to - from > max_span => {
                return Err(FxcmError::Validation(RANGE_TOO_LONG.to_string()));
            }
            Some(to) => to,
            None => from.checked_add_signed(max_span).ok_or_else(|| {
                FxcmError::Validation(format!(
                    "{from} is too late for a {MAX_RANGE_DAYS} day range"
                ))
            })?,
        };

        Ok(Self { from, to })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    pub fn to(&self) -> DateTime<Utc> {
        self.to
    }

    /// Lower bound in whole seconds since the epoch.
    pub fn from_secs(&self) -> i64 {
        self.from.timestamp()
    }

    /// Upper bound in whole seconds since the epoch.
    pub fn to_secs(&self) -> i64 {
        self.to.timestamp()
    }
}

/// Payload of `GET candles/{offerId}/{timeUnit}/`.
#[derive(Debug, Clone, Deserialize)]
pub struct CandlesResponse {
    #[serde(default)]
    pub instrument_id: Option<u64>,
    #[serde(default)]
    pub period_id: Option<String>,
    /// Rows ordered `[time, bidOpen, bidClose, bidHigh, bidLow, askOpen,
    /// askClose, askHigh, askLow, volume]`. Trailing columns are ignored.
    #[serde(default)]
    pub candles: Vec<Vec<f64>>,
}

/// A single OHLC bar with separate bid and ask quotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candle {
    pub date: DateTime<Utc>,
    pub bid_open: f64,
    pub bid_close: f64,
    pub bid_high: f64,
    pub bid_low: f64,
    pub ask_open: f64,
    pub ask_close: f64,
    pub ask_high: f64,
    pub ask_low: f64,
    pub volume: f64,
}

impl TryFrom<&[f64]> for Candle {
    type Error = FxcmError;

    /// Decodes the first ten columns of a row positionally; field semantics
    /// are not checked.
    fn try_from(row: &[f64]) -> Result<Self> {
        if row.len() < CANDLE_COLUMNS {
            return Err(FxcmError::MalformedMessage(format!(
                "candle row has {} columns, expected {CANDLE_COLUMNS}",
                row.len()
            )));
        }

        let millis = (row[0] * 1000.0) as i64;
        let date = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            FxcmError::MalformedMessage(format!("candle timestamp {} out of range", row[0]))
        })?;

        Ok(Self {
            date,
            bid_open: row[1],
            bid_close: row[2],
            bid_high: row[3],
            bid_low: row[4],
            ask_open: row[5],
            ask_close: row[6],
            ask_high: row[7],
            ask_low: row[8],
            volume: row[9],
        })
    }
}
