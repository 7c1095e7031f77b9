//! Market snapshot types
//!
//! A snapshot is one timestamped observation of market/account state
//! produced by the capture pipeline. Only the timestamp is mandatory.
//!
//! The wire form (`SnapshotPayload`) keeps the timestamp as an optional
//! string so that a missing or unparsable value is reported as a
//! `SnapshotError` instead of a generic decode failure.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::errors::SnapshotError;

/// Open set of additional numeric indicators read off the screen
/// (e.g. `"rsi_14": 61.2`). Keys are free-form; values are always numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtraIndicators(BTreeMap<String, f64>);

impl ExtraIndicators {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert, used while a snapshot is being assembled.
    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for ExtraIndicators {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Snapshot as received over the network, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub last_price: Option<f64>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub position_size: Option<f64>,
    #[serde(default)]
    pub extra: Option<ExtraIndicators>,
}

/// A validated, immutable market snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotPayload")]
pub struct MarketSnapshot {
    source: String,
    symbol: Option<String>,
    timeframe: Option<String>,
    timestamp: DateTime<FixedOffset>,
    last_price: Option<f64>,
    pnl: Option<f64>,
    position_size: Option<f64>,
    extra: ExtraIndicators,
}

impl MarketSnapshot {
    /// Start a snapshot with the two fields every observation carries.
    pub fn new(source: impl Into<String>, timestamp: DateTime<FixedOffset>) -> Self {
        Self {
            source: source.into(),
            symbol: None,
            timeframe: None,
            timestamp,
            last_price: None,
            pnl: None,
            position_size: None,
            extra: ExtraIndicators::new(),
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_timeframe(mut self, timeframe: impl Into<String>) -> Self {
        self.timeframe = Some(timeframe.into());
        self
    }

    pub fn with_last_price(mut self, price: f64) -> Self {
        self.last_price = Some(price);
        self
    }

    pub fn with_pnl(mut self, pnl: f64) -> Self {
        self.pnl = Some(pnl);
        self
    }

    pub fn with_position_size(mut self, size: f64) -> Self {
        self.position_size = Some(size);
        self
    }

    pub fn with_extra(mut self, extra: ExtraIndicators) -> Self {
        self.extra = extra;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Symbol to analyse: trimmed and non-empty.
    pub fn analysis_symbol(&self) -> Option<&str> {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn timeframe(&self) -> Option<&str> {
        self.timeframe.as_deref()
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    pub fn pnl(&self) -> Option<f64> {
        self.pnl
    }

    pub fn position_size(&self) -> Option<f64> {
        self.position_size
    }

    pub fn extra(&self) -> &ExtraIndicators {
        &self.extra
    }
}

/// Parse a timezone-aware RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, SnapshotError> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|_| SnapshotError::InvalidTimestamp {
        value: value.to_string(),
    })
}

impl TryFrom<SnapshotPayload> for MarketSnapshot {
    type Error = SnapshotError;

    fn try_from(payload: SnapshotPayload) -> Result<Self, Self::Error> {
        let raw = payload.timestamp.ok_or(SnapshotError::MissingTimestamp)?;
        let timestamp = parse_timestamp(&raw)?;

        Ok(Self {
            source: payload.source,
            symbol: payload.symbol,
            timeframe: payload.timeframe,
            timestamp,
            last_price: payload.last_price,
            pnl: payload.pnl,
            position_size: payload.position_size,
            extra: payload.extra.unwrap_or_default(),
        })
    }
}
