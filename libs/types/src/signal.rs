//! Signal and recommendation types
//!
//! `SignalRow` carries the derived features for one point of a price
//! series; `Recommendation` is the verdict built from the most recent
//! complete row.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse market-state label derived from trend strength and volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[serde(rename = "Bull-Low-Vol")]
    BullLowVol,
    #[serde(rename = "Bull-High-Vol")]
    BullHighVol,
    #[serde(rename = "Bear")]
    Bear,
    #[serde(rename = "Sideways")]
    Sideways,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::BullLowVol => "Bull-Low-Vol",
            Regime::BullHighVol => "Bull-High-Vol",
            Regime::Bear => "Bear",
            Regime::Sideways => "Sideways",
        }
    }

    pub fn is_bull(&self) -> bool {
        matches!(self, Regime::BullLowVol | Regime::BullHighVol)
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trade direction suggested by the combined sub-signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Buy,
    Sell,
    NoTrade,
}

impl Action {
    /// BUY iff sum > 0, SELL iff sum < 0, NO_TRADE iff sum == 0.
    pub fn from_signal_sum(sum: i8) -> Self {
        match sum {
            s if s > 0 => Action::Buy,
            s if s < 0 => Action::Sell,
            _ => Action::NoTrade,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::NoTrade => "NO_TRADE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derived features for one point of a price series.
///
/// Rolling-window fields are `None` until their window is full.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub ma_short: Option<f64>,
    pub ma_long: Option<f64>,
    /// Simple period-over-period return.
    pub ret: Option<f64>,
    pub trend_strength: Option<f64>,
    pub volatility: Option<f64>,
    pub regime: Option<Regime>,
    pub rsi: Option<f64>,
    pub trend_signal: i8,
    pub rsi_signal: i8,
    pub breakout_signal: i8,
    pub signal_sum: i8,
    pub signal_count: u8,
}

impl SignalRow {
    /// Names accepted by [`SignalRow::feature`].
    pub const FEATURE_NAMES: [&'static str; 12] = [
        "close",
        "ma_short",
        "ma_long",
        "return",
        "trend_strength",
        "volatility",
        "rsi",
        "trend_signal",
        "rsi_signal",
        "breakout_signal",
        "signal_sum",
        "signal_count",
    ];

    /// Whether every rolling feature the recommendation depends on is defined.
    pub fn is_complete(&self) -> bool {
        self.close.is_finite()
            && self.ma_long.is_some()
            && self.ret.is_some()
            && self.trend_strength.is_some()
            && self.volatility.is_some()
            && self.rsi.is_some()
    }

    /// Look up a numeric feature by name. `None` for unknown names and for
    /// undefined rolling values.
    pub fn feature(&self, name: &str) -> Option<f64> {
        match name {
            "close" => Some(self.close),
            "ma_short" => self.ma_short,
            "ma_long" => self.ma_long,
            "return" => self.ret,
            "trend_strength" => self.trend_strength,
            "volatility" => self.volatility,
            "rsi" => self.rsi,
            "trend_signal" => Some(f64::from(self.trend_signal)),
            "rsi_signal" => Some(f64::from(self.rsi_signal)),
            "breakout_signal" => Some(f64::from(self.breakout_signal)),
            "signal_sum" => Some(f64::from(self.signal_sum)),
            "signal_count" => Some(f64::from(self.signal_count)),
            _ => None,
        }
    }
}

/// A complete trading verdict for one ticker.
///
/// Produced fresh per analysis and replaced as a whole, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    /// Agreement among the sub-signals, in [0, 1], two decimals.
    pub confidence: f64,
    pub regime: Regime,
    pub rsi: Option<f64>,
    pub price: f64,
    pub as_of: DateTime<Utc>,
    pub trend_signal: i8,
    pub rsi_signal: i8,
    pub breakout_signal: i8,
    pub signal_sum: i8,
    pub signal_count: u8,
    pub ml_probability: Option<f64>,
    pub ticker: String,
    pub period: String,
    pub interval: String,
}

impl Recommendation {
    /// Echo the request that produced this recommendation.
    pub fn for_request(
        mut self,
        ticker: impl Into<String>,
        period: impl Into<String>,
        interval: impl Into<String>,
    ) -> Self {
        self.ticker = ticker.into();
        self.period = period.into();
        self.interval = interval.into();
        self
    }
}
