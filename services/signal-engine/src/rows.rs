//! Per-point feature derivation
//!
//! Turns a `PriceSeries` into one `SignalRow` per point: moving averages,
//! trend strength, return volatility, regime, RSI and the three directional
//! sub-signals (trend, RSI, breakout) with their vote totals.

use types::series::PriceSeries;
use types::signal::{Regime, SignalRow};

use crate::indicators;

/// Window lengths and thresholds for signal derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    pub volatility_window: usize,
    pub rsi_window: usize,
    pub breakout_window: usize,
    /// |trend_strength| above this is a trend.
    pub trend_threshold: f64,
    /// Volatility at or above this is "high".
    pub volatility_threshold: f64,
    pub rsi_bull: f64,
    pub rsi_bear: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            ma_short_window: 20,
            ma_long_window: 50,
            volatility_window: 14,
            rsi_window: 14,
            breakout_window: 20,
            trend_threshold: 0.01,
            volatility_threshold: 0.02,
            rsi_bull: 55.0,
            rsi_bear: 45.0,
        }
    }
}

impl SignalParams {
    /// Minimum number of points before the first row can be complete.
    pub fn warmup(&self) -> usize {
        self.ma_long_window
            .max(self.volatility_window + 1)
            .max(self.rsi_window + 1)
    }

    /// First matching rule wins.
    pub fn classify(&self, trend_strength: f64, volatility: f64) -> Regime {
        if trend_strength > self.trend_threshold && volatility < self.volatility_threshold {
            Regime::BullLowVol
        } else if trend_strength > self.trend_threshold {
            Regime::BullHighVol
        } else if trend_strength < -self.trend_threshold {
            Regime::Bear
        } else {
            Regime::Sideways
        }
    }

    fn rsi_vote(&self, regime: Option<Regime>, rsi: Option<f64>) -> i8 {
        match (regime, rsi) {
            (Some(r), Some(v)) if r.is_bull() && v > self.rsi_bull => 1,
            (Some(Regime::Bear), Some(v)) if v < self.rsi_bear => -1,
            _ => 0,
        }
    }
}

/// Derive one `SignalRow` per point of `series`.
pub fn compute_signal_rows(series: &PriceSeries, params: &SignalParams) -> Vec<SignalRow> {
    let closes = series.closes();
    let prices: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();

    let ma_short = indicators::rolling_mean(&prices, params.ma_short_window);
    let ma_long = indicators::rolling_mean(&prices, params.ma_long_window);
    let returns = indicators::pct_change(&closes);
    let volatility = indicators::rolling_std(&returns, params.volatility_window);
    let rsi = indicators::simple_rsi(&closes, params.rsi_window);
    let recent_high = indicators::shift(
        &indicators::rolling_max(&prices, params.breakout_window),
        1,
    );
    let recent_low = indicators::shift(
        &indicators::rolling_min(&prices, params.breakout_window),
        1,
    );

    series
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let price = point.close;

            let trend_signal = match (ma_short[i], ma_long[i]) {
                (Some(s), Some(l)) if s > l => 1,
                _ => 0,
            };

            let trend_strength = ma_long[i]
                .map(|l| (price - l) / l)
                .filter(|v| v.is_finite());

            let regime = match (trend_strength, volatility[i]) {
                (Some(ts), Some(vol)) => Some(params.classify(ts, vol)),
                _ => None,
            };

            let rsi_signal = params.rsi_vote(regime, rsi[i]);

            let breakout_signal = match (recent_high[i], recent_low[i]) {
                (Some(high), _) if price > high => 1,
                (_, Some(low)) if price < low => -1,
                _ => 0,
            };

            let votes = [trend_signal, rsi_signal, breakout_signal];

            SignalRow {
                timestamp: point.timestamp,
                close: price,
                ma_short: ma_short[i],
                ma_long: ma_long[i],
                ret: returns[i],
                trend_strength,
                volatility: volatility[i],
                regime,
                rsi: rsi[i],
                trend_signal,
                rsi_signal,
                breakout_signal,
                signal_sum: votes.iter().sum(),
                signal_count: votes.iter().filter(|v| **v != 0).count() as u8,
            }
        })
        .collect()
}
