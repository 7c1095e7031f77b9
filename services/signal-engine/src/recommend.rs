//! Row → recommendation
//!
//! The action follows the sign of the vote total; confidence is the share
//! of non-zero votes that agree with it.

use types::signal::{Action, Recommendation, Regime, SignalRow};

use crate::estimator::ProbabilityEstimator;

/// |signal_sum| / signal_count, or 0 with no votes, rounded to 2 decimals.
///
/// Always in [0, 1]: the sum of `count` non-zero unit votes cannot exceed
/// `count` in magnitude.
pub fn confidence(signal_sum: i8, signal_count: u8) -> f64 {
    if signal_count == 0 {
        return 0.0;
    }
    let raw = f64::from(signal_sum.unsigned_abs()) / f64::from(signal_count);
    (raw.clamp(0.0, 1.0) * 100.0).round() / 100.0
}

/// Build the recommendation for one row. The request echo (ticker, period,
/// interval) is left empty for the caller to fill in.
pub fn make_recommendation(row: &SignalRow, estimator: &ProbabilityEstimator) -> Recommendation {
    Recommendation {
        action: Action::from_signal_sum(row.signal_sum),
        confidence: confidence(row.signal_sum, row.signal_count),
        regime: row.regime.unwrap_or(Regime::Sideways),
        rsi: row.rsi,
        price: row.close,
        as_of: row.timestamp,
        trend_signal: row.trend_signal,
        rsi_signal: row.rsi_signal,
        breakout_signal: row.breakout_signal,
        signal_sum: row.signal_sum,
        signal_count: row.signal_count,
        ml_probability: estimator.estimate(row),
        ticker: String::new(),
        period: String::new(),
        interval: String::new(),
    }
}
