//! Signal engine
//!
//! Fetches prices through a `MarketDataProvider`, derives signal rows and
//! turns the most recent complete row into a `Recommendation`.

use std::sync::Arc;

use tracing::{debug, info};
use types::errors::SignalError;
use types::series::PriceSeries;
use types::signal::{Recommendation, SignalRow};

use crate::estimator::ProbabilityEstimator;
use crate::provider::{series_from_frame, MarketDataProvider};
use crate::recommend;
use crate::rows::{self, SignalParams};

/// Rule-based recommendation engine.
///
/// Stateless between calls: every `recommend` fetches fresh prices.
#[derive(Clone)]
pub struct SignalEngine {
    provider: Arc<dyn MarketDataProvider>,
    estimator: ProbabilityEstimator,
    params: SignalParams,
}

impl SignalEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            provider,
            estimator: ProbabilityEstimator::Absent,
            params: SignalParams::default(),
        }
    }

    pub fn with_params(mut self, params: SignalParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_estimator(mut self, estimator: ProbabilityEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn params(&self) -> &SignalParams {
        &self.params
    }

    pub fn estimator(&self) -> &ProbabilityEstimator {
        &self.estimator
    }

    /// Fetch and clean the close-price series for `ticker`.
    pub async fn load_price_series(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<PriceSeries, SignalError> {
        let frame = self.provider.fetch_frame(ticker, period, interval).await?;
        let series = series_from_frame(ticker, &frame)?;
        debug!(ticker, points = series.len(), "Loaded price series");
        Ok(series)
    }

    pub fn compute_signal_rows(&self, series: &PriceSeries) -> Vec<SignalRow> {
        rows::compute_signal_rows(series, &self.params)
    }

    pub fn make_recommendation(&self, row: &SignalRow) -> Recommendation {
        recommend::make_recommendation(row, &self.estimator)
    }

    /// Full pipeline for one ticker.
    pub async fn recommend(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<Recommendation, SignalError> {
        let series = self.load_price_series(ticker, period, interval).await?;
        let rows = self.compute_signal_rows(&series);

        let row = rows
            .iter()
            .rev()
            .find(|r| r.is_complete())
            .ok_or_else(|| SignalError::InsufficientData {
                ticker: ticker.to_string(),
                points: series.len(),
            })?;

        let rec = self
            .make_recommendation(row)
            .for_request(ticker, period, interval);

        info!(
            ticker,
            action = rec.action.as_str(),
            confidence = rec.confidence,
            regime = rec.regime.as_str(),
            "Recommendation computed"
        );
        Ok(rec)
    }
}

impl std::fmt::Debug for SignalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalEngine")
            .field("estimator", &self.estimator)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use chrono::{Duration, TimeZone, Utc};
    use types::series::PriceFrame;

    fn frame(closes: &[f64]) -> PriceFrame {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PriceFrame::new(
            (0..closes.len())
                .map(|i| start + Duration::days(i as i64))
                .collect(),
        )
        .with_column("Close", closes.iter().copied().map(Some).collect())
    }

    #[tokio::test]
    async fn test_load_price_series() {
        let provider = StaticProvider::new().with_frame("AAA", frame(&[1.0, 2.0, 3.0]));
        let engine = SignalEngine::new(Arc::new(provider));
        let series = engine.load_price_series("AAA", "1y", "1d").await.unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.ticker(), "AAA");
    }

    #[tokio::test]
    async fn test_recommend_echoes_request() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let provider = StaticProvider::new().with_frame("AAA", frame(&closes));
        let engine = SignalEngine::new(Arc::new(provider));

        let rec = engine.recommend("AAA", "6mo", "1d").await.unwrap();
        assert_eq!(rec.ticker, "AAA");
        assert_eq!(rec.period, "6mo");
        assert_eq!(rec.interval, "1d");
        assert_eq!(rec.price, 159.0);
    }

    #[tokio::test]
    async fn test_custom_params_shorten_warmup() {
        let params = SignalParams {
            ma_short_window: 3,
            ma_long_window: 5,
            volatility_window: 3,
            rsi_window: 3,
            breakout_window: 3,
            ..SignalParams::default()
        };
        let closes: Vec<f64> = (0..8).map(|i| 10.0 + i as f64).collect();
        let provider = StaticProvider::new().with_frame("AAA", frame(&closes));
        let engine = SignalEngine::new(Arc::new(provider)).with_params(params);

        assert!(engine.recommend("AAA", "1mo", "1d").await.is_ok());
    }
}
