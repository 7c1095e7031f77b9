//! Market-data providers
//!
//! A provider returns a raw `PriceFrame` for (ticker, period, interval).
//! Picking the price column and cleaning the series happens here, so every
//! provider gets the same "no usable price field" behaviour.

mod yahoo;

pub use yahoo::{YahooChartProvider, YahooConfig};

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use types::errors::SignalError;
use types::series::{PriceFrame, PricePoint, PriceSeries};

/// Price columns in order of preference.
pub const PRICE_COLUMNS: [&str; 6] = ["Close", "Adj Close", "close", "adjclose", "Price", "price"];

/// Source of historical prices.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the raw frame for `ticker`. An upstream that has nothing for
    /// the request may return an empty frame or `DataUnavailable`.
    async fn fetch_frame(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<PriceFrame, SignalError>;
}

/// First preferred price column present in `frame`.
pub fn select_price_column(frame: &PriceFrame) -> Option<(&'static str, &[Option<f64>])> {
    PRICE_COLUMNS
        .iter()
        .find_map(|name| frame.column(name).map(|col| (*name, col)))
}

/// Reduce a frame to a clean close-price series.
pub fn series_from_frame(ticker: &str, frame: &PriceFrame) -> Result<PriceSeries, SignalError> {
    if frame.is_empty() {
        return Err(SignalError::data_unavailable(ticker, "no data returned"));
    }

    let (_, column) = select_price_column(frame).ok_or_else(|| {
        SignalError::data_unavailable(
            ticker,
            format!("no price column found, got {:?}", frame.column_names()),
        )
    })?;

    let series = PriceSeries::from_points(
        ticker,
        frame
            .timestamps
            .iter()
            .zip(column.iter())
            .filter_map(|(ts, close)| close.map(|close| PricePoint { timestamp: *ts, close })),
    );

    if series.is_empty() {
        return Err(SignalError::data_unavailable(ticker, "price column has no values"));
    }
    Ok(series)
}

/// In-memory provider keyed by ticker. Period and interval are ignored.
#[derive(Debug, Default)]
pub struct StaticProvider {
    frames: RwLock<HashMap<String, PriceFrame>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(self, ticker: impl Into<String>, frame: PriceFrame) -> Self {
        self.insert(ticker, frame);
        self
    }

    /// Add or replace the frame served for `ticker`.
    pub fn insert(&self, ticker: impl Into<String>, frame: PriceFrame) {
        self.frames
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(ticker.into(), frame);
    }
}

#[async_trait]
impl MarketDataProvider for StaticProvider {
    async fn fetch_frame(
        &self,
        ticker: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<PriceFrame, SignalError> {
        let frames = self
            .frames
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(frames.get(ticker).cloned().unwrap_or_default())
    }
}
