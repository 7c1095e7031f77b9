//! Yahoo Finance chart API provider
//!
//! `GET {base}/v8/finance/chart/{ticker}?range={period}&interval={interval}`
//! returns a timestamp index plus OHLCV and adjusted-close arrays. They are
//! mapped to the `close` and `adjclose` columns of a `PriceFrame`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, warn};
use types::errors::SignalError;
use types::series::PriceFrame;

use super::MarketDataProvider;

/// Connection settings for the chart API.
#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout: Duration::from_secs(5),
            user_agent: "Mozilla/5.0 (compatible; quantvision/0.1)".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Convert a decoded chart response into a frame.
fn chart_to_frame(ticker: &str, response: ChartResponse) -> Result<PriceFrame, SignalError> {
    if let Some(err) = response.chart.error {
        return Err(SignalError::data_unavailable(
            ticker,
            format!("{}: {}", err.code, err.description),
        ));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(PriceFrame::default());
    };

    // Rows whose epoch seconds are out of range are dropped from every column.
    let keep: Vec<Option<DateTime<chrono::Utc>>> = result
        .timestamp
        .iter()
        .map(|secs| DateTime::from_timestamp(*secs, 0))
        .collect();
    let pick = |values: Vec<Option<f64>>| -> Vec<Option<f64>> {
        keep.iter()
            .zip(values.into_iter().chain(std::iter::repeat(None)))
            .filter(|(ts, _)| ts.is_some())
            .map(|(_, v)| v)
            .collect()
    };

    let indicators = result.indicators;
    let close = indicators.quote.into_iter().next().map(|q| pick(q.close));
    let adjclose = indicators.adjclose.into_iter().next().map(|a| pick(a.adjclose));

    let mut frame = PriceFrame::new(keep.iter().flatten().copied().collect());
    if let Some(close) = close {
        frame = frame.with_column("close", close);
    }
    if let Some(adjclose) = adjclose {
        frame = frame.with_column("adjclose", adjclose);
    }
    Ok(frame)
}

/// HTTP provider for the Yahoo Finance chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    client: Client,
    config: YahooConfig,
}

impl YahooChartProvider {
    pub fn new(config: YahooConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    fn chart_url(&self, ticker: &str, period: &str, interval: &str) -> Option<Url> {
        let mut url = Url::parse(&self.config.base_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        url.query_pairs_mut()
            .append_pair("range", period)
            .append_pair("interval", interval);
        Some(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartProvider {
    async fn fetch_frame(
        &self,
        ticker: &str,
        period: &str,
        interval: &str,
    ) -> Result<PriceFrame, SignalError> {
        let url = self
            .chart_url(ticker, period, interval)
            .ok_or_else(|| SignalError::data_unavailable(ticker, "invalid market data base url"))?;

        debug!(ticker, period, interval, "Fetching chart");

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(ticker, error = %e, "Chart request failed");
            SignalError::data_unavailable(ticker, format!("request failed: {e}"))
        })?;

        let status = response.status();
        let body: ChartResponse = response.json().await.map_err(|e| {
            let detail = if status.is_success() {
                format!("undecodable chart response: {e}")
            } else {
                format!("upstream status {status}")
            };
            SignalError::data_unavailable(ticker, detail)
        })?;

        chart_to_frame(ticker, body)
    }
}
