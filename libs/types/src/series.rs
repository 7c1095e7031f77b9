//! Price history types
//!
//! `PriceFrame` is what an upstream market-data source hands back: a row
//! index of timestamps plus any number of named price columns, any of which
//! may have holes. `PriceSeries` is the cleaned single-column view the
//! signal engine works on.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One close price at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

/// Ordered close prices for one ticker.
///
/// Invariant: strictly ascending by timestamp, no duplicates, finite prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series from points in any order.
    ///
    /// Non-finite prices are dropped. For a repeated timestamp the last
    /// occurrence wins.
    pub fn from_points(ticker: impl Into<String>, points: impl IntoIterator<Item = PricePoint>) -> Self {
        let mut by_time: BTreeMap<DateTime<Utc>, f64> = BTreeMap::new();
        for point in points {
            if point.close.is_finite() {
                by_time.insert(point.timestamp, point.close);
            }
        }

        Self {
            ticker: ticker.into(),
            points: by_time
                .into_iter()
                .map(|(timestamp, close)| PricePoint { timestamp, close })
                .collect(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Raw upstream response: shared timestamp index plus named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFrame {
    pub timestamps: Vec<DateTime<Utc>>,
    pub columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl PriceFrame {
    pub fn new(timestamps: Vec<DateTime<Utc>>) -> Self {
        Self {
            timestamps,
            columns: BTreeMap::new(),
        }
    }

    /// Attach a column. Columns shorter than the index read as missing.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        self.columns.insert(name.into(), values);
        self
    }

    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_series_is_sorted_and_deduplicated() {
        let series = PriceSeries::from_points(
            "TEST",
            vec![
                PricePoint { timestamp: day(3), close: 103.0 },
                PricePoint { timestamp: day(1), close: 101.0 },
                PricePoint { timestamp: day(2), close: 102.0 },
                PricePoint { timestamp: day(2), close: 102.5 },
            ],
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![101.0, 102.5, 103.0]);
        assert!(series
            .points()
            .windows(2)
            .all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_series_drops_non_finite() {
        let series = PriceSeries::from_points(
            "TEST",
            vec![
                PricePoint { timestamp: day(1), close: f64::NAN },
                PricePoint { timestamp: day(2), close: 10.0 },
                PricePoint { timestamp: day(3), close: f64::INFINITY },
            ],
        );
        assert_eq!(series.closes(), vec![10.0]);
        assert_eq!(series.last().unwrap().timestamp, day(2));
    }

    #[test]
    fn test_frame_columns() {
        let frame = PriceFrame::new(vec![day(1), day(2)])
            .with_column("close", vec![Some(1.0), None])
            .with_column("adjclose", vec![Some(0.9), Some(1.1)]);

        assert_eq!(frame.column_names(), vec!["adjclose", "close"]);
        assert_eq!(frame.column("close").unwrap()[1], None);
        assert!(frame.column("Close").is_none());
        assert!(!frame.is_empty());
    }

    proptest! {
        #[test]
        fn prop_series_sorted_unique_finite(
            raw in prop::collection::vec((1u32..=28, prop::num::f64::ANY), 0..60)
        ) {
            let series = PriceSeries::from_points(
                "P",
                raw.iter().map(|(d, close)| PricePoint { timestamp: day(*d), close: *close }),
            );
            prop_assert!(series.points().windows(2).all(|w| w[0].timestamp < w[1].timestamp));
            prop_assert!(series.points().iter().all(|p| p.close.is_finite()));
            prop_assert!(series.len() <= raw.len());
        }
    }
}
