//! Latest signal per ticker
//!
//! Owned, synchronised keyed store. Each ticker's value is replaced whole;
//! readers see either the old or the new recommendation.

use std::sync::Arc;

use dashmap::DashMap;
use types::signal::Recommendation;

#[derive(Debug, Default)]
pub struct LatestSignalState {
    signals: DashMap<String, Arc<Recommendation>>,
}

impl LatestSignalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the value for `ticker`, returning the previous one.
    pub fn replace(
        &self,
        ticker: impl Into<String>,
        recommendation: Arc<Recommendation>,
    ) -> Option<Arc<Recommendation>> {
        self.signals.insert(ticker.into(), recommendation)
    }

    pub fn get(&self, ticker: &str) -> Option<Arc<Recommendation>> {
        self.signals.get(ticker).map(|entry| entry.value().clone())
    }

    /// Every stored signal, sorted by ticker.
    pub fn all(&self) -> Vec<(String, Arc<Recommendation>)> {
        let mut all: Vec<_> = self
            .signals
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
