//! Signal Engine
//!
//! Deterministic, rule-based market analysis:
//! - Price loading through a pluggable `MarketDataProvider`
//! - Rolling indicators (moving averages, volatility, simple-mean RSI)
//! - Regime classification and three directional sub-signals
//! - BUY / SELL / NO_TRADE recommendation with vote-agreement confidence
//! - Optional probability estimate from a `ProbabilityEstimator`
//!
//! # Pipeline
//!
//! ```text
//! provider.fetch_frame ──► series_from_frame ──► compute_signal_rows
//!                                                        │
//!                                   last complete row ◄──┘
//!                                           │
//!                                  make_recommendation
//! ```

pub mod engine;
pub mod estimator;
pub mod indicators;
pub mod provider;
pub mod recommend;
pub mod rows;

pub use engine::SignalEngine;
pub use estimator::{EstimatorError, LogisticModel, ProbabilityEstimator, ProbabilityModel};
pub use provider::{MarketDataProvider, StaticProvider, YahooChartProvider, YahooConfig};
pub use rows::SignalParams;

/// Default history window requested from the provider.
pub const DEFAULT_PERIOD: &str = "2y";
/// Default bar interval requested from the provider.
pub const DEFAULT_INTERVAL: &str = "1d";
