use std::sync::Arc;

use anyhow::Context;
use persistence::CalibrationStore;
use signal_engine::{LogisticModel, ProbabilityEstimator, SignalEngine, YahooChartProvider};
use snapshot_feed::SnapshotIngestor;

use crate::config::GatewayConfig;
use crate::explain::{Explainer, HttpExplainer};

#[derive(Clone)]
pub struct AppState {
    pub ingestor: Arc<SnapshotIngestor>,
    pub calibration: Arc<CalibrationStore>,
    pub explainer: Option<Arc<dyn Explainer>>,
}

impl AppState {
    pub fn new(ingestor: SnapshotIngestor, calibration: CalibrationStore) -> Self {
        Self {
            ingestor: Arc::new(ingestor),
            calibration: Arc::new(calibration),
            explainer: None,
        }
    }

    pub fn with_explainer(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = Some(explainer);
        self
    }

    /// Wire up the production collaborators.
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let provider = YahooChartProvider::new(config.yahoo_config())
            .context("building market data client")?;

        let estimator = match &config.model_path {
            Some(path) => {
                let model = LogisticModel::from_path(path)
                    .with_context(|| format!("loading model from {}", path.display()))?;
                tracing::info!(path = %path.display(), "Probability model loaded");
                ProbabilityEstimator::model(model)
            }
            None => ProbabilityEstimator::Absent,
        };

        let engine = SignalEngine::new(Arc::new(provider)).with_estimator(estimator);
        let ingestor = SnapshotIngestor::new(engine, config.feed_config());
        let mut state = Self::new(ingestor, CalibrationStore::new(&config.calibration_path));

        if let Some(url) = &config.explainer_url {
            let explainer = HttpExplainer::new(url, config.market_data_timeout)
                .context("building explainer client")?;
            state = state.with_explainer(Arc::new(explainer));
        }

        Ok(state)
    }
}
