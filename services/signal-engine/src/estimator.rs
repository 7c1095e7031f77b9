//! Optional machine-learning probability hook
//!
//! A `ProbabilityEstimator` is either absent or wraps a model that maps a
//! named feature vector to the probability that the trade is profitable.
//! The shipped model is a plain logistic regression loaded from JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use types::signal::SignalRow;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimatorError {
    #[error("Feature {0} is undefined for this row")]
    MissingFeature(String),

    #[error("Unknown feature name: {0}")]
    UnknownFeature(String),

    #[error("Model has {features} features but {weights} weights")]
    ShapeMismatch { features: usize, weights: usize },

    #[error("Invalid model file: {0}")]
    InvalidModel(String),
}

/// Named numeric features of one signal row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector(BTreeMap<&'static str, f64>);

impl FeatureVector {
    /// Collect every defined feature of `row`.
    pub fn from_row(row: &SignalRow) -> Self {
        Self(
            SignalRow::FEATURE_NAMES
                .iter()
                .filter_map(|name| row.feature(name).map(|v| (*name, v)))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Maps features to a probability in [0, 1].
pub trait ProbabilityModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, EstimatorError>;
}

/// Probability capability attached to the signal engine.
#[derive(Clone, Default)]
pub enum ProbabilityEstimator {
    #[default]
    Absent,
    Model(Arc<dyn ProbabilityModel>),
}

impl ProbabilityEstimator {
    pub fn model(model: impl ProbabilityModel + 'static) -> Self {
        ProbabilityEstimator::Model(Arc::new(model))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ProbabilityEstimator::Absent)
    }

    /// Estimate for one row. A failing model yields `None` and a warning;
    /// the recommendation itself does not depend on it.
    pub fn estimate(&self, row: &SignalRow) -> Option<f64> {
        match self {
            ProbabilityEstimator::Absent => None,
            ProbabilityEstimator::Model(model) => {
                match model.predict(&FeatureVector::from_row(row)) {
                    Ok(p) if (0.0..=1.0).contains(&p) => Some(p),
                    Ok(p) => {
                        warn!(probability = p, "Estimator returned out-of-range probability");
                        None
                    }
                    Err(e) => {
                        warn!(error = %e, "Estimator failed");
                        None
                    }
                }
            }
        }
    }
}

impl fmt::Debug for ProbabilityEstimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbabilityEstimator::Absent => f.write_str("Absent"),
            ProbabilityEstimator::Model(_) => f.write_str("Model(..)"),
        }
    }
}

/// Logistic regression over named row features.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "LogisticFile")]
pub struct LogisticModel {
    features: Vec<String>,
    weights: Vec<f64>,
    intercept: f64,
}

#[derive(Deserialize)]
struct LogisticFile {
    features: Vec<String>,
    weights: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl TryFrom<LogisticFile> for LogisticModel {
    type Error = EstimatorError;

    fn try_from(file: LogisticFile) -> Result<Self, Self::Error> {
        LogisticModel::new(file.features, file.weights, file.intercept)
    }
}

impl LogisticModel {
    pub fn new(features: Vec<String>, weights: Vec<f64>, intercept: f64) -> Result<Self, EstimatorError> {
        if features.len() != weights.len() {
            return Err(EstimatorError::ShapeMismatch {
                features: features.len(),
                weights: weights.len(),
            });
        }
        if let Some(unknown) = features
            .iter()
            .find(|f| !SignalRow::FEATURE_NAMES.contains(&f.as_str()))
        {
            return Err(EstimatorError::UnknownFeature(unknown.clone()));
        }
        Ok(Self {
            features,
            weights,
            intercept,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, EstimatorError> {
        serde_json::from_str(json).map_err(|e| EstimatorError::InvalidModel(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, EstimatorError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| EstimatorError::InvalidModel(e.to_string()))?;
        Self::from_json(&json)
    }
}

impl ProbabilityModel for LogisticModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, EstimatorError> {
        let mut z = self.intercept;
        for (name, weight) in self.features.iter().zip(&self.weights) {
            let x = features
                .get(name)
                .ok_or_else(|| EstimatorError::MissingFeature(name.clone()))?;
            z += weight * x;
        }
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}
