//! Explanation collaborator
//!
//! Turns a recommendation into prose plus the knowledge-base sources it
//! drew on. Explanations are optional: a failing explainer never fails
//! the recommendation it was asked about.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::signal::Recommendation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
    #[serde(default)]
    pub kb_sources: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("explainer request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(&self, recommendation: &Recommendation) -> Result<Explanation, ExplainError>;
}

/// Posts the recommendation to `{base_url}/explain`.
pub struct HttpExplainer {
    client: Client,
    endpoint: String,
}

impl HttpExplainer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/explain", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl Explainer for HttpExplainer {
    async fn explain(&self, recommendation: &Recommendation) -> Result<Explanation, ExplainError> {
        let explanation = self
            .client
            .post(&self.endpoint)
            .json(recommendation)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(explanation)
    }
}
