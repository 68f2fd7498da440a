//! Response Model Definition

use serde::Serialize;

use sentiment::{Prediction, Sentiment};

/// Sentiment Analysis Response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
  /// "Positive" or "Negative"
  pub sentiment: Sentiment,
  /// Confidence of the label as a percentage in [0, 100], 2 decimals
  pub confidence: f64,
}

impl From<Prediction> for AnalyzeResponse {
  fn from(prediction: Prediction) -> Self {
    Self {
      sentiment: prediction.sentiment,
      confidence: prediction.confidence,
    }
  }
}

/// Health Check Response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
  /// Always "ok"
  pub status: &'static str,
}

impl HealthResponse {
  /// Liveness response, independent of model state
  #[must_use]
  pub fn ok() -> Self {
    Self { status: "ok" }
  }
}
