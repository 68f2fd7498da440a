//! Sentiment Analysis Service

use std::time::Instant;

use sentiment::SentimentModel;
use tracing::info;

use crate::config::Config;
use crate::errors::Result;
use crate::models::{AnalyzeRequest, AnalyzeResponse};

/// Common interface for sentiment analysis service
///
/// This trait allows swapping production implementation (`SentimentApiServiceFull`) with
/// test stubs/mocks.
pub trait SentimentApiService: Send + Sync {
  /// Classifies the request text
  ///
  /// # Errors
  /// - Tokenization or inference error
  fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse>;
}

/// Sentiment Analysis Service
///
/// Holds the loaded model. The model is immutable after load,
/// so one instance serves all requests without locking.
pub struct SentimentApiServiceFull {
  /// Base model + LoRA adapter classifier
  model: SentimentModel,
}

impl SentimentApiServiceFull {
  /// Initializes the service
  ///
  /// # Arguments
  /// * `config` - Configuration (including model and adapter locations)
  ///
  /// # Errors
  /// Returns an error if the model or adapter cannot be loaded
  pub fn new(config: &Config) -> Result<Self> {
    let model = SentimentModel::load(&config.model)?;
    Ok(Self { model })
  }

  /// Executes sentiment analysis
  ///
  /// # Arguments
  /// * `request` - Analysis request (empty text is classified like any other)
  ///
  /// # Errors
  /// - Tokenization or inference failure
  pub fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
    // Start measuring processing time
    let start = Instant::now();

    let prediction = self.model.predict(&request.text)?;

    info!(
      sentiment = %prediction.sentiment,
      confidence = prediction.confidence,
      elapsed_ms = start.elapsed().as_millis() as u64,
      "Sentiment analysis finished"
    );

    Ok(prediction.into())
  }
}

/// Production implementation of trait `SentimentApiService`
impl SentimentApiService for SentimentApiServiceFull {
  fn analyze(&self, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
    // Note: Writing `self.analyze(...)` would recursively call the trait method,
    // so explicitly call the inherent method.
    SentimentApiServiceFull::analyze(self, request)
  }
}
