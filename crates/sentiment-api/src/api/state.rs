//! API State Definition

use std::sync::Arc;

use crate::config::Config;
use crate::service::SentimentApiService;

/// Application State
///
/// State shared across the entire server.
/// Contains configuration and service.
#[derive(Clone)]
pub struct AppState {
  /// Configuration
  pub config: Config,
  /// Sentiment Analysis Service
  ///
  /// - Production: `Arc::new(SentimentApiServiceFull::new(&config)?)`
  /// - Test: `Arc::new(StubSentimentApiService)`
  pub service: Arc<dyn SentimentApiService>,
}

impl AppState {
  /// Creates a new AppState
  #[must_use]
  pub fn new(config: Config, service: Arc<dyn SentimentApiService>) -> Self {
    Self { config, service }
  }
}
