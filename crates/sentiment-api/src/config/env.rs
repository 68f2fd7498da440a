//! Config loading from environment variables

use std::path::PathBuf;

use sentiment::ModelConfig;

use super::constants::{
  DEFAULT_BIND_ADDR, ENV_ADAPTER_DIR, ENV_BASE_MODEL, ENV_BIND_ADDR, ENV_MAX_LENGTH,
};
use crate::errors::ApiError;

/// API Server Configuration
#[derive(Debug, Clone)]
pub struct Config {
  /// Bind address (e.g. "127.0.0.1:5000")
  pub bind_addr: String,
  /// Model loading configuration
  pub model: ModelConfig,
}

impl Config {
  /// Loads configuration from environment variables
  ///
  /// Unset variables fall back to the defaults of the trained setup.
  ///
  /// # Errors
  /// Returns an error if environment variable values are invalid
  pub fn from_env() -> crate::errors::Result<Self> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Loads configuration through an arbitrary variable lookup
  ///
  /// # Errors
  /// Returns an error if a value is invalid
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> crate::errors::Result<Self> {
    let bind_addr = lookup(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

    let mut model = ModelConfig::default();
    if let Some(base_model) = lookup(ENV_BASE_MODEL) {
      model.base_model = base_model;
    }
    if let Some(adapter_dir) = lookup(ENV_ADAPTER_DIR) {
      model.adapter_dir = PathBuf::from(adapter_dir);
    }
    if let Some(max_length) = lookup(ENV_MAX_LENGTH) {
      model.max_length = parse_max_length(&max_length)?;
    }

    model.validate().map_err(|e| ApiError::config(e.to_string()))?;

    Ok(Self { bind_addr, model })
  }
}

/// Parses the tokenizer truncation length
///
/// # Errors
/// Returns an error unless the value is a positive integer
pub fn parse_max_length(value: &str) -> crate::errors::Result<usize> {
  match value.trim().parse::<usize>() {
    Ok(n) if n >= 1 => Ok(n),
    _ => Err(ApiError::config(format!(
      "{ENV_MAX_LENGTH} must be a positive integer: {value}"
    ))),
  }
}
