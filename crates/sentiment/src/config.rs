// crates/sentiment/src/config.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;
use crate::loader::BaseModelSource;

/// Hugging Face repository of the base model the adapter was trained on.
pub const DEFAULT_BASE_MODEL: &str = "distilbert-base-uncased";

/// Directory holding `adapter_config.json` and `adapter_model.safetensors`.
pub const DEFAULT_ADAPTER_DIR: &str = "./my-sentiment-model";

/// Tokenizer truncation length (in tokens, special tokens included).
pub const DEFAULT_MAX_LENGTH: usize = 512;

/// Model loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelConfig {
  /// Base model: a Hugging Face repository id, or a local directory containing
  /// `config.json`, `model.safetensors` and `tokenizer.json`.
  #[serde(default = "default_base_model")]
  pub base_model: String,

  /// LoRA adapter directory.
  #[serde(default = "default_adapter_dir")]
  pub adapter_dir: PathBuf,

  /// Maximum sequence length; longer input is truncated, never rejected.
  #[serde(default = "default_max_length")]
  pub max_length: usize,
}

fn default_base_model() -> String {
  DEFAULT_BASE_MODEL.to_string()
}

fn default_adapter_dir() -> PathBuf {
  PathBuf::from(DEFAULT_ADAPTER_DIR)
}

fn default_max_length() -> usize {
  DEFAULT_MAX_LENGTH
}

impl Default for ModelConfig {
  fn default() -> Self {
    Self {
      base_model: default_base_model(),
      adapter_dir: default_adapter_dir(),
      max_length: default_max_length(),
    }
  }
}

// ===== Accessor Methods =====

impl ModelConfig {
  /// Returns where the base model files are read from.
  ///
  /// An existing directory wins over a repository id with the same name.
  pub fn base_model_source(&self) -> BaseModelSource {
    BaseModelSource::parse(&self.base_model)
  }

  /// Returns the adapter directory.
  pub fn adapter_dir(&self) -> &Path {
    &self.adapter_dir
  }

  /// Validates the configuration values.
  ///
  /// Whether `max_length` fits the model is only known after `config.json`
  /// is read, so that bound is checked at load time.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.base_model.trim().is_empty() {
      return Err(ConfigError::EmptyBaseModel);
    }

    if self.adapter_dir.as_os_str().is_empty() {
      return Err(ConfigError::EmptyAdapterDir);
    }

    if self.max_length < 1 {
      return Err(ConfigError::InvalidMaxLength {
        actual: self.max_length,
      });
    }

    Ok(())
  }
}
