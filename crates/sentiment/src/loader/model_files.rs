//! Base Model File Resolution
//!
//! Resolves the three files the classifier is built from:
//! `config.json`, `model.safetensors` and `tokenizer.json`.
//! Files come either from a local directory or from the Hugging Face Hub.
//! Hub downloads are cached by `hf-hub`, so only the first start needs network access.

use std::fmt;
use std::path::{Path, PathBuf};

use hf_hub::api::sync::Api;
use hf_hub::{Repo, RepoType};
use tracing::debug;

use crate::errors::LoadError;

/// Model configuration file name
pub const CONFIG_FILE: &str = "config.json";

/// Model weight file name
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// Tokenizer file name
pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where the base model files are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseModelSource {
  /// Local directory
  Local(PathBuf),
  /// Hugging Face Hub repository id
  Hub(String),
}

impl BaseModelSource {
  /// Interprets a configured base model string.
  ///
  /// An existing directory is a local source, anything else is a Hub repository id.
  pub fn parse(value: &str) -> Self {
    let path = Path::new(value);
    if path.is_dir() {
      Self::Local(path.to_path_buf())
    } else {
      Self::Hub(value.to_string())
    }
  }

  /// Resolves the paths of the base model files
  ///
  /// # Errors
  /// - A file is missing from the local directory
  /// - The Hub download fails
  pub fn resolve(&self) -> Result<BaseModelFiles, LoadError> {
    match self {
      Self::Local(dir) => BaseModelFiles::from_dir(dir),
      Self::Hub(repo_id) => BaseModelFiles::from_hub(repo_id),
    }
  }
}

impl fmt::Display for BaseModelSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Local(dir) => write!(f, "{}", dir.display()),
      Self::Hub(repo_id) => write!(f, "hf://{repo_id}"),
    }
  }
}

/// Paths of the base model files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseModelFiles {
  /// `config.json`
  pub config: PathBuf,
  /// `model.safetensors`
  pub weights: PathBuf,
  /// `tokenizer.json`
  pub tokenizer: PathBuf,
}

impl BaseModelFiles {
  /// Collects the files from a local directory
  pub fn from_dir(dir: &Path) -> Result<Self, LoadError> {
    let existing = |name: &str| -> Result<PathBuf, LoadError> {
      let path = dir.join(name);
      if path.is_file() {
        Ok(path)
      } else {
        Err(LoadError::ArtifactNotFound(path))
      }
    };

    Ok(Self {
      config: existing(CONFIG_FILE)?,
      weights: existing(WEIGHTS_FILE)?,
      tokenizer: existing(TOKENIZER_FILE)?,
    })
  }

  /// Downloads (or reuses the cached copy of) the files from the Hugging Face Hub
  pub fn from_hub(repo_id: &str) -> Result<Self, LoadError> {
    let download_error = |file: &str, reason: String| LoadError::Download {
      repo: repo_id.to_string(),
      file: file.to_string(),
      reason,
    };

    let api = Api::new().map_err(|e| download_error("-", e.to_string()))?;
    let repo = api.repo(Repo::new(repo_id.to_string(), RepoType::Model));

    let fetch = |file: &str| -> Result<PathBuf, LoadError> {
      let path = repo.get(file).map_err(|e| download_error(file, e.to_string()))?;
      debug!(repo = repo_id, file, path = %path.display(), "Resolved model file");
      Ok(path)
    };

    Ok(Self {
      config: fetch(CONFIG_FILE)?,
      weights: fetch(WEIGHTS_FILE)?,
      tokenizer: fetch(TOKENIZER_FILE)?,
    })
  }
}
