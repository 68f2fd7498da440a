//! Truncating text tokenizer
//!
//! Wraps a Hugging Face `tokenizers::Tokenizer` configured for single-text inference:
//! truncation to `max_length` tokens (special tokens included) and no padding,
//! since exactly one sequence is encoded per request.

use std::path::Path;

use tokenizers::{PostProcessor, Tokenizer, TruncationParams};
use tracing::debug;

use crate::errors::TokenizerError;

/// Tokenizer for classifier input
#[derive(Clone)]
pub struct TextTokenizer {
  inner: Tokenizer,
  max_length: usize,
}

impl TextTokenizer {
  /// Loads `tokenizer.json` and applies the truncation settings
  ///
  /// # Errors
  /// Returns an error if the file cannot be read or parsed
  pub fn from_file(path: &Path, max_length: usize) -> Result<Self, TokenizerError> {
    let inner = Tokenizer::from_file(path).map_err(|e| TokenizerError::Load {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;

    Self::from_tokenizer(inner, max_length)
  }

  /// Wraps an already constructed tokenizer
  ///
  /// Padding and truncation stored in the tokenizer file are replaced.
  ///
  /// # Errors
  /// Returns an error if `max_length` leaves no room for text after the special tokens
  pub fn from_tokenizer(mut inner: Tokenizer, max_length: usize) -> Result<Self, TokenizerError> {
    let special_tokens = inner.get_post_processor().map_or(0, |p| p.added_tokens(false));
    if max_length <= special_tokens {
      return Err(TokenizerError::Configure(format!(
        "max_length {max_length} must exceed the {special_tokens} special tokens added per sequence"
      )));
    }

    inner.with_padding(None);
    inner
      .with_truncation(Some(TruncationParams {
        max_length,
        ..Default::default()
      }))
      .map_err(|e| TokenizerError::Configure(e.to_string()))?;

    Ok(Self { inner, max_length })
  }

  /// Maximum number of tokens produced by [`Self::encode`]
  #[must_use]
  pub fn max_length(&self) -> usize {
    self.max_length
  }

  /// Encodes the text into token ids, adding special tokens
  ///
  /// Text longer than `max_length` tokens is truncated.
  pub fn encode(&self, text: &str) -> Result<Vec<u32>, TokenizerError> {
    let encoding = self.inner.encode(text, true).map_err(|e| TokenizerError::Encode {
      reason: e.to_string(),
    })?;

    let ids = encoding.get_ids().to_vec();
    debug!(
      text_len = text.len(),
      token_count = ids.len(),
      truncated = !encoding.get_overflowing().is_empty(),
      "Tokenized input"
    );

    Ok(ids)
  }
}
