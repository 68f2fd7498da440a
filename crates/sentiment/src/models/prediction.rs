//! Prediction Model Definition

use std::fmt;

use candle_core::{D, DType, Tensor};
use candle_nn::ops::softmax;
use serde::Serialize;

use crate::errors::InferenceError;

/// Sentiment label
///
/// The class order is fixed by how the adapter was trained:
/// index 0 is negative, index 1 is positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Sentiment {
  /// Class index 0
  Negative,
  /// Class index 1
  Positive,
}

impl Sentiment {
  /// Number of classes the classification head outputs
  pub const NUM_LABELS: usize = 2;

  /// Maps a class index to its label.
  ///
  /// Only index 1 is positive.
  #[must_use]
  pub fn from_class_index(index: usize) -> Self {
    if index == 1 {
      Self::Positive
    } else {
      Self::Negative
    }
  }

  /// Label as returned by the API
  #[must_use]
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Negative => "Negative",
      Self::Positive => "Positive",
    }
  }
}

impl fmt::Display for Sentiment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Result of classifying one text
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
  /// Predicted label (argmax of the logits)
  pub sentiment: Sentiment,
  /// Probability of the predicted label as a percentage, rounded to 2 decimals
  pub confidence: f64,
}

impl Prediction {
  /// Builds a prediction from the classifier output.
  ///
  /// `logits` must hold exactly two scores (shape `[2]` or `[1, 2]`).
  /// Ties resolve to the lower index.
  ///
  /// # Errors
  /// Returns an error if the logits do not have two elements.
  pub fn from_logits(logits: &Tensor) -> Result<Self, InferenceError> {
    let logits = logits.flatten_all()?.to_dtype(DType::F32)?;
    if logits.elem_count() != Sentiment::NUM_LABELS {
      return Err(InferenceError::UnexpectedLogits {
        shape: logits.dims().to_vec(),
      });
    }

    let class_index = logits.argmax(D::Minus1)?.to_scalar::<u32>()? as usize;

    let probs = softmax(&logits, D::Minus1)?.to_vec1::<f32>()?;
    let max_prob = probs.iter().copied().fold(0.0_f32, f32::max);

    Ok(Self {
      sentiment: Sentiment::from_class_index(class_index),
      confidence: round_percentage(max_prob),
    })
  }
}

/// Converts a probability to a percentage rounded to 2 decimals
#[must_use]
pub fn round_percentage(probability: f32) -> f64 {
  (f64::from(probability) * 100.0 * 100.0).round() / 100.0
}
