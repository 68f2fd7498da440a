//! DistilBERT sequence classifier
//!
//! Encoder from `candle_transformers` plus the sequence classification head:
//! the hidden state of the first (`[CLS]`) token goes through
//! `pre_classifier` → ReLU → `classifier`.
//! Dropout is an identity at inference time and is therefore absent.

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder, linear};
use candle_transformers::models::distilbert::{Config as DistilBertConfig, DistilBertModel};
use serde::Deserialize;

use crate::models::Sentiment;

/// Prefix of the encoder tensors in the checkpoint
pub const ENCODER_PREFIX: &str = "distilbert";

/// Tensor prefix of the hidden projection of the head
pub const PRE_CLASSIFIER_PREFIX: &str = "pre_classifier";

/// Tensor prefix of the output projection of the head
pub const CLASSIFIER_PREFIX: &str = "classifier";

/// Sizes the head needs, read from the same `config.json` as the encoder config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClassifierDims {
  /// Hidden size
  pub dim: usize,
  /// Longest sequence the position embeddings cover
  pub max_position_embeddings: usize,
}

/// DistilBERT encoder with a two-label classification head
pub struct DistilBertClassifier {
  encoder: DistilBertModel,
  pre_classifier: Linear,
  classifier: Linear,
  device: Device,
}

impl DistilBertClassifier {
  /// Builds the classifier from checkpoint tensors
  ///
  /// # Errors
  /// Returns an error if a tensor is missing or has an unexpected shape
  pub fn load(
    vb: VarBuilder,
    config: &DistilBertConfig,
    dims: &ClassifierDims,
  ) -> candle_core::Result<Self> {
    let device = vb.device().clone();
    let encoder = DistilBertModel::load(vb.pp(ENCODER_PREFIX), config)?;
    let pre_classifier = linear(dims.dim, dims.dim, vb.pp(PRE_CLASSIFIER_PREFIX))?;
    let classifier = linear(dims.dim, Sentiment::NUM_LABELS, vb.pp(CLASSIFIER_PREFIX))?;

    Ok(Self {
      encoder,
      pre_classifier,
      classifier,
      device,
    })
  }

  /// Device the weights live on
  pub fn device(&self) -> &Device {
    &self.device
  }

  /// Runs one forward pass over a single token sequence
  ///
  /// Returns logits of shape `[1, NUM_LABELS]`.
  pub fn forward(&self, input_ids: &[u32]) -> candle_core::Result<Tensor> {
    let seq_len = input_ids.len();
    let input_ids = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;

    // Nonzero entries are masked out; a single unpadded sequence attends everywhere.
    let attention_mask = Tensor::zeros((seq_len, seq_len), DType::U8, &self.device)?;

    let hidden = self.encoder.forward(&input_ids, &attention_mask)?;
    let pooled = hidden.i((.., 0))?;
    let pooled = self.pre_classifier.forward(&pooled)?.relu()?;
    self.classifier.forward(&pooled)
  }
}
