//! crates/sentiment/tests/offline_model_tests.rs
//!
//! `SentimentModel::load` + `predict` against a tiny DistilBERT (dim 8, one layer)
//! and a PEFT-named adapter written into temp dirs, so the full flow runs without a download:
//! Resolve local files -> Merge adapter -> Build head -> Tokenize -> Forward -> Label.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use tempfile::TempDir;

use sentiment::errors::{AdapterError, LoadError};
use sentiment::{ModelConfig, Sentiment, SentimentError, SentimentModel};

const DIM: usize = 8;
const HIDDEN_DIM: usize = 16;
const VOCAB_SIZE: usize = 8;
const MAX_POSITIONS: usize = 16;
const LORA_RANK: usize = 2;

const CONFIG_JSON: &str = r#"{
  "activation": "gelu",
  "dim": 8,
  "hidden_dim": 16,
  "initializer_range": 0.02,
  "max_position_embeddings": 16,
  "model_type": "distilbert",
  "n_heads": 2,
  "n_layers": 1,
  "pad_token_id": 0,
  "vocab_size": 8
}"#;

const TOKENIZER_JSON: &str = r#"{
  "version": "1.0",
  "truncation": null,
  "padding": null,
  "added_tokens": [],
  "normalizer": null,
  "pre_tokenizer": { "type": "Whitespace" },
  "post_processor": {
    "type": "BertProcessing",
    "sep": ["[SEP]", 3],
    "cls": ["[CLS]", 2]
  },
  "decoder": null,
  "model": {
    "type": "WordLevel",
    "vocab": { "[PAD]": 0, "[UNK]": 1, "[CLS]": 2, "[SEP]": 3, "good": 4, "bad": 5, "movie": 6, "the": 7 },
    "unk_token": "[UNK]"
  }
}"#;

const ADAPTER_CONFIG: &str = r#"{
  "base_model_name_or_path": "distilbert-base-uncased",
  "fan_in_fan_out": false,
  "lora_alpha": 4,
  "modules_to_save": ["classifier", "pre_classifier"],
  "peft_type": "LORA",
  "r": 2,
  "target_modules": ["q_lin", "v_lin"],
  "task_type": "SEQ_CLS"
}"#;

/// Classification head stored in the adapter
enum Head {
  /// Pseudo-random weights, so the logits depend on the input
  Trained,
  /// Zero output weights, so the logits equal this bias for every input
  FixedLogits([f32; 2]),
  /// No head tensors at all
  Absent,
}

/// Deterministic non-trivial values in [-0.5, 0.5]
fn filled(shape: &[usize], seed: f32) -> Tensor {
  let len = shape.iter().product::<usize>();
  let values: Vec<f32> = (0..len).map(|i| ((i as f32) * 0.37 + seed).sin() * 0.5).collect();
  Tensor::from_vec(values, shape, &Device::Cpu).unwrap()
}

fn ones(len: usize) -> Tensor {
  Tensor::ones(len, DType::F32, &Device::Cpu).unwrap()
}

fn zeros(shape: &[usize]) -> Tensor {
  Tensor::zeros(shape, DType::F32, &Device::Cpu).unwrap()
}

/// Writes config.json, model.safetensors (encoder only, like an MLM checkpoint) and tokenizer.json
fn write_base_model(dir: &Path) {
  std::fs::write(dir.join("config.json"), CONFIG_JSON).unwrap();
  std::fs::write(dir.join("tokenizer.json"), TOKENIZER_JSON).unwrap();

  let mut tensors: HashMap<String, Tensor> = HashMap::new();
  let mut put = |name: &str, tensor: Tensor| {
    tensors.insert(format!("distilbert.{name}"), tensor);
  };

  put("embeddings.word_embeddings.weight", filled(&[VOCAB_SIZE, DIM], 0.1));
  put("embeddings.position_embeddings.weight", filled(&[MAX_POSITIONS, DIM], 0.2));
  put("embeddings.LayerNorm.weight", ones(DIM));
  put("embeddings.LayerNorm.bias", zeros(&[DIM]));

  let layer = "transformer.layer.0";
  for (i, lin) in ["q_lin", "k_lin", "v_lin", "out_lin"].iter().enumerate() {
    put(&format!("{layer}.attention.{lin}.weight"), filled(&[DIM, DIM], 1.0 + i as f32));
    put(&format!("{layer}.attention.{lin}.bias"), zeros(&[DIM]));
  }
  put(&format!("{layer}.sa_layer_norm.weight"), ones(DIM));
  put(&format!("{layer}.sa_layer_norm.bias"), zeros(&[DIM]));
  put(&format!("{layer}.ffn.lin1.weight"), filled(&[HIDDEN_DIM, DIM], 5.0));
  put(&format!("{layer}.ffn.lin1.bias"), zeros(&[HIDDEN_DIM]));
  put(&format!("{layer}.ffn.lin2.weight"), filled(&[DIM, HIDDEN_DIM], 6.0));
  put(&format!("{layer}.ffn.lin2.bias"), zeros(&[DIM]));
  put(&format!("{layer}.output_layer_norm.weight"), ones(DIM));
  put(&format!("{layer}.output_layer_norm.bias"), zeros(&[DIM]));

  candle_core::safetensors::save(&tensors, dir.join("model.safetensors")).unwrap();
}

/// Writes adapter_config.json and adapter_model.safetensors with PEFT tensor names
fn write_adapter(dir: &Path, head: Head) {
  std::fs::write(dir.join("adapter_config.json"), ADAPTER_CONFIG).unwrap();

  let mut tensors: HashMap<String, Tensor> = HashMap::new();
  for (i, lin) in ["q_lin", "v_lin"].iter().enumerate() {
    let module = format!("base_model.model.distilbert.transformer.layer.0.attention.{lin}");
    tensors.insert(
      format!("{module}.lora_A.weight"),
      filled(&[LORA_RANK, DIM], 7.0 + i as f32),
    );
    tensors.insert(
      format!("{module}.lora_B.weight"),
      filled(&[DIM, LORA_RANK], 9.0 + i as f32),
    );
  }

  let mut put_head = |module: &str, weight: Tensor, bias: Tensor| {
    tensors.insert(format!("base_model.model.{module}.modules_to_save.weight"), weight);
    tensors.insert(format!("base_model.model.{module}.modules_to_save.bias"), bias);
  };
  match head {
    Head::Trained => {
      put_head("pre_classifier", filled(&[DIM, DIM], 11.0), zeros(&[DIM]));
      put_head("classifier", filled(&[2, DIM], 12.0), filled(&[2], 13.0));
    }
    Head::FixedLogits(logits) => {
      put_head("pre_classifier", filled(&[DIM, DIM], 11.0), zeros(&[DIM]));
      put_head(
        "classifier",
        zeros(&[2, DIM]),
        Tensor::new(&logits, &Device::Cpu).unwrap(),
      );
    }
    Head::Absent => {}
  }

  candle_core::safetensors::save(&tensors, dir.join("adapter_model.safetensors")).unwrap();
}

/// Temp dirs holding the fixture; dropped together with the test
struct Fixture {
  base: TempDir,
  adapter: TempDir,
}

impl Fixture {
  fn new(head: Head) -> Self {
    let base = tempfile::tempdir().expect("create base model dir");
    let adapter = tempfile::tempdir().expect("create adapter dir");
    write_base_model(base.path());
    write_adapter(adapter.path(), head);
    Self { base, adapter }
  }

  fn config(&self, max_length: usize) -> ModelConfig {
    ModelConfig {
      base_model: self.base.path().display().to_string(),
      adapter_dir: self.adapter.path().to_path_buf(),
      max_length,
    }
  }

  fn load(&self) -> SentimentModel {
    SentimentModel::load(&self.config(MAX_POSITIONS)).expect("fixture model should load")
  }
}

fn has_two_decimals(value: f64) -> bool {
  ((value * 100.0).round() - value * 100.0).abs() < 1e-6
}

// ============================================================================
// 正常系
// ============================================================================

#[test]
fn loads_and_predicts_without_download() {
  let fixture = Fixture::new(Head::Trained);
  let model = fixture.load();
  assert_eq!(model.max_length(), MAX_POSITIONS);

  let prediction = model.predict("the good movie").unwrap();
  assert!((50.0..=100.0).contains(&prediction.confidence));
  assert!(has_two_decimals(prediction.confidence));
}

#[test]
fn identical_input_gives_identical_output() {
  let model = Fixture::new(Head::Trained).load();

  let first = model.predict("the bad movie").unwrap();
  let second = model.predict("the bad movie").unwrap();
  assert_eq!(first, second);
}

#[test]
fn empty_text_is_classified() {
  let model = Fixture::new(Head::Trained).load();

  let prediction = model.predict("").unwrap();
  assert!((50.0..=100.0).contains(&prediction.confidence));
}

#[test]
fn text_past_max_length_is_truncated() {
  let model = Fixture::new(Head::Trained).load();

  // 300 words, far beyond the 16 position embeddings
  let text = "good movie the bad ".repeat(75);
  let prediction = model.predict(&text).unwrap();
  assert!((50.0..=100.0).contains(&prediction.confidence));
}

#[test]
fn adapter_head_decides_the_label() {
  // softmax([0, 3]) = [0.0474, 0.9526]
  let positive = Fixture::new(Head::FixedLogits([0.0, 3.0])).load();
  let prediction = positive.predict("the bad movie").unwrap();
  assert_eq!(prediction.sentiment, Sentiment::Positive);
  assert_eq!(prediction.confidence, 95.26);

  let negative = Fixture::new(Head::FixedLogits([3.0, 0.0])).load();
  let prediction = negative.predict("the good movie").unwrap();
  assert_eq!(prediction.sentiment, Sentiment::Negative);
  assert_eq!(prediction.confidence, 95.26);
}

// ============================================================================
// 異常系（起動時の致命的エラー）
// ============================================================================

#[test]
fn max_length_beyond_position_embeddings_is_rejected() {
  let fixture = Fixture::new(Head::Trained);

  let result = SentimentModel::load(&fixture.config(MAX_POSITIONS + 1));
  assert!(matches!(
    result,
    Err(SentimentError::Load(LoadError::MaxLengthExceedsModel {
      max_length: 17,
      max_position_embeddings: 16,
    }))
  ));
}

#[test]
fn adapter_without_head_is_rejected() {
  let fixture = Fixture::new(Head::Absent);

  let result = SentimentModel::load(&fixture.config(MAX_POSITIONS));
  assert!(matches!(
    result,
    Err(SentimentError::Adapter(AdapterError::MissingClassifierHead(_)))
  ));
}

#[test]
fn max_length_without_room_for_text_is_rejected() {
  let fixture = Fixture::new(Head::Trained);

  let result = SentimentModel::load(&fixture.config(2));
  assert!(matches!(result, Err(SentimentError::Tokenizer(_))));
}
