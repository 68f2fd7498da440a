// crates/sentiment/src/service.rs

//! SentimentModel: sentiment クレートの統合ファサード。
//!
//! - ベースモデルのファイル解決 (BaseModelSource)
//! - LoRA アダプターの合成 (LoraAdapter)
//! - 分類器 (DistilBertClassifier) とトークナイザー (TextTokenizer)
//!
//! HTTP 層などの外部からは、この構造体だけを意識すればよい。
//! ロード後は不変であり、`Arc` で共有して複数スレッドから同時に `predict` できる。

use std::time::Instant;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use candle_transformers::models::distilbert::Config as DistilBertConfig;
use tracing::{debug, info};

use crate::adapter::LoraAdapter;
use crate::classifier::{ClassifierDims, DistilBertClassifier};
use crate::config::ModelConfig;
use crate::errors::error_definition::{
  AdapterError, InferenceError, LoadError, SentimentResult,
};
use crate::models::Prediction;
use crate::tokenizer::TextTokenizer;

/// 分類ヘッドとして必ず存在しなければならないテンソル
///
/// ベースモデル（事前学習済みの MLM チェックポイント）には含まれないため、
/// アダプターの `modules_to_save` から供給される。
const HEAD_TENSORS: [&str; 4] = [
  "pre_classifier.weight",
  "pre_classifier.bias",
  "classifier.weight",
  "classifier.bias",
];

/// sentiment クレートの統合ファサード。
///
/// ベースモデル + LoRA アダプターを合成した二値感情分類器。
pub struct SentimentModel {
  /// 分類器
  classifier: DistilBertClassifier,

  /// 切り詰め付きトークナイザー
  tokenizer: TextTokenizer,
}

impl SentimentModel {
  /// 初期化（ファイル解決 + 重みのロード + アダプター合成 + トークナイザー構築）
  ///
  /// # 処理フロー
  /// 1. 設定の妥当性を検証
  /// 2. ベースモデルの config.json / model.safetensors / tokenizer.json を解決
  /// 3. アダプターを読み込み、ベースの重みにメモリ上で合成
  /// 4. 分類器とトークナイザーを構築
  ///
  /// # エラー
  /// - 設定が不正
  /// - ベースモデルのダウンロード・読み込み失敗
  /// - アダプターが存在しない、または互換性がない
  ///
  /// いずれも起動時の致命的エラーであり、リトライはしない。
  pub fn load(config: &ModelConfig) -> SentimentResult<Self> {
    // 設定の妥当性を検証（ConfigError は #[from] で SentimentError に自動変換）
    config.validate()?;

    let start = Instant::now();
    let device = Device::Cpu;
    let source = config.base_model_source();
    info!(base_model = %source, adapter_dir = %config.adapter_dir().display(), "モデルをロードします");

    let files = source.resolve()?;

    let config_json = std::fs::read_to_string(&files.config).map_err(LoadError::io(&files.config))?;
    let invalid_config = |source: serde_json::Error| LoadError::InvalidModelConfig {
      path: files.config.clone(),
      source: std::sync::Arc::new(source),
    };
    let encoder_config: DistilBertConfig =
      serde_json::from_str(&config_json).map_err(invalid_config)?;
    let dims: ClassifierDims = serde_json::from_str(&config_json).map_err(invalid_config)?;

    if config.max_length > dims.max_position_embeddings {
      return Err(
        LoadError::MaxLengthExceedsModel {
          max_length: config.max_length,
          max_position_embeddings: dims.max_position_embeddings,
        }
        .into(),
      );
    }

    let mut weights =
      candle_core::safetensors::load(&files.weights, &device).map_err(LoadError::from)?;
    debug!(tensor_count = weights.len(), "ベースモデルの重みを読み込みました");

    let adapter = LoraAdapter::from_dir(config.adapter_dir(), &device)?;
    let report = adapter.merge_into(&mut weights)?;
    info!(
      merged_modules = report.merged_modules,
      replaced_tensors = report.replaced_tensors,
      "アダプターを合成しました"
    );

    if let Some(missing) = HEAD_TENSORS.iter().find(|name| !weights.contains_key(**name)) {
      return Err(AdapterError::MissingClassifierHead((*missing).to_string()).into());
    }
    let shape_of = |name: &str| weights.get(name).map(|t| t.dims().to_vec());
    debug!(
      pre_classifier = ?shape_of("pre_classifier.weight"),
      classifier = ?shape_of("classifier.weight"),
      "分類ヘッドを確認しました"
    );

    let vb = VarBuilder::from_tensors(weights, DType::F32, &device);
    let classifier =
      DistilBertClassifier::load(vb, &encoder_config, &dims).map_err(LoadError::from)?;

    let tokenizer = TextTokenizer::from_file(&files.tokenizer, config.max_length)?;

    info!(elapsed_ms = start.elapsed().as_millis() as u64, "モデルのロードが完了しました");

    Ok(Self {
      classifier,
      tokenizer,
    })
  }

  /// テキストの感情を推定する
  ///
  /// # 処理フロー
  /// 1. `max_length` トークンに切り詰めてトークナイズ（長すぎる入力も拒否しない）
  /// 2. 推論のみの順伝播を 1 回実行
  /// 3. ロジットに softmax を適用し、argmax をラベル、最大確率を信頼度とする
  ///
  /// 同じ入力には常に同じ結果を返す（サンプリングは行わない）。
  pub fn predict(&self, text: &str) -> SentimentResult<Prediction> {
    let ids = self.tokenizer.encode(text)?;
    let logits = self.classifier.forward(&ids).map_err(InferenceError::from)?;
    let prediction = Prediction::from_logits(&logits)?;

    debug!(
      token_count = ids.len(),
      sentiment = %prediction.sentiment,
      confidence = prediction.confidence,
      "推論が完了しました"
    );

    Ok(prediction)
  }

  /// トークナイザーの切り詰め長
  pub fn max_length(&self) -> usize {
    self.tokenizer.max_length()
  }
}
