//! sentiment 感情分析ライブラリー
//!
//! DistilBERT のベースモデルに LoRA アダプターを合成し、
//! テキストの肯定 / 否定を二値分類する

/// アダプターモジュール - PEFT 形式の LoRA アダプターの読み込みと重みへの合成
pub mod adapter;

/// 分類器モジュール - DistilBERT エンコーダーと分類ヘッド
pub mod classifier;

/// 設定モジュール - ModelConfig 等の設定構造体を定義
pub mod config;

/// エラーモジュール - SentimentError, SentimentResult等のエラー型を定義
pub mod errors;

/// ローダーモジュール - ベースモデルのファイル解決（ローカル / Hugging Face Hub）
pub mod loader;

/// データモデルモジュール - Sentiment, Prediction等のデータ構造を定義
pub mod models;

/// サービスモジュール - SentimentModel 等の上位レベルAPIを提供
pub mod service;

/// トークナイザーモジュール - 切り詰め付きのテキストトークナイザー
pub mod tokenizer;

/// 再エクスポート
pub use config::ModelConfig;
pub use errors::{SentimentError, SentimentResult};
pub use models::{Prediction, Sentiment};
pub use service::SentimentModel;
