//! エラー定義

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// モデル設定（ModelConfig）関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
  /// base_model が空
  #[error("base_model にモデル ID またはディレクトリを指定してください")]
  EmptyBaseModel,

  /// adapter_dir が空
  #[error("adapter_dir にアダプターのディレクトリを指定してください")]
  EmptyAdapterDir,

  /// max_length < 1
  #[error("max_length は 1 以上である必要があります: actual={actual}")]
  InvalidMaxLength {
    /// 実際に指定された値
    actual: usize,
  },
}

/// ベースモデルのロード関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum LoadError {
  /// ローカルディレクトリに必要なファイルが存在しない
  #[error("モデルファイルが見つかりません: {0}")]
  ArtifactNotFound(PathBuf),

  /// Hugging Face Hub からのダウンロード失敗
  #[error("モデルファイルのダウンロードに失敗しました: repo={repo}, file={file}, error={reason}")]
  Download {
    /// リポジトリ ID
    repo: String,
    /// ファイル名
    file: String,
    /// 失敗の理由
    reason: String,
  },

  /// ファイルの読み込み失敗
  #[error("ファイルの読み込みに失敗しました: path={path:?}, error={source}")]
  Io {
    /// 対象のパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// config.json の解析失敗
  #[error("モデル設定の解析に失敗しました: path={path:?}, error={source}")]
  InvalidModelConfig {
    /// 対象のパス
    path: PathBuf,
    /// 元となった JSON エラー
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// 重みのロードやモデル構築の失敗（テンソル不足、形状不一致等）
  #[error("モデルの重みのロードに失敗しました: {0}")]
  Weights(Arc<candle_core::Error>),

  /// max_length がモデルの位置埋め込み数を超えている
  #[error(
    "max_length がモデルの上限を超えています: max_length={max_length}, \
     max_position_embeddings={max_position_embeddings}"
  )]
  MaxLengthExceedsModel {
    /// 指定された max_length
    max_length: usize,
    /// モデルが扱える最大系列長
    max_position_embeddings: usize,
  },
}

impl LoadError {
  /// パス付きの IO エラーを作成するクロージャを返す
  pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
    move |source| Self::Io {
      path: path.to_path_buf(),
      source: Arc::new(source),
    }
  }
}

impl From<candle_core::Error> for LoadError {
  fn from(err: candle_core::Error) -> Self {
    Self::Weights(Arc::new(err))
  }
}

/// LoRA アダプター関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum AdapterError {
  /// アダプターのディレクトリが存在しない
  #[error("アダプターのディレクトリが見つかりません: {0}")]
  DirectoryNotFound(PathBuf),

  /// アダプターのファイルが存在しない
  #[error("アダプターのファイルが見つかりません: {0}")]
  MissingFile(PathBuf),

  /// adapter_config.json の読み込み失敗
  #[error("アダプター設定の読み込みに失敗しました: path={path:?}, error={source}")]
  Io {
    /// 対象のパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// adapter_config.json の解析失敗
  #[error("アダプター設定の解析に失敗しました: path={path:?}, error={source}")]
  InvalidConfig {
    /// 対象のパス
    path: PathBuf,
    /// 元となった JSON エラー
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// LoRA 以外の PEFT 方式
  #[error("サポートされていない PEFT 方式です: {0}")]
  UnsupportedPeftType(String),

  /// r が 0
  #[error("LoRA のランク r は 1 以上である必要があります")]
  InvalidRank,

  /// lora_A / lora_B の片方しか存在しない
  #[error("LoRA の重みが揃っていません: module={module}")]
  IncompleteLoraPair {
    /// 対象のモジュール名
    module: String,
  },

  /// LoRA の適用先の重みがベースモデルに存在しない
  #[error("LoRA の適用先がベースモデルに存在しません: module={module}")]
  UnknownTarget {
    /// 対象のモジュール名
    module: String,
  },

  /// 差分の形状がベースの重みと一致しない
  #[error("LoRA の差分の形状が一致しません: module={module}, expected={expected:?}, actual={actual:?}")]
  ShapeMismatch {
    /// 対象のモジュール名
    module: String,
    /// ベースの重みの形状
    expected: Vec<usize>,
    /// 差分の形状
    actual: Vec<usize>,
  },

  /// 分類ヘッドの重みがベースにもアダプターにも存在しない
  #[error("分類ヘッドの重みが見つかりません: {0}")]
  MissingClassifierHead(String),

  /// テンソル演算の失敗
  #[error("アダプターのテンソル演算に失敗しました: {0}")]
  Tensor(Arc<candle_core::Error>),
}

impl From<candle_core::Error> for AdapterError {
  fn from(err: candle_core::Error) -> Self {
    Self::Tensor(Arc::new(err))
  }
}

/// トークナイザー関連エラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum TokenizerError {
  /// tokenizer.json のロード失敗
  #[error("トークナイザーのロードに失敗しました: path={path:?}, error={reason}")]
  Load {
    /// 対象のパス
    path: PathBuf,
    /// 失敗の理由
    reason: String,
  },

  /// 切り詰め設定の適用失敗
  #[error("トークナイザーの設定に失敗しました: {0}")]
  Configure(String),

  /// エンコード失敗
  #[error("トークナイズに失敗しました: {reason}")]
  Encode {
    /// 失敗の理由
    reason: String,
  },
}

/// 推論関連エラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum InferenceError {
  /// テンソル演算の失敗
  #[error("推論中のテンソル演算に失敗しました: {0}")]
  Tensor(Arc<candle_core::Error>),

  /// ロジットの形状が 2 クラス分類と一致しない
  #[error("ロジットの形状が不正です: shape={shape:?}")]
  UnexpectedLogits {
    /// 実際の形状
    shape: Vec<usize>,
  },
}

impl From<candle_core::Error> for InferenceError {
  fn from(err: candle_core::Error) -> Self {
    Self::Tensor(Arc::new(err))
  }
}

/// 統合エラー
/// 本クレートの外部に公開するエラー用 API はこのエラーを返すこと
/// `SentimentResult<T>` = `Result<T, SentimentError>` として使用する
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum SentimentError {
  /// 設定エラー
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// ベースモデルのロード関連エラー
  #[error(transparent)]
  Load(#[from] LoadError),

  /// アダプター関連エラー
  #[error(transparent)]
  Adapter(#[from] AdapterError),

  /// トークナイザー関連エラー
  #[error(transparent)]
  Tokenizer(#[from] TokenizerError),

  /// 推論関連エラー
  #[error(transparent)]
  Inference(#[from] InferenceError),
}

/// sentiment クレートの標準 Result 型エイリアス
pub type SentimentResult<T> = Result<T, SentimentError>;
