//! APIエラー定義

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

// sentiment クレートのエラー型をインポート
use sentiment::errors::SentimentError;

/// エラーの種類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
  /// 推論エラー
  Inference,
  /// 内部エラー
  Internal,
  /// 設定エラー
  Config,
}

impl ApiErrorKind {
  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    match self {
      Self::Inference => "inference_error",
      Self::Internal => "internal_error",
      Self::Config => "config_error",
    }
  }

  /// HTTPステータスコードを取得
  ///
  /// 入力値の検証は行わないため、クライアントエラーはここでは発生しない。
  #[must_use]
  pub fn status(&self) -> StatusCode {
    match self {
      Self::Inference | Self::Internal | Self::Config => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

/// APIエラー
#[derive(Debug, Error)]
pub enum ApiError {
  /// 推論エラー
  #[error("推論エラー: {0}")]
  Inference(String),

  /// 内部エラー
  #[error("内部エラー: {0}")]
  Internal(String),

  /// 設定エラー
  #[error("設定エラー: {0}")]
  Config(String),
}

impl ApiError {
  /// エラーの種類を取得
  #[must_use]
  pub fn kind(&self) -> ApiErrorKind {
    match self {
      Self::Inference(_) => ApiErrorKind::Inference,
      Self::Internal(_) => ApiErrorKind::Internal,
      Self::Config(_) => ApiErrorKind::Config,
    }
  }

  /// エラーコードを取得
  #[must_use]
  pub fn code(&self) -> &'static str {
    self.kind().code()
  }

  /// HTTPステータスコードを取得
  #[must_use]
  pub fn status(&self) -> StatusCode {
    self.kind().status()
  }

  /// 推論エラーを作成
  #[must_use]
  pub fn inference(message: impl Into<String>) -> Self {
    Self::Inference(message.into())
  }

  /// 内部エラーを作成
  #[must_use]
  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal(message.into())
  }

  /// 設定エラーを作成
  #[must_use]
  pub fn config(message: impl Into<String>) -> Self {
    Self::Config(message.into())
  }
}

/// エラーレスポンスのJSON構造
#[derive(Serialize)]
struct ErrorResponse {
  error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
  code: &'static str,
  message: String,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = ErrorResponse {
      error: ErrorBody {
        code: self.code(),
        message: self.to_string(),
      },
    };

    (status, Json(body)).into_response()
  }
}

/// SentimentError から ApiError への変換
///
/// ドメイン層のエラーを API 層のエラーにマッピングする。
/// 起動時のエラー（設定・ロード・アダプター）は設定エラー、
/// リクエスト処理中のエラー（トークナイズ・推論）は推論エラーとなる。
impl From<SentimentError> for ApiError {
  fn from(err: SentimentError) -> Self {
    match err {
      SentimentError::Config(_) | SentimentError::Load(_) | SentimentError::Adapter(_) => {
        ApiError::config(err.to_string())
      }
      SentimentError::Tokenizer(_) | SentimentError::Inference(_) => {
        ApiError::inference(err.to_string())
      }
      // #[non_exhaustive] な enum のため、将来追加されるバリアントに対応
      _ => ApiError::internal(format!("unknown error: {err}")),
    }
  }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, ApiError>;
