//! HTTPハンドラー定義

use axum::{Json, extract::State};
use tracing::{debug, error};

use crate::errors::ApiError;
use crate::models::{AnalyzeRequest, AnalyzeResponse, HealthResponse};

use super::state::AppState;

/// POST /api/analyze エンドポイント
///
/// テキストの感情（肯定 / 否定）を推定する。
///
/// # Request Body
/// ```json
/// { "text": "解析対象のテキスト" }
/// ```
/// `text` が無い場合は空文字列として扱う。
///
/// # Response
/// - 200 OK: `{ "sentiment": "Positive" | "Negative", "confidence": 0.0〜100.0 }`
/// - 4xx: JSON として不正なボディ（Axum の Json extractor による）
/// - 500 Internal Server Error: 推論エラー
pub async fn post_analyze(
  State(state): State<AppState>,
  Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
  debug!(text_len = request.text.len(), "感情分析リクエストを受信");

  // CPUバウンドな処理を spawn_blocking で実行
  // トークナイズと順伝播は重い処理のため、非同期ランタイムをブロックしないよう分離
  let service = state.service.clone();

  let response =
    tokio::task::spawn_blocking(move || service.analyze(request)).await.map_err(|e| {
      error!(error = %e, "spawn_blocking エラー");
      ApiError::internal("処理の実行に失敗しました")
    })??;

  Ok(Json(response))
}

/// GET /api/health エンドポイント
///
/// サーバーが稼働しているかを確認する。モデルの状態には依存しない。
pub async fn health_check() -> Json<HealthResponse> {
  Json(HealthResponse::ok())
}
