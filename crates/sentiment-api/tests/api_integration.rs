//! API統合テスト
//!
//! Router 経由で HTTP エンドポイントの振る舞いを検証する。
//! スタブサービスを使用するため、モデルロード不要で軽量かつ高速なテスト。

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use tower::ServiceExt;

use sentiment::{ModelConfig, Sentiment};
use sentiment_api::{
  api::{AppState, create_router},
  config::Config,
  errors::{ApiError, Result as ApiResult},
  models::{AnalyzeRequest, AnalyzeResponse},
  service::SentimentApiService,
};

/// 統合テスト用の軽量スタブサービス
///
/// - "love" を含む: Positive / 97.5
/// - それ以外（空文字列を含む）: Negative / 62.25
struct StubSentimentApiService;

impl SentimentApiService for StubSentimentApiService {
  fn analyze(&self, request: AnalyzeRequest) -> ApiResult<AnalyzeResponse> {
    if request.text.contains("love") {
      Ok(AnalyzeResponse {
        sentiment: Sentiment::Positive,
        confidence: 97.5,
      })
    } else {
      Ok(AnalyzeResponse {
        sentiment: Sentiment::Negative,
        confidence: 62.25,
      })
    }
  }
}

/// 常に推論エラーを返すスタブサービス
struct FailingSentimentApiService;

impl SentimentApiService for FailingSentimentApiService {
  fn analyze(&self, _request: AnalyzeRequest) -> ApiResult<AnalyzeResponse> {
    Err(ApiError::inference("ロジットの形状が不正です"))
  }
}

/// テスト用の Router を構築する
fn test_app_with(service: Arc<dyn SentimentApiService>) -> Router {
  let config = Config {
    bind_addr: "127.0.0.1:0".to_string(),
    model: ModelConfig::default(),
  };

  create_router(AppState::new(config, service))
}

fn test_app() -> Router {
  test_app_with(Arc::new(StubSentimentApiService))
}

fn analyze_request(body: impl Into<Body>) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri("/api/analyze")
    .header("content-type", "application/json")
    .body(body.into())
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
  let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("read body");
  serde_json::from_slice(&body_bytes).expect("body should be valid json")
}

// ============================================================================
// 正常系テスト
// ============================================================================

#[tokio::test]
async fn health_check_returns_ok_json() {
  let app = test_app();

  let response = app
    .oneshot(Request::builder().method("GET").uri("/api/health").body(Body::empty()).unwrap())
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn health_check_does_not_depend_on_model() {
  let app = test_app_with(Arc::new(FailingSentimentApiService));

  let response = app
    .oneshot(Request::builder().method("GET").uri("/api/health").body(Body::empty()).unwrap())
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_analyze_success_returns_200() {
  let app = test_app();

  let payload = serde_json::json!({ "text": "I love this!" });

  let response = app
    .oneshot(analyze_request(payload.to_string()))
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);
  assert_eq!(
    body_json(response).await,
    serde_json::json!({ "sentiment": "Positive", "confidence": 97.5 })
  );
}

#[tokio::test]
async fn post_analyze_empty_text_returns_200() {
  let app = test_app();

  let payload = serde_json::json!({ "text": "" });

  let response = app
    .oneshot(analyze_request(payload.to_string()))
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);

  let json = body_json(response).await;
  assert_eq!(json["sentiment"], "Negative");
}

#[tokio::test]
async fn post_analyze_missing_text_field_is_empty_text() {
  let app = test_app();

  // text フィールドが欠落した JSON は空文字列として扱う
  let payload = serde_json::json!({ "foo": "bar" });

  let response = app
    .oneshot(analyze_request(payload.to_string()))
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);

  let json = body_json(response).await;
  assert_eq!(json["sentiment"], "Negative");
  assert_eq!(json["confidence"], 62.25);
}

#[tokio::test]
async fn post_analyze_allows_cross_origin_requests() {
  let app = test_app();

  let request = Request::builder()
    .method("POST")
    .uri("/api/analyze")
    .header("content-type", "application/json")
    .header(header::ORIGIN, "http://localhost:3000")
    .body(Body::from(r#"{"text": "I love this!"}"#))
    .unwrap();

  let response = app.oneshot(request).await.expect("request should succeed");

  assert_eq!(response.status(), StatusCode::OK);
  assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

// ============================================================================
// 異常系テスト（サービスエラー）
// ============================================================================

#[tokio::test]
async fn post_analyze_inference_error_returns_500() {
  let app = test_app_with(Arc::new(FailingSentimentApiService));

  let payload = serde_json::json!({ "text": "This is terrible." });

  let response = app
    .oneshot(analyze_request(payload.to_string()))
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

  let json = body_json(response).await;
  assert_eq!(json["error"]["code"], "inference_error");
}

// ============================================================================
// JSON パースエラーテスト（Axum 側）
// ============================================================================

#[tokio::test]
async fn post_analyze_invalid_json_returns_client_error() {
  let app = test_app();

  // JSON として不正なボディ
  let response = app
    .oneshot(analyze_request("{ invalid json"))
    .await
    .expect("request should succeed");

  // Axum の Json extractor が返すステータス（400 or 422 等）を許容
  assert!(
    response.status().is_client_error(),
    "expected 4xx, got: {}",
    response.status()
  );
}

#[tokio::test]
async fn unknown_route_returns_404() {
  let app = test_app();

  let response = app
    .oneshot(Request::builder().method("GET").uri("/analyze").body(Body::empty()).unwrap())
    .await
    .expect("request should succeed");

  assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
