//! sentiment-api サーバーエントリーポイント

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sentiment_api::ApiError;
use sentiment_api::api::AppState;
use sentiment_api::api::run_server;
use sentiment_api::config::Config;
use sentiment_api::service::SentimentApiServiceFull;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
  // ロギングの初期化（RUST_LOG 未指定時は info）
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer())
    .init();

  // 設定の読み込み
  let config = Config::from_env()?;
  tracing::info!(
    base_model = %config.model.base_model,
    adapter_dir = %config.model.adapter_dir.display(),
    max_length = config.model.max_length,
    "設定を読み込みました"
  );

  // モデルのロード（失敗した場合はサーバーを起動しない）
  let service = Arc::new(SentimentApiServiceFull::new(&config)?);
  tracing::info!("感情分析サービスを初期化しました");

  // アプリケーション状態の作成
  let state = AppState::new(config, service);

  // サーバー起動
  run_server(state).await
}
