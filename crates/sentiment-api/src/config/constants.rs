//! API設定の定数定義

/// デフォルトのバインドアドレス
///
/// 開発環境での利用を想定した localhost のポート 5000。
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// バインドアドレスを指定する環境変数
pub const ENV_BIND_ADDR: &str = "SENTIMENT_API_BIND_ADDR";

/// ベースモデル（Hub のリポジトリ ID またはローカルディレクトリ）を指定する環境変数
pub const ENV_BASE_MODEL: &str = "SENTIMENT_BASE_MODEL";

/// LoRA アダプターのディレクトリを指定する環境変数
pub const ENV_ADAPTER_DIR: &str = "SENTIMENT_ADAPTER_DIR";

/// トークナイザーの切り詰め長を指定する環境変数
pub const ENV_MAX_LENGTH: &str = "SENTIMENT_MAX_LENGTH";
