//! リクエストモデル定義

use serde::Deserialize;

/// 感情分析リクエスト
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
  /// 解析対象のテキスト
  ///
  /// フィールドが無い場合は空文字列として扱う。長さの上限は設けず、
  /// トークナイズ時に切り詰める。
  #[serde(default)]
  pub text: String,
}
