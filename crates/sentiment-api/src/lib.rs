//! sentiment-api crate
//!
//! Web server providing LoRA sentiment classification as HTTP API.
//!
//! ## Endpoints
//! - `POST /api/analyze` - Sentiment Analysis
//! - `GET /api/health` - Health Check
//!
//! ## Usage Example
//! ```bash
//! curl -X POST http://127.0.0.1:5000/api/analyze \
//!   -H "Content-Type: application/json" \
//!   -d '{"text": "I love this!"}'
//! # {"sentiment":"Positive","confidence":99.12}
//! ```

pub mod api;
pub mod config;
pub mod errors;
pub mod models;
pub mod service;

pub use api::AppState;
pub use config::Config;
pub use errors::{ApiError, ApiErrorKind};
pub use models::{AnalyzeRequest, AnalyzeResponse, HealthResponse};
pub use service::SentimentApiServiceFull;
