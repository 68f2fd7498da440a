//! モデルモジュール

mod prediction;

pub use prediction::{Prediction, Sentiment, round_percentage};
