//! Tokenizer module
pub mod text_tokenizer;

pub use text_tokenizer::TextTokenizer;
