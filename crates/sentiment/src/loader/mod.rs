//! Base model file resolution

pub mod model_files;

pub use model_files::{BaseModelFiles, BaseModelSource};
