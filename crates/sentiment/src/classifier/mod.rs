//! Classifier module
pub mod distilbert;

pub use distilbert::{ClassifierDims, DistilBertClassifier};
