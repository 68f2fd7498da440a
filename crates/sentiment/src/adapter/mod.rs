//! LoRA adapter module

pub mod lora;

pub use lora::{AdapterConfig, LoraAdapter, MergeReport, TargetModules, normalize_tensor_name};
