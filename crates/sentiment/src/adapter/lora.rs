//! PEFT LoRA Adapter
//!
//! Reads an adapter directory saved by PEFT (`adapter_config.json` +
//! `adapter_model.safetensors`) and composes it with the base weights in memory:
//!
//! ```text
//! W' = W + scaling * (B · A)      scaling = lora_alpha / r   (or / sqrt(r) with rsLoRA)
//! ```
//!
//! Tensors saved through `modules_to_save` (the classification head) replace
//! the corresponding base tensors. Files on disk are never modified.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use candle_core::{Device, Tensor};
use serde::Deserialize;
use tracing::{debug, info};

use crate::errors::AdapterError;

/// Adapter configuration file name
pub const ADAPTER_CONFIG_FILE: &str = "adapter_config.json";

/// Adapter weight file name
pub const ADAPTER_WEIGHTS_FILE: &str = "adapter_model.safetensors";

/// Prefix PEFT puts in front of every saved tensor name
const PEFT_PREFIX: &str = "base_model.model.";

/// Adapter name segment PEFT may leave in tensor names
const ADAPTER_NAME: &str = "default";

/// Wrapper segment of tensors saved via `modules_to_save`
const MODULES_TO_SAVE: &str = "modules_to_save";

const LORA_A_SUFFIX: &str = ".lora_A.weight";
const LORA_B_SUFFIX: &str = ".lora_B.weight";

/// Target modules as written by PEFT: either a list of names or a regex
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetModules {
  /// Module names such as `["q_lin", "v_lin"]`
  List(Vec<String>),
  /// Regular expression over full module names
  Pattern(String),
}

/// Subset of `adapter_config.json` used for composition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AdapterConfig {
  /// PEFT method; only `LORA` is supported
  #[serde(default)]
  pub peft_type: Option<String>,
  /// Model the adapter was trained on
  #[serde(default)]
  pub base_model_name_or_path: Option<String>,
  /// Rank
  pub r: usize,
  /// Scaling numerator
  pub lora_alpha: f64,
  /// Modules carrying LoRA weights
  #[serde(default)]
  pub target_modules: Option<TargetModules>,
  /// Modules saved in full (the classification head for sequence classification)
  #[serde(default)]
  pub modules_to_save: Option<Vec<String>>,
  /// Base layer stores weights as `(fan_in, fan_out)`
  #[serde(default)]
  pub fan_in_fan_out: bool,
  /// Rank-stabilized scaling (`lora_alpha / sqrt(r)`)
  #[serde(default)]
  pub use_rslora: bool,
}

impl AdapterConfig {
  /// Reads and validates `adapter_config.json`
  pub fn from_file(path: &Path) -> Result<Self, AdapterError> {
    let content = std::fs::read_to_string(path).map_err(|source| AdapterError::Io {
      path: path.to_path_buf(),
      source: Arc::new(source),
    })?;

    let config: Self =
      serde_json::from_str(&content).map_err(|source| AdapterError::InvalidConfig {
        path: path.to_path_buf(),
        source: Arc::new(source),
      })?;

    config.validate()?;
    Ok(config)
  }

  /// Rejects adapters that cannot be composed
  pub fn validate(&self) -> Result<(), AdapterError> {
    if let Some(peft_type) = &self.peft_type
      && !peft_type.eq_ignore_ascii_case("LORA")
    {
      return Err(AdapterError::UnsupportedPeftType(peft_type.clone()));
    }

    if self.r == 0 {
      return Err(AdapterError::InvalidRank);
    }

    Ok(())
  }

  /// Factor applied to `B · A`
  #[must_use]
  pub fn scaling(&self) -> f64 {
    let r = self.r as f64;
    if self.use_rslora {
      self.lora_alpha / r.sqrt()
    } else {
      self.lora_alpha / r
    }
  }
}

/// Low-rank pair of one module
#[derive(Debug, Clone)]
struct LoraPair {
  /// `(r, in_features)`
  a: Tensor,
  /// `(out_features, r)`
  b: Tensor,
}

/// Outcome of [`LoraAdapter::merge_into`], for logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
  /// Number of weights updated with a low-rank delta
  pub merged_modules: usize,
  /// Number of tensors replaced or added from `modules_to_save`
  pub replaced_tensors: usize,
}

/// Loaded LoRA adapter
#[derive(Debug, Clone)]
pub struct LoraAdapter {
  config: AdapterConfig,
  /// Module name (e.g. `distilbert.transformer.layer.0.attention.q_lin`) -> pair
  pairs: BTreeMap<String, LoraPair>,
  /// Full tensors keyed by base tensor name
  saved_tensors: BTreeMap<String, Tensor>,
}

impl LoraAdapter {
  /// Loads an adapter directory
  ///
  /// # Errors
  /// - The directory or one of its files is missing
  /// - The configuration is invalid
  /// - The weights do not form complete LoRA pairs
  pub fn from_dir(dir: &Path, device: &Device) -> Result<Self, AdapterError> {
    if !dir.is_dir() {
      return Err(AdapterError::DirectoryNotFound(dir.to_path_buf()));
    }

    let config_path = dir.join(ADAPTER_CONFIG_FILE);
    if !config_path.is_file() {
      return Err(AdapterError::MissingFile(config_path));
    }
    let config = AdapterConfig::from_file(&config_path)?;

    let weights_path = dir.join(ADAPTER_WEIGHTS_FILE);
    if !weights_path.is_file() {
      return Err(AdapterError::MissingFile(weights_path));
    }
    let tensors = candle_core::safetensors::load(&weights_path, device)?;

    info!(
      adapter_dir = %dir.display(),
      base_model = config.base_model_name_or_path.as_deref().unwrap_or("-"),
      r = config.r,
      lora_alpha = config.lora_alpha,
      target_modules = ?config.target_modules,
      "Loaded LoRA adapter"
    );

    Self::from_tensors(config, tensors)
  }

  /// Groups adapter tensors into LoRA pairs and fully saved tensors
  pub fn from_tensors(
    config: AdapterConfig,
    tensors: HashMap<String, Tensor>,
  ) -> Result<Self, AdapterError> {
    config.validate()?;

    let mut halves: BTreeMap<String, (Option<Tensor>, Option<Tensor>)> = BTreeMap::new();
    let mut saved_tensors = BTreeMap::new();

    for (name, tensor) in tensors {
      let name = normalize_tensor_name(&name);
      if let Some(module) = name.strip_suffix(LORA_A_SUFFIX) {
        halves.entry(module.to_string()).or_default().0 = Some(tensor);
      } else if let Some(module) = name.strip_suffix(LORA_B_SUFFIX) {
        halves.entry(module.to_string()).or_default().1 = Some(tensor);
      } else {
        saved_tensors.insert(name, tensor);
      }
    }

    let mut pairs = BTreeMap::new();
    for (module, half) in halves {
      match half {
        (Some(a), Some(b)) => {
          pairs.insert(module, LoraPair { a, b });
        }
        _ => return Err(AdapterError::IncompleteLoraPair { module }),
      }
    }

    Ok(Self {
      config,
      pairs,
      saved_tensors,
    })
  }

  /// Adapter configuration
  pub fn config(&self) -> &AdapterConfig {
    &self.config
  }

  /// Names of the modules carrying LoRA weights
  pub fn lora_modules(&self) -> impl Iterator<Item = &str> {
    self.pairs.keys().map(String::as_str)
  }

  /// Whether the adapter carries a full tensor for `name`
  pub fn has_saved_tensor(&self, name: &str) -> bool {
    self.saved_tensors.contains_key(name)
  }

  /// Composes the adapter with the base weights
  ///
  /// # Errors
  /// - A LoRA target weight does not exist in `weights`
  /// - The delta shape differs from the base weight shape
  pub fn merge_into(&self, weights: &mut HashMap<String, Tensor>) -> Result<MergeReport, AdapterError> {
    let scaling = self.config.scaling();
    let mut report = MergeReport::default();

    for (module, pair) in &self.pairs {
      let key = format!("{module}.weight");
      let base = weights.get(&key).ok_or_else(|| AdapterError::UnknownTarget {
        module: module.clone(),
      })?;

      let delta = pair.b.matmul(&pair.a)?;
      let delta = if self.config.fan_in_fan_out {
        delta.t()?
      } else {
        delta
      };

      if delta.dims() != base.dims() {
        return Err(AdapterError::ShapeMismatch {
          module: module.clone(),
          expected: base.dims().to_vec(),
          actual: delta.dims().to_vec(),
        });
      }

      let delta = delta.to_dtype(base.dtype())?.affine(scaling, 0.0)?;
      let merged = base.add(&delta)?;
      debug!(module = %module, shape = ?merged.dims(), "Merged LoRA delta");

      weights.insert(key, merged);
      report.merged_modules += 1;
    }

    for (name, tensor) in &self.saved_tensors {
      weights.insert(name.clone(), tensor.clone());
      report.replaced_tensors += 1;
    }

    Ok(report)
  }
}

/// Maps a PEFT tensor name onto the base model tensor namespace
///
/// - `base_model.model.distilbert.transformer.layer.0.attention.q_lin.lora_A.default.weight`
///   → `distilbert.transformer.layer.0.attention.q_lin.lora_A.weight`
/// - `base_model.model.classifier.modules_to_save.default.weight` → `classifier.weight`
#[must_use]
pub fn normalize_tensor_name(name: &str) -> String {
  let name = name.strip_prefix(PEFT_PREFIX).unwrap_or(name);
  name
    .split('.')
    .filter(|segment| *segment != MODULES_TO_SAVE && *segment != ADAPTER_NAME)
    .collect::<Vec<_>>()
    .join(".")
}
