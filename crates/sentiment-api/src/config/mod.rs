//! Config module

mod constants;
mod env;

pub use constants::{
  DEFAULT_BIND_ADDR, ENV_ADAPTER_DIR, ENV_BASE_MODEL, ENV_BIND_ADDR, ENV_MAX_LENGTH,
};
pub use env::{Config, parse_max_length};
