//! Configuration Module
//!
//! Layered TOML configuration plus the district's own documents
//! (closure criteria text, settings YAML).

mod district;
mod loader;
mod types;

pub use district::{DistrictProfile, DistrictSettings};
pub use loader::ConfigLoader;
pub use types::{
    ChatConfig, Config, DistrictConfig, OutputConfig, RetryConfig, WeatherConfig,
};
