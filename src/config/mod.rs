// Configuration module for FlightSurety
// Ledger parameters, presets, validation and file/environment loading

pub mod presets;
pub mod validation;

use std::path::Path;

use log::{info, warn};
use thiserror::Error;

pub use presets::{ExcessFundingPolicy, RebuyPolicy, SimulationConfig, SuretyConfig};
pub use validation::{ConfigValidationError, ConfigValidator, ValidationResult};

/// Environment variable prefix; `FLIGHTSURETY__MIN_RESPONSES=5` overrides `min_responses`
pub const ENV_PREFIX: &str = "FLIGHTSURETY";

/// Errors raised while loading or validating a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to render configuration as TOML: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Invalid configuration:\n{0}")]
    Invalid(String),
}

/// Load a configuration from an optional TOML file with `FLIGHTSURETY__*`
/// environment overrides on top, then validate it.
pub fn load(path: Option<&Path>) -> Result<SuretyConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    if let Some(path) = path {
        info!("Loading configuration from {}", path.display());
        builder = builder.add_source(
            ::config::File::new(&path.to_string_lossy(), ::config::FileFormat::Toml).required(true),
        );
    }
    builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX).separator("__"));

    let config: SuretyConfig = builder.build()?.try_deserialize()?;
    validated(config)
}

/// Parse and validate a configuration held in a TOML string
pub fn from_toml_str(source: &str) -> Result<SuretyConfig, ConfigError> {
    let config: SuretyConfig = toml::from_str(source)?;
    validated(config)
}

pub fn to_toml_string(config: &SuretyConfig) -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(config)?)
}

fn validated(config: SuretyConfig) -> Result<SuretyConfig, ConfigError> {
    let result = ConfigValidator::new().validate(&config);
    if !result.is_valid {
        return Err(ConfigError::Invalid(result.get_summary()));
    }
    for warning in &result.warnings {
        warn!("{}", warning);
    }
    Ok(config)
}

#[cfg(test)]
mod tests;
