use std::collections::HashMap;

use log::{debug, error};
use thiserror::Error;

use crate::config::presets::SuretyConfig;

/// Error type for configuration validation issues
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Incompatible settings: {0}")]
    IncompatibleSettings(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),
}

/// Result of configuration validation
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub is_valid: bool,

    /// List of errors found during validation
    pub errors: Vec<ConfigValidationError>,

    /// List of warnings (valid but not recommended)
    pub warnings: Vec<String>,

    /// Suggested fixes for validation issues
    pub suggested_fixes: HashMap<String, String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            ..Self::default()
        }
    }

    pub fn add_error(&mut self, error: ConfigValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    pub fn add_suggested_fix(&mut self, setting: &str, suggestion: String) {
        self.suggested_fixes.insert(setting.to_string(), suggestion);
    }

    /// Return a summary of validation issues
    pub fn get_summary(&self) -> String {
        if self.is_valid && self.warnings.is_empty() {
            return "Configuration is valid with no warnings.".to_string();
        }

        let mut result = String::new();
        if !self.is_valid {
            result.push_str(&format!("Configuration has {} errors:\n", self.errors.len()));
            for (i, error) in self.errors.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, error));
            }
        } else {
            result.push_str("Configuration is valid but has warnings.\n");
        }

        if !self.warnings.is_empty() {
            result.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for (i, warning) in self.warnings.iter().enumerate() {
                result.push_str(&format!("  {}. {}\n", i + 1, warning));
            }
        }

        if !self.suggested_fixes.is_empty() {
            result.push_str("\nSuggested fixes:\n");
            for (setting, suggestion) in &self.suggested_fixes {
                result.push_str(&format!("  - {}: {}\n", setting, suggestion));
            }
        }

        result
    }
}

/// A single check applied to a ledger configuration
pub trait ValidationRule {
    fn name(&self) -> &str;

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError>;

    /// Setting name and suggested value for a failed check
    fn suggest_fix(&self, config: &SuretyConfig) -> Option<(String, String)>;
}

/// Quorum must be reachable and non-trivial
struct QuorumRule;

impl ValidationRule for QuorumRule {
    fn name(&self) -> &str {
        "quorum"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.min_responses == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "min_responses must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        Some(("min_responses".to_string(), "3".to_string()))
    }
}

/// Each oracle draws distinct indices, so the range must hold enough of them
struct IndexRangeRule;

impl ValidationRule for IndexRangeRule {
    fn name(&self) -> &str {
        "index_range"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.indices_per_oracle == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "indices_per_oracle must be at least 1".to_string(),
            ));
        }
        if config.indices_per_oracle > usize::from(config.index_range) {
            return Err(ConfigValidationError::IncompatibleSettings(format!(
                "indices_per_oracle ({}) exceeds index_range ({})",
                config.indices_per_oracle, config.index_range
            )));
        }
        Ok(())
    }

    fn suggest_fix(&self, config: &SuretyConfig) -> Option<(String, String)> {
        Some((
            "index_range".to_string(),
            config.indices_per_oracle.max(10).to_string(),
        ))
    }
}

/// Credit multiplier must be well-formed and never pay less than the premium
struct PayoutRatioRule;

impl ValidationRule for PayoutRatioRule {
    fn name(&self) -> &str {
        "payout_ratio"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.payout_denominator == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "payout_denominator must not be zero".to_string(),
            ));
        }
        if config.payout_numerator < config.payout_denominator {
            return Err(ConfigValidationError::ValueOutOfRange(format!(
                "payout ratio {}/{} pays out less than the premium",
                config.payout_numerator, config.payout_denominator
            )));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        Some(("payout_numerator / payout_denominator".to_string(), "3 / 2".to_string()))
    }
}

/// Fees and caps that make the ledger unusable
struct AmountsRule;

impl ValidationRule for AmountsRule {
    fn name(&self) -> &str {
        "amounts"
    }

    fn validate(&self, config: &SuretyConfig) -> Result<(), ConfigValidationError> {
        if config.max_insurance_amount.is_zero() {
            return Err(ConfigValidationError::InvalidValue(
                "max_insurance_amount must be greater than zero".to_string(),
            ));
        }
        let credit_cap = config.max_insurance_amount.checked_mul_ratio(
            u128::from(config.payout_numerator),
            u128::from(config.payout_denominator.max(1)),
        );
        if credit_cap.is_none() {
            return Err(ConfigValidationError::ValueOutOfRange(
                "max_insurance_amount times the payout ratio overflows".to_string(),
            ));
        }
        if config.bootstrap_airline_count == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "bootstrap_airline_count must be at least 1".to_string(),
            ));
        }
        if config.event_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        if config.journal_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "journal_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn suggest_fix(&self, _config: &SuretyConfig) -> Option<(String, String)> {
        None
    }
}

/// Configuration validator applying every rule to a ledger configuration
pub struct ConfigValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigValidator {
    /// Create a new configuration validator with default rules
    pub fn new() -> Self {
        let mut validator = Self { rules: Vec::new() };
        validator.add_rule(Box::new(QuorumRule));
        validator.add_rule(Box::new(IndexRangeRule));
        validator.add_rule(Box::new(PayoutRatioRule));
        validator.add_rule(Box::new(AmountsRule));
        validator
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Box<dyn ValidationRule>] {
        &self.rules
    }

    pub fn validate(&self, config: &SuretyConfig) -> ValidationResult {
        let mut result = ValidationResult::new();

        for rule in &self.rules {
            match rule.validate(config) {
                Ok(()) => debug!("Validation rule '{}' passed", rule.name()),
                Err(err) => {
                    error!("Validation rule '{}' failed: {}", rule.name(), err);
                    result.add_error(err);
                    if let Some((setting, suggestion)) = rule.suggest_fix(config) {
                        result.add_suggested_fix(&setting, suggestion);
                    }
                }
            }
        }

        // Expected responders per request: each oracle covers indices_per_oracle / index_range
        // of the requests, so a small swarm may never reach quorum.
        let sim = &config.simulation;
        if config.index_range > 0 {
            let expected = sim.oracles * config.indices_per_oracle / usize::from(config.index_range);
            if expected < config.min_responses {
                result.add_warning(format!(
                    "{} simulated oracles give about {} responders per request, below the quorum of {}",
                    sim.oracles, expected, config.min_responses
                ));
                result.add_suggested_fix(
                    "simulation.oracles",
                    (config.min_responses * usize::from(config.index_range) * 2
                        / config.indices_per_oracle.max(1))
                    .to_string(),
                );
            }
        }

        if sim.premium > config.max_insurance_amount {
            result.add_warning(format!(
                "Simulated premium {} exceeds the policy cap {}",
                sim.premium, config.max_insurance_amount
            ));
        }

        result
    }
}
