use crate::config::presets::SuretyConfig;
use crate::config::validation::{ConfigValidationError, ConfigValidator};
use crate::ledger::Amount;

#[test]
fn test_validator_creation() {
    let validator = ConfigValidator::new();
    assert!(!validator.rules().is_empty(), "Validator should have default rules");
}

#[test]
fn test_presets_are_valid() {
    let validator = ConfigValidator::new();

    for config in [SuretyConfig::reference(), SuretyConfig::local_devnet()] {
        let result = validator.validate(&config);
        assert!(result.is_valid, "{}", result.get_summary());
        assert!(result.errors.is_empty());
    }
}

#[test]
fn test_zero_quorum_is_rejected() {
    let config = SuretyConfig {
        min_responses: 0,
        ..SuretyConfig::reference()
    };

    let result = ConfigValidator::new().validate(&config);

    assert!(!result.is_valid);
    assert!(matches!(result.errors[0], ConfigValidationError::InvalidValue(_)));
    assert!(result.suggested_fixes.contains_key("min_responses"));
}

#[test]
fn test_more_indices_than_range_is_rejected() {
    let config = SuretyConfig {
        index_range: 2,
        ..SuretyConfig::reference()
    };

    let result = ConfigValidator::new().validate(&config);

    assert!(!result.is_valid);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, ConfigValidationError::IncompatibleSettings(_))));
}

#[test]
fn test_payout_ratio_checks() {
    let validator = ConfigValidator::new();
    let zero_denominator = SuretyConfig {
        payout_denominator: 0,
        ..SuretyConfig::reference()
    };
    let below_premium = SuretyConfig {
        payout_numerator: 1,
        payout_denominator: 2,
        ..SuretyConfig::reference()
    };

    assert!(!validator.validate(&zero_denominator).is_valid);
    assert!(matches!(
        validator.validate(&below_premium).errors[0],
        ConfigValidationError::ValueOutOfRange(_)
    ));
}

#[test]
fn test_zero_cap_is_rejected() {
    let config = SuretyConfig {
        max_insurance_amount: Amount::ZERO,
        ..SuretyConfig::reference()
    };

    assert!(!ConfigValidator::new().validate(&config).is_valid);
}

#[test]
fn test_cap_whose_credit_overflows_is_rejected() {
    let config = SuretyConfig {
        max_insurance_amount: Amount::from_base_units(u128::MAX / 2),
        ..SuretyConfig::reference()
    };

    let result = ConfigValidator::new().validate(&config);

    assert!(!result.is_valid);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, ConfigValidationError::ValueOutOfRange(_))));
}

#[test]
fn test_empty_journal_is_rejected() {
    let config = SuretyConfig {
        journal_capacity: 0,
        ..SuretyConfig::reference()
    };

    assert!(!ConfigValidator::new().validate(&config).is_valid);
}

#[test]
fn test_small_swarm_produces_warning() {
    let mut config = SuretyConfig::reference();
    config.simulation.oracles = 4;

    let result = ConfigValidator::new().validate(&config);

    assert!(result.is_valid);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.get_summary().contains("Warnings (1)"));
}
