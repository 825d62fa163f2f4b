use std::io::Write;

use crate::config::{self, ConfigError, RebuyPolicy, SuretyConfig};
use crate::ledger::Amount;

#[test]
fn test_toml_round_trip_of_reference() {
    let rendered = config::to_toml_string(&SuretyConfig::reference()).unwrap();
    let parsed = config::from_toml_str(&rendered).unwrap();

    assert_eq!(parsed, SuretyConfig::reference());
    assert!(rendered.contains("airline_funding_fee = \"10\""));
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let parsed = config::from_toml_str(
        r#"
        min_responses = 5
        max_insurance_amount = "0.5"
        rebuy_policy = "accumulate"

        [simulation]
        oracles = 40
        "#,
    )
    .unwrap();

    assert_eq!(parsed.min_responses, 5);
    assert_eq!(parsed.max_insurance_amount, "0.5".parse::<Amount>().unwrap());
    assert_eq!(parsed.rebuy_policy, RebuyPolicy::Accumulate);
    assert_eq!(parsed.simulation.oracles, 40);
    assert_eq!(parsed.airline_funding_fee, Amount::from_coins(10));
    assert_eq!(parsed.simulation.flight, "FL100");
}

#[test]
fn test_invalid_toml_values_are_reported() {
    let err = config::from_toml_str("indices_per_oracle = 0").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let err = config::from_toml_str("min_responses = \"three\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "index_range = 12").unwrap();
    writeln!(file, "oracle_registration_fee = \"2\"").unwrap();

    let loaded = config::load(Some(file.path())).unwrap();

    assert_eq!(loaded.index_range, 12);
    assert_eq!(loaded.oracle_registration_fee, Amount::from_coins(2));
    assert_eq!(loaded.min_responses, 3);
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");

    assert!(matches!(
        config::load(Some(&missing)),
        Err(ConfigError::Load(_))
    ));
}
