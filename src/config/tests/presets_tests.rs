use crate::config::presets::{ExcessFundingPolicy, RebuyPolicy, SuretyConfig};
use crate::consensus::ReportMode;
use crate::ledger::Amount;

#[test]
fn test_reference_preset_matches_scheme_parameters() {
    let config = SuretyConfig::reference();

    assert_eq!(config.airline_funding_fee, Amount::from_coins(10));
    assert_eq!(config.oracle_registration_fee, Amount::from_coins(1));
    assert_eq!(config.max_insurance_amount, Amount::from_coins(1));
    assert_eq!((config.payout_numerator, config.payout_denominator), (3, 2));
    assert_eq!(config.bootstrap_airline_count, 4);
    assert_eq!(config.min_responses, 3);
    assert_eq!(config.index_range, 10);
    assert_eq!(config.indices_per_oracle, 3);
    assert_eq!(config.rebuy_policy, RebuyPolicy::Replace);
    assert_eq!(config.excess_funding_policy, ExcessFundingPolicy::Retain);
}

#[test]
fn test_default_is_reference() {
    assert_eq!(SuretyConfig::default(), SuretyConfig::reference());
}

#[test]
fn test_local_devnet_covers_every_index() {
    let config = SuretyConfig::local_devnet();

    assert_eq!(usize::from(config.index_range), config.indices_per_oracle);
    assert_eq!(config.simulation.report_mode, ReportMode::LateAirline);
}
