use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consensus::ReportMode;
use crate::ledger::Amount;

/// What happens when a passenger buys again on a key that already has an active policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuyPolicy {
    /// The new amount replaces the old one; the old premium is refunded to its payer
    #[default]
    Replace,
    /// The amounts add up; the total must stay within the per-policy cap
    Accumulate,
}

/// What happens to funds sent to `fund` above the funding fee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcessFundingPolicy {
    /// Excess is kept in the reserve
    #[default]
    Retain,
    /// Only the fee is collected; the caller keeps the rest
    Refund,
}

impl fmt::Display for RebuyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuyPolicy::Replace => write!(f, "replace"),
            RebuyPolicy::Accumulate => write!(f, "accumulate"),
        }
    }
}

/// Ledger parameters. Defaults are the reference values of the scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuretyConfig {
    /// Fee an airline pays before it can propose airlines or be insured against
    pub airline_funding_fee: Amount,
    /// Fee an oracle pays to receive its indices
    pub oracle_registration_fee: Amount,
    /// Maximum insured amount per (airline, flight, passenger)
    pub max_insurance_amount: Amount,
    /// Credit = premium * numerator / denominator
    pub payout_numerator: u64,
    pub payout_denominator: u64,
    /// Airlines admitted on a single proposal before voting kicks in
    pub bootstrap_airline_count: usize,
    /// Matching oracle responses needed to finalize a status request
    pub min_responses: usize,
    /// Indices are drawn from `[0, index_range)`
    pub index_range: u8,
    pub indices_per_oracle: usize,
    /// Seed mixed into every index draw
    pub rng_seed: u64,
    pub rebuy_policy: RebuyPolicy,
    pub excess_funding_policy: ExcessFundingPolicy,
    /// Buffered events per live subscriber
    pub event_capacity: usize,
    /// Most recent events kept in the in-memory journal
    pub journal_capacity: usize,
    pub simulation: SimulationConfig,
}

impl Default for SuretyConfig {
    fn default() -> Self {
        Self::reference()
    }
}

impl SuretyConfig {
    /// The reference parameters: 10 unit funding fee, 1 unit oracle fee, 1 unit cap,
    /// 1.5x payout, 4 bootstrap airlines, quorum of 3, 3 indices out of 10.
    pub fn reference() -> Self {
        Self {
            airline_funding_fee: Amount::from_coins(10),
            oracle_registration_fee: Amount::from_coins(1),
            max_insurance_amount: Amount::from_coins(1),
            payout_numerator: 3,
            payout_denominator: 2,
            bootstrap_airline_count: 4,
            min_responses: 3,
            index_range: 10,
            indices_per_oracle: 3,
            rng_seed: 0x5eed_f11e,
            rebuy_policy: RebuyPolicy::Replace,
            excess_funding_policy: ExcessFundingPolicy::Retain,
            event_capacity: 1024,
            journal_capacity: 16_384,
            simulation: SimulationConfig::default(),
        }
    }

    /// A local development ledger where every oracle holds every index,
    /// so any request is answered by the whole swarm.
    pub fn local_devnet() -> Self {
        Self {
            index_range: 3,
            simulation: SimulationConfig {
                oracles: 5,
                ..SimulationConfig::default()
            },
            ..Self::reference()
        }
    }
}

/// Parameters of the end-to-end simulation run by the node binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Oracle identities registered by the swarm
    pub oracles: usize,
    /// Airlines admitted (the first one is the founding airline)
    pub airlines: usize,
    /// Passengers insuring the simulated flight
    pub passengers: usize,
    pub flight: String,
    pub premium: Amount,
    /// Starting balance of every simulated account
    pub account_balance: Amount,
    pub report_mode: ReportMode,
    pub finalization_timeout_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            oracles: 20,
            airlines: 5,
            passengers: 3,
            flight: "FL100".to_string(),
            premium: Amount::from_coins(1),
            account_balance: Amount::from_coins(100),
            report_mode: ReportMode::LateAirline,
            finalization_timeout_ms: 5_000,
        }
    }
}
