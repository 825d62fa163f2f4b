use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::{ExcessFundingPolicy, SuretyConfig};
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::{Address, Amount, Bank, Vault};

/// Airline admission record. `funded` implies `registered`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Airline {
    pub registered: bool,
    pub funded: bool,
    /// Distinct registered-and-funded airlines that proposed this one
    pub votes: HashSet<Address>,
}

/// Result of a `register_airline` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RegistrationOutcome {
    Registered,
    /// Vote recorded; the candidate needs `required` distinct votes
    Pending { votes: usize, required: usize },
    AlreadyRegistered,
}

/// Airline lifecycle and multi-party admission
#[derive(Debug)]
pub struct AirlineRegistry {
    airlines: HashMap<Address, Airline>,
    registered_count: usize,
    funding_fee: Amount,
    bootstrap_count: usize,
    excess_policy: ExcessFundingPolicy,
}

impl AirlineRegistry {
    /// Create a registry with `founder` registered but not yet funded
    pub fn new(founder: Address, config: &SuretyConfig) -> Self {
        let mut airlines = HashMap::new();
        airlines.insert(
            founder,
            Airline {
                registered: true,
                ..Airline::default()
            },
        );
        info!("Founding airline {} registered", founder);

        Self {
            airlines,
            registered_count: 1,
            funding_fee: config.airline_funding_fee,
            bootstrap_count: config.bootstrap_airline_count,
            excess_policy: config.excess_funding_policy,
        }
    }

    pub fn funding_fee(&self) -> Amount {
        self.funding_fee
    }

    /// Votes needed once the registry is past the bootstrap phase: half of the
    /// registered airlines, rounded up
    pub fn required_votes(&self) -> usize {
        self.registered_count.div_ceil(2)
    }

    /// Propose `candidate` on behalf of `proposer`.
    ///
    /// While fewer than the bootstrap count are registered the candidate is
    /// admitted straight away. Afterwards each call adds one vote and the
    /// candidate is admitted once it holds `required_votes()` distinct votes.
    pub fn register_airline(
        &mut self,
        proposer: &Address,
        candidate: Address,
    ) -> SuretyResult<RegistrationOutcome> {
        if !(self.is_registered(proposer) && self.is_funded(proposer)) {
            return Err(SuretyError::Unauthorized(*proposer));
        }
        if self.is_registered(&candidate) {
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        if self.registered_count < self.bootstrap_count {
            self.admit(candidate);
            return Ok(RegistrationOutcome::Registered);
        }

        let required = self.required_votes();
        let entry = self.airlines.entry(candidate).or_default();
        entry.votes.insert(*proposer);
        let votes = entry.votes.len();

        if votes >= required {
            self.admit(candidate);
            return Ok(RegistrationOutcome::Registered);
        }

        debug!(
            "Airline {} voted for {} ({}/{})",
            proposer, candidate, votes, required
        );
        Ok(RegistrationOutcome::Pending { votes, required })
    }

    fn admit(&mut self, candidate: Address) {
        self.airlines.entry(candidate).or_default().registered = true;
        self.registered_count += 1;
        info!(
            "Airline {} registered ({} registered airlines)",
            candidate, self.registered_count
        );
    }

    /// Pay the funding fee for `airline` from `caller`'s balance into the reserve.
    /// Returns the amount actually collected.
    pub fn fund(
        &mut self,
        caller: &Address,
        airline: &Address,
        amount: Amount,
        bank: &mut Bank,
    ) -> SuretyResult<Amount> {
        if !self.is_registered(airline) {
            return Err(SuretyError::NotRegistered(*airline));
        }
        if amount < self.funding_fee {
            return Err(SuretyError::InsufficientFunds {
                required: self.funding_fee,
                available: amount,
            });
        }

        let collected = match self.excess_policy {
            ExcessFundingPolicy::Retain => amount,
            ExcessFundingPolicy::Refund => self.funding_fee,
        };
        bank.collect(caller, collected, Vault::Reserve)?;

        if let Some(record) = self.airlines.get_mut(airline) {
            record.funded = true;
        }
        info!("Airline {} funded with {} by {}", airline, collected, caller);
        Ok(collected)
    }

    /// Clear an airline's admission state, including the votes it cast for
    /// pending candidates. Funds already paid stay in the reserve.
    pub fn reset_airline(&mut self, airline: &Address) {
        if let Some(record) = self.airlines.remove(airline) {
            if record.registered {
                self.registered_count = self.registered_count.saturating_sub(1);
            }
            for pending in self.airlines.values_mut().filter(|a| !a.registered) {
                pending.votes.remove(airline);
            }
            info!("Airline {} reset", airline);
        }
    }

    pub fn is_registered(&self, airline: &Address) -> bool {
        self.airlines.get(airline).is_some_and(|a| a.registered)
    }

    pub fn is_funded(&self, airline: &Address) -> bool {
        self.airlines.get(airline).is_some_and(|a| a.funded)
    }

    pub fn registered_count(&self) -> usize {
        self.registered_count
    }

    pub fn airline(&self, airline: &Address) -> Option<&Airline> {
        self.airlines.get(airline)
    }

    pub fn airlines(&self) -> impl Iterator<Item = (&Address, &Airline)> {
        self.airlines.iter()
    }
}
