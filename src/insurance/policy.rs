use serde::{Deserialize, Serialize};

use crate::ledger::{Address, Amount};

/// Identifies a passenger's policy on one flight of one airline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyKey {
    pub airline: Address,
    pub flight: String,
    pub passenger: Address,
}

impl PolicyKey {
    pub fn new(airline: Address, flight: &str, passenger: Address) -> Self {
        Self {
            airline,
            flight: flight.to_string(),
            passenger,
        }
    }
}

/// Where a policy is in its settlement lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyState {
    /// Premium held in escrow, waiting on the flight outcome
    Active,
    /// Credit owed; premium still in escrow, the rest due from the reserve at payout
    Credited,
    /// Credit paid; nothing held
    PaidOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub insured_amount: Amount,
    /// Account that paid the premium; refunds go back here
    pub payer: Address,
    pub state: PolicyState,
}

/// A passenger credited by a settlement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditEntry {
    pub passenger: Address,
    pub amount: Amount,
}
