// Passenger insurance: policies, credit on airline-caused delay, payouts

pub mod ledger;
pub mod policy;

pub use ledger::{CreditPlan, InsuranceLedger};
pub use policy::{CreditEntry, InsurancePolicy, PolicyKey, PolicyState};
