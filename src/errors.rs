use thiserror::Error;

use crate::ledger::{Address, Amount};

/// Errors returned by the FlightSurety ledger operations.
///
/// Every error is raised before any state is touched, so a failed call
/// leaves the ledger exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SuretyError {
    #[error("Caller {0} is not authorized for this operation")]
    Unauthorized(Address),

    #[error("Contract is not operational")]
    NotOperational,

    #[error("{0} is not registered")]
    NotRegistered(Address),

    #[error("Airline {0} has not paid the funding fee")]
    NotFunded(Address),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Invalid insurance amount {amount}: must be greater than zero and at most {cap}")]
    InvalidAmount { amount: Amount, cap: Amount },

    #[error("No credit available for passenger {0}")]
    NoCredit(Address),

    #[error("Oracle {0} is unknown or does not hold the requested index")]
    UnknownOracle(Address),

    #[error("No open flight status request for flight {flight} at index {index}")]
    RequestNotOpen { index: u8, flight: String },

    #[error("Flight status request for {flight} at index {index} is already finalized")]
    AlreadyFinalized { index: u8, flight: String },

    #[error("{0} is already registered")]
    AlreadyRegistered(Address),

    #[error("Passenger {0} has an unpaid credit on this flight")]
    CreditOutstanding(Address),

    #[error("Invalid flight status code: {0}")]
    InvalidStatusCode(u8),

    #[error("Amount arithmetic overflow")]
    AmountOverflow,
}

/// Result type used across the ledger components
pub type SuretyResult<T> = Result<T, SuretyError>;
