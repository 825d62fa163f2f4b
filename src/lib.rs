//! FlightSurety: flight-delay insurance ledger.
//!
//! Airlines join under multi-party admission, passengers insure flights,
//! and a swarm of oracles agrees on flight status. An airline-caused delay
//! credits every insured passenger of the flight with 1.5x their premium.

pub mod access;
pub mod airline;
pub mod config;
pub mod consensus;
pub mod errors;
pub mod insurance;
pub mod ledger;
pub mod simulation;
pub mod surety;
pub mod utils;

pub use access::AccessGate;
pub use airline::{AirlineRegistry, RegistrationOutcome};
pub use config::SuretyConfig;
pub use consensus::{FlightStatus, OracleConsensusEngine, OracleResponse, OracleSwarm, RequestKey, ResponseOutcome};
pub use errors::{SuretyError, SuretyResult};
pub use insurance::{InsuranceLedger, PolicyKey};
pub use ledger::{Address, Amount, SuretyEvent};
pub use surety::{FlightSurety, SharedSurety};
