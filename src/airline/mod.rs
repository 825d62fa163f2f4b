// Airline admission: bootstrap registration, multi-party voting and funding

pub mod registry;

pub use registry::{Airline, AirlineRegistry, RegistrationOutcome};
