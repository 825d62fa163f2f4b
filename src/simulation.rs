// End-to-end run of the scheme against an in-process oracle swarm:
// admit and fund airlines, insure passengers, request a flight status,
// let the swarm agree on it, and pay out whatever was credited.

use std::time::Duration;

use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::airline::RegistrationOutcome;
use crate::config::SuretyConfig;
use crate::consensus::{await_finalization, FlightStatus, OracleSwarm, RequestKey, WorkerStats};
use crate::errors::SuretyError;
use crate::ledger::{Address, Amount, SuretyEvent};
use crate::surety::{FlightSurety, SharedSurety};
use crate::utils::{current_time, format_timestamp};

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Ledger(#[from] SuretyError),

    #[error("Airline {0} could not gather enough votes to register")]
    AdmissionStalled(Address),

    #[error("Flight {flight} was not finalized within {timeout_ms} ms")]
    Timeout { flight: String, timeout_ms: u64 },
}

/// One passenger's result
#[derive(Debug, Clone, Serialize)]
pub struct PassengerOutcome {
    pub passenger: Address,
    pub insured: Amount,
    pub paid: Amount,
    pub balance: Amount,
}

/// Everything a simulation run produced
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub flight: String,
    pub airline: Address,
    pub request: RequestKey,
    pub status: FlightStatus,
    pub airlines_registered: usize,
    pub oracles: usize,
    /// Oracles holding the request's index
    pub responders: usize,
    pub workers: Vec<WorkerStats>,
    pub passengers: Vec<PassengerOutcome>,
    pub escrow: Amount,
    pub reserve: Amount,
    pub solvent: bool,
    pub events: Vec<SuretyEvent>,
}

/// Fixed identities used by the simulation
pub struct Cast {
    pub owner: Address,
    pub airlines: Vec<Address>,
    pub passengers: Vec<Address>,
    pub oracles: Vec<Address>,
}

impl Cast {
    pub fn new(config: &SuretyConfig) -> Self {
        let sim = &config.simulation;
        Self {
            owner: Address::derive("owner"),
            airlines: (0..sim.airlines.max(1))
                .map(|n| Address::derive(&format!("airline-{}", n)))
                .collect(),
            passengers: (0..sim.passengers)
                .map(|n| Address::derive(&format!("passenger-{}", n)))
                .collect(),
            oracles: OracleSwarm::identities("oracle", sim.oracles),
        }
    }

    pub fn founder(&self) -> Address {
        self.airlines[0]
    }
}

/// Give every simulated account its starting balance and each oracle its fee
fn fund_accounts(surety: &mut FlightSurety, cast: &Cast) -> Result<(), SimulationError> {
    let balance = surety.config().simulation.account_balance;
    let oracle_fee = surety.config().oracle_registration_fee;
    for account in cast.airlines.iter().chain(&cast.passengers) {
        surety.deposit(*account, balance)?;
    }
    for oracle in &cast.oracles {
        surety.deposit(*oracle, oracle_fee)?;
    }
    Ok(())
}

/// Fund the founder, then admit and fund every other airline, collecting
/// votes from already funded airlines once past the bootstrap phase
fn admit_airlines(surety: &mut FlightSurety, cast: &Cast) -> Result<(), SimulationError> {
    let fee = surety.config().airline_funding_fee;
    let founder = cast.founder();
    surety.fund(&founder, &founder, fee)?;

    for (position, candidate) in cast.airlines.iter().enumerate().skip(1) {
        let mut registered = false;
        for proposer in &cast.airlines[..position] {
            match surety.register_airline(proposer, *candidate)? {
                RegistrationOutcome::Registered | RegistrationOutcome::AlreadyRegistered => {
                    registered = true;
                    break;
                }
                RegistrationOutcome::Pending { .. } => {}
            }
        }
        if !registered {
            return Err(SimulationError::AdmissionStalled(*candidate));
        }
        surety.fund(candidate, candidate, fee)?;
    }
    info!("{} airlines registered and funded", surety.registered_airline_count());
    Ok(())
}

/// Run the whole scenario. Must be called from within a tokio runtime.
pub async fn run(config: SuretyConfig) -> Result<SimulationReport, SimulationError> {
    let cast = Cast::new(&config);
    let sim = config.simulation.clone();
    let seed = config.rng_seed;
    let airline = cast.founder();

    let mut surety = FlightSurety::new(cast.owner, airline, config);
    fund_accounts(&mut surety, &cast)?;
    admit_airlines(&mut surety, &cast)?;
    for passenger in &cast.passengers {
        surety.buy(passenger, airline, &sim.flight, *passenger, sim.premium)?;
    }

    let surety = SharedSurety::new(surety);
    let mut swarm = OracleSwarm::register(&surety, cast.oracles.clone())?;
    swarm.start(&surety, sim.report_mode.reporter(seed));

    let timestamp = current_time();
    let request = match surety.execute(|s| s.fetch_flight_status(&cast.owner, airline, &sim.flight, timestamp)) {
        Ok(request) => request,
        Err(e) => {
            swarm.shutdown().await;
            return Err(e.into());
        }
    };
    let responders = swarm.responders(request.index);
    info!(
        "Requested status of {} departing {} at index {} ({} oracles hold it)",
        sim.flight,
        format_timestamp(timestamp),
        request.index,
        responders
    );

    let timeout = Duration::from_millis(sim.finalization_timeout_ms);
    let status = await_finalization(&surety, &request, timeout).await;
    let workers = swarm.shutdown().await;
    let Some(status) = status else {
        warn!("No quorum for {} at index {}", sim.flight, request.index);
        return Err(SimulationError::Timeout {
            flight: sim.flight,
            timeout_ms: sim.finalization_timeout_ms,
        });
    };

    let passengers = surety.execute(|s| settle_passengers(s, &cast, airline, &sim.flight))?;

    Ok(surety.read(|s| SimulationReport {
        flight: sim.flight.clone(),
        airline,
        request,
        status,
        airlines_registered: s.registered_airline_count(),
        oracles: s.oracle_count(),
        responders,
        workers,
        passengers,
        escrow: s.escrow_balance(),
        reserve: s.reserve_balance(),
        solvent: s.is_solvent(),
        events: s.events().iter().cloned().collect(),
    }))
}

/// Every credited passenger claims their payout
fn settle_passengers(
    surety: &mut FlightSurety,
    cast: &Cast,
    airline: Address,
    flight: &str,
) -> Result<Vec<PassengerOutcome>, SimulationError> {
    let mut outcomes = Vec::with_capacity(cast.passengers.len());
    for passenger in &cast.passengers {
        let insured = surety.get_insurance_amount(&airline, flight, passenger);
        let paid = if surety.get_credit_amount(&airline, flight, passenger).is_zero() {
            Amount::ZERO
        } else {
            match surety.claim(passenger, &airline, flight) {
                Ok(paid) => paid,
                Err(SuretyError::InsufficientFunds { required, available }) => {
                    warn!(
                        "Reserve holds {} of the {} owed to {}; credit stays claimable",
                        available, required, passenger
                    );
                    Amount::ZERO
                }
                Err(err) => return Err(err.into()),
            }
        };
        outcomes.push(PassengerOutcome {
            passenger: *passenger,
            insured,
            paid,
            balance: surety.balance_of(passenger),
        });
    }
    Ok(outcomes)
}
