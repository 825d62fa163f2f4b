// The FlightSurety store: every caller-facing operation over the four
// ledger components, the bank and the event stream.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::access::AccessGate;
use crate::airline::{AirlineRegistry, RegistrationOutcome};
use crate::config::SuretyConfig;
use crate::consensus::{
    FlightStatus, FlightStatusRequest, OracleConsensusEngine, OracleResponse, RequestKey,
    ResponseOutcome, Settlement,
};
use crate::errors::SuretyResult;
use crate::insurance::{CreditEntry, InsuranceLedger, PolicyKey};
use crate::ledger::{Address, Amount, Bank, EventBus, SuretyEvent, Vault};

/// Routes a `LateAirline` finalization into the insurance ledger
struct LedgerSettlement<'a> {
    insurance: &'a mut InsuranceLedger,
}

impl Settlement for LedgerSettlement<'_> {
    fn settle(&mut self, airline: &Address, flight: &str) -> SuretyResult<Vec<CreditEntry>> {
        self.insurance.credit(airline, flight)
    }
}

/// The whole ledger state. Each method runs to completion and either
/// applies all of its effects or returns an error having changed nothing.
#[derive(Debug)]
pub struct FlightSurety {
    config: SuretyConfig,
    gate: AccessGate,
    airlines: AirlineRegistry,
    insurance: InsuranceLedger,
    oracles: OracleConsensusEngine,
    bank: Bank,
    events: EventBus,
    /// Count of applied mutations; mixed into every index draw
    sequence: u64,
}

impl FlightSurety {
    /// New ledger administered by `owner`, with `founding_airline`
    /// registered but not yet funded
    pub fn new(owner: Address, founding_airline: Address, config: SuretyConfig) -> Self {
        info!(
            "Starting FlightSurety ledger (owner {}, founding airline {})",
            owner, founding_airline
        );
        Self {
            gate: AccessGate::new(owner),
            airlines: AirlineRegistry::new(founding_airline, &config),
            insurance: InsuranceLedger::new(&config),
            oracles: OracleConsensusEngine::new(&config),
            bank: Bank::new(),
            events: EventBus::new(config.event_capacity, config.journal_capacity),
            sequence: 0,
            config,
        }
    }

    fn commit(&mut self) {
        self.sequence += 1;
    }

    fn emit(&mut self, event: SuretyEvent) {
        self.events.publish(event);
    }

    pub fn config(&self) -> &SuretyConfig {
        &self.config
    }

    pub fn owner(&self) -> &Address {
        self.gate.owner()
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    // Operational control

    pub fn is_operational(&self) -> bool {
        self.gate.is_operational()
    }

    pub fn set_operating_status(&mut self, caller: &Address, operational: bool) -> SuretyResult<()> {
        if self.gate.set_operating_status(caller, operational)? {
            self.emit(SuretyEvent::OperatingStatusChanged { operational });
            self.commit();
        }
        Ok(())
    }

    // Airlines

    pub fn register_airline(
        &mut self,
        caller: &Address,
        candidate: Address,
    ) -> SuretyResult<RegistrationOutcome> {
        self.gate.require_operational()?;
        let outcome = self.airlines.register_airline(caller, candidate)?;
        match outcome {
            RegistrationOutcome::Registered => {
                self.emit(SuretyEvent::AirlineRegistered {
                    airline: candidate,
                    sponsor: *caller,
                });
            }
            RegistrationOutcome::Pending { votes, required } => {
                self.emit(SuretyEvent::AirlineVoted {
                    candidate,
                    voter: *caller,
                    votes,
                    required,
                });
            }
            RegistrationOutcome::AlreadyRegistered => return Ok(outcome),
        }
        self.commit();
        Ok(outcome)
    }

    pub fn fund(&mut self, caller: &Address, airline: &Address, amount: Amount) -> SuretyResult<Amount> {
        self.gate.require_operational()?;
        let collected = self.airlines.fund(caller, airline, amount, &mut self.bank)?;
        self.emit(SuretyEvent::AirlineFunded {
            airline: *airline,
            amount: collected,
        });
        self.commit();
        Ok(collected)
    }

    pub fn is_registered(&self, airline: &Address) -> bool {
        self.airlines.is_registered(airline)
    }

    pub fn is_airline_funded(&self, airline: &Address) -> bool {
        self.airlines.is_funded(airline)
    }

    pub fn registered_airline_count(&self) -> usize {
        self.airlines.registered_count()
    }

    pub fn airlines(&self) -> &AirlineRegistry {
        &self.airlines
    }

    /// Ops tooling: clear an airline's admission state (owner only)
    pub fn reset_airline(&mut self, caller: &Address, airline: &Address) -> SuretyResult<()> {
        self.gate.require_operational()?;
        self.gate.require_owner(caller)?;
        self.airlines.reset_airline(airline);
        self.commit();
        Ok(())
    }

    // Insurance

    pub fn buy(
        &mut self,
        caller: &Address,
        airline: Address,
        flight: &str,
        passenger: Address,
        amount: Amount,
    ) -> SuretyResult<Amount> {
        self.gate.require_operational()?;
        let key = PolicyKey::new(airline, flight, passenger);
        let insured = self
            .insurance
            .buy(caller, key, amount, &self.airlines, &mut self.bank)?;
        self.emit(SuretyEvent::InsurancePurchased {
            airline,
            flight: flight.to_string(),
            passenger,
            amount: insured,
        });
        self.commit();
        Ok(insured)
    }

    /// Credit every insured passenger of a flight (owner only).
    /// Returns how many policies were credited by this call.
    pub fn credit(&mut self, caller: &Address, airline: &Address, flight: &str) -> SuretyResult<usize> {
        self.gate.require_operational()?;
        self.gate.require_owner(caller)?;
        let credited = self.insurance.credit(airline, flight)?;
        let count = credited.len();
        self.emit_credits(airline, flight, credited);
        self.commit();
        Ok(count)
    }

    fn emit_credits(&mut self, airline: &Address, flight: &str, credited: Vec<CreditEntry>) {
        for entry in credited {
            self.emit(SuretyEvent::InsureeCredited {
                airline: *airline,
                flight: flight.to_string(),
                passenger: entry.passenger,
                amount: entry.amount,
            });
        }
    }

    /// Pay a passenger's full credit: the premium from escrow, the rest from
    /// the reserve. Fails `InsufficientFunds` while the reserve is short.
    pub fn payout(&mut self, airline: &Address, flight: &str, passenger: &Address) -> SuretyResult<Amount> {
        self.gate.require_operational()?;
        let key = PolicyKey::new(*airline, flight, *passenger);
        let paid = self.insurance.payout(&key, &mut self.bank)?;
        self.emit(SuretyEvent::PayoutSent {
            airline: *airline,
            flight: flight.to_string(),
            passenger: *passenger,
            amount: paid,
        });
        self.commit();
        Ok(paid)
    }

    /// Passenger-initiated payout of the caller's own credit
    pub fn claim(&mut self, caller: &Address, airline: &Address, flight: &str) -> SuretyResult<Amount> {
        self.payout(airline, flight, caller)
    }

    pub fn get_insurance_amount(&self, airline: &Address, flight: &str, passenger: &Address) -> Amount {
        self.insurance
            .insurance_amount(&PolicyKey::new(*airline, flight, *passenger))
    }

    pub fn get_credit_amount(&self, airline: &Address, flight: &str, passenger: &Address) -> Amount {
        self.insurance
            .credit_amount(&PolicyKey::new(*airline, flight, *passenger))
    }

    pub fn get_payout_amount(&self, airline: &Address, flight: &str, passenger: &Address) -> Amount {
        self.insurance
            .payout_amount(&PolicyKey::new(*airline, flight, *passenger))
    }

    pub fn insurance(&self) -> &InsuranceLedger {
        &self.insurance
    }

    /// Ops tooling: drop a policy and refund what escrow holds for it (owner only)
    pub fn reset_policy(
        &mut self,
        caller: &Address,
        airline: &Address,
        flight: &str,
        passenger: &Address,
    ) -> SuretyResult<Amount> {
        self.gate.require_operational()?;
        self.gate.require_owner(caller)?;
        let key = PolicyKey::new(*airline, flight, *passenger);
        let refunded = self.insurance.reset_policy(&key, &mut self.bank)?;
        self.commit();
        Ok(refunded)
    }

    // Oracles

    pub fn register_oracle(&mut self, identity: Address, fee: Amount) -> SuretyResult<Vec<u8>> {
        self.gate.require_operational()?;
        let indices = self
            .oracles
            .register_oracle(identity, fee, &mut self.bank, self.sequence)?
            .to_vec();
        self.emit(SuretyEvent::OracleRegistered {
            oracle: identity,
            indices: indices.clone(),
        });
        self.commit();
        Ok(indices)
    }

    pub fn get_my_indexes(&self, identity: &Address) -> SuretyResult<Vec<u8>> {
        self.oracles.get_my_indexes(identity).map(<[u8]>::to_vec)
    }

    pub fn is_oracle_registered(&self, identity: &Address) -> bool {
        self.oracles.is_registered(identity)
    }

    pub fn oracle_count(&self) -> usize {
        self.oracles.oracle_count()
    }

    /// Open a status request and announce it to the oracles
    pub fn fetch_flight_status(
        &mut self,
        caller: &Address,
        airline: Address,
        flight: &str,
        timestamp: u64,
    ) -> SuretyResult<RequestKey> {
        self.gate.require_operational()?;
        let key = self
            .oracles
            .open_request(*caller, airline, flight, timestamp, self.sequence)?;
        self.emit(SuretyEvent::OracleRequest {
            index: key.index,
            airline,
            flight: flight.to_string(),
            timestamp,
        });
        self.commit();
        Ok(key)
    }

    /// Record an oracle's answer. A `LateAirline` quorum credits the flight's
    /// passengers in the same call; if that fails the response is rejected.
    pub fn submit_oracle_response(&mut self, response: &OracleResponse) -> SuretyResult<ResponseOutcome> {
        self.gate.require_operational()?;
        let mut settlement = LedgerSettlement {
            insurance: &mut self.insurance,
        };
        let outcome = self.oracles.submit_response(response, &mut settlement)?;

        self.emit(SuretyEvent::OracleReport {
            airline: response.airline,
            flight: response.flight.clone(),
            timestamp: response.timestamp,
            status: response.status,
        });
        if let ResponseOutcome::Finalized { status, credited } = &outcome {
            self.emit(SuretyEvent::FlightStatusInfo {
                airline: response.airline,
                flight: response.flight.clone(),
                timestamp: response.timestamp,
                status: *status,
            });
            self.emit_credits(&response.airline, &response.flight, credited.clone());
        }
        self.commit();
        Ok(outcome)
    }

    /// Same as `submit_oracle_response` with the status given as its raw code
    pub fn submit_oracle_response_code(
        &mut self,
        index: u8,
        airline: Address,
        flight: &str,
        timestamp: u64,
        status_code: u8,
        submitter: Address,
    ) -> SuretyResult<ResponseOutcome> {
        let status = FlightStatus::try_from(status_code)?;
        self.submit_oracle_response(&OracleResponse {
            index,
            airline,
            flight: flight.to_string(),
            timestamp,
            status,
            submitter,
        })
    }

    pub fn flight_status(&self, key: &RequestKey) -> Option<FlightStatus> {
        self.oracles.flight_status(key)
    }

    pub fn request(&self, key: &RequestKey) -> Option<&FlightStatusRequest> {
        self.oracles.request(key)
    }

    // Currency

    /// Host faucet: credit an external account with native currency
    pub fn deposit(&mut self, account: Address, amount: Amount) -> SuretyResult<Amount> {
        let balance = self.bank.deposit(account, amount)?;
        debug!("Deposited {} to {}", amount, account);
        self.commit();
        Ok(balance)
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.bank.balance_of(account)
    }

    pub fn escrow_balance(&self) -> Amount {
        self.bank.vault_balance(Vault::Escrow)
    }

    pub fn reserve_balance(&self) -> Amount {
        self.bank.vault_balance(Vault::Reserve)
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    /// Escrow holds exactly what the policy book says it should
    pub fn is_solvent(&self) -> bool {
        self.insurance.is_solvent(&self.bank)
    }

    /// Credit owed by the reserve beyond what it currently holds
    pub fn reserve_shortfall(&self) -> Option<Amount> {
        self.insurance.reserve_shortfall(&self.bank)
    }

    // Events

    /// Most recent events, oldest first (bounded by `journal_capacity`)
    pub fn events(&self) -> &VecDeque<SuretyEvent> {
        self.events.journal()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuretyEvent> {
        self.events.subscribe()
    }
}

/// A `FlightSurety` shared between async tasks. Every call holds the lock for
/// its whole duration, so operations never interleave.
#[derive(Debug, Clone)]
pub struct SharedSurety {
    inner: Arc<Mutex<FlightSurety>>,
}

impl SharedSurety {
    pub fn new(surety: FlightSurety) -> Self {
        Self {
            inner: Arc::new(Mutex::new(surety)),
        }
    }

    /// Run a mutating operation
    pub fn execute<R>(&self, operation: impl FnOnce(&mut FlightSurety) -> R) -> R {
        operation(&mut self.inner.lock())
    }

    pub fn read<R>(&self, query: impl FnOnce(&FlightSurety) -> R) -> R {
        query(&self.inner.lock())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuretyEvent> {
        self.inner.lock().subscribe()
    }
}
