use std::collections::{HashMap, HashSet};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::SuretyConfig;
use crate::consensus::indices::IndexGenerator;
use crate::consensus::status::FlightStatus;
use crate::errors::{SuretyError, SuretyResult};
use crate::insurance::CreditEntry;
use crate::ledger::{Address, Amount, Bank, Vault};

/// Receives the settlement trigger when a request finalizes with an
/// airline-caused delay. Any error aborts the finalizing response.
#[cfg_attr(test, mockall::automock)]
pub trait Settlement {
    fn settle(&mut self, airline: &Address, flight: &str) -> SuretyResult<Vec<CreditEntry>>;
}

/// Identifies one flight status request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
}

/// Lifecycle of a status request; requests open straight into `Collecting`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Collecting,
    Finalized(FlightStatus),
}

/// Responses gathered for one request
#[derive(Debug, Clone)]
pub struct FlightStatusRequest {
    requester: Address,
    responses: HashMap<FlightStatus, HashSet<Address>>,
    final_status: Option<FlightStatus>,
}

impl FlightStatusRequest {
    fn new(requester: Address) -> Self {
        Self {
            requester,
            responses: HashMap::new(),
            final_status: None,
        }
    }

    pub fn requester(&self) -> &Address {
        &self.requester
    }

    pub fn state(&self) -> RequestState {
        match self.final_status {
            Some(status) => RequestState::Finalized(status),
            None => RequestState::Collecting,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.final_status.is_some()
    }

    pub fn final_status(&self) -> Option<FlightStatus> {
        self.final_status
    }

    /// Distinct oracles that reported `status`
    pub fn tally(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map_or(0, HashSet::len)
    }

    fn has_reported(&self, status: FlightStatus, oracle: &Address) -> bool {
        self.responses
            .get(&status)
            .is_some_and(|reporters| reporters.contains(oracle))
    }
}

/// A registered oracle identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oracle {
    pub indices: Vec<u8>,
    /// Ledger sequence number at registration
    pub registered_at: u64,
}

/// One oracle's answer to a status request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleResponse {
    pub index: u8,
    pub airline: Address,
    pub flight: String,
    pub timestamp: u64,
    pub status: FlightStatus,
    pub submitter: Address,
}

impl OracleResponse {
    pub fn key(&self) -> RequestKey {
        RequestKey {
            index: self.index,
            airline: self.airline,
            flight: self.flight.clone(),
            timestamp: self.timestamp,
        }
    }
}

/// Result of an accepted oracle response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Response recorded; `tally` oracles now agree on its status
    Recorded { tally: usize },
    /// This response completed the quorum
    Finalized {
        status: FlightStatus,
        credited: Vec<CreditEntry>,
    },
}

/// Oracle registration, status request bookkeeping and response consensus
#[derive(Debug)]
pub struct OracleConsensusEngine {
    oracles: HashMap<Address, Oracle>,
    requests: HashMap<RequestKey, FlightStatusRequest>,
    generator: IndexGenerator,
    registration_fee: Amount,
    indices_per_oracle: usize,
    min_responses: usize,
}

impl OracleConsensusEngine {
    pub fn new(config: &SuretyConfig) -> Self {
        Self {
            oracles: HashMap::new(),
            requests: HashMap::new(),
            generator: IndexGenerator::new(config.rng_seed, config.index_range),
            registration_fee: config.oracle_registration_fee,
            indices_per_oracle: config.indices_per_oracle,
            min_responses: config.min_responses,
        }
    }

    pub fn min_responses(&self) -> usize {
        self.min_responses
    }

    /// Register `identity` for `fee` paid from its own balance into the reserve.
    /// Indices are derived from the identity and the current ledger sequence.
    pub fn register_oracle(
        &mut self,
        identity: Address,
        fee: Amount,
        bank: &mut Bank,
        sequence: u64,
    ) -> SuretyResult<&[u8]> {
        if self.oracles.contains_key(&identity) {
            return Err(SuretyError::AlreadyRegistered(identity));
        }
        if fee < self.registration_fee {
            return Err(SuretyError::InsufficientFunds {
                required: self.registration_fee,
                available: fee,
            });
        }
        bank.collect(&identity, fee, Vault::Reserve)?;

        let indices = self
            .generator
            .oracle_indices(&identity, sequence, self.indices_per_oracle);
        info!("Oracle {} registered with indices {:?}", identity, indices);

        let oracle = self.oracles.entry(identity).or_insert(Oracle {
            indices,
            registered_at: sequence,
        });
        Ok(&oracle.indices)
    }

    pub fn get_my_indexes(&self, identity: &Address) -> SuretyResult<&[u8]> {
        self.oracles
            .get(identity)
            .map(|oracle| oracle.indices.as_slice())
            .ok_or(SuretyError::NotRegistered(*identity))
    }

    pub fn is_registered(&self, identity: &Address) -> bool {
        self.oracles.contains_key(identity)
    }

    pub fn oracle_count(&self) -> usize {
        self.oracles.len()
    }

    /// Open a status request addressed to a freshly drawn index.
    ///
    /// Re-opening a key that is still collecting returns the same key with its
    /// tallies intact; a finalized key cannot be reopened.
    pub fn open_request(
        &mut self,
        requester: Address,
        airline: Address,
        flight: &str,
        timestamp: u64,
        sequence: u64,
    ) -> SuretyResult<RequestKey> {
        let key = RequestKey {
            index: self.generator.request_index(&requester, sequence),
            airline,
            flight: flight.to_string(),
            timestamp,
        };

        match self.requests.get(&key) {
            Some(request) if request.is_finalized() => Err(SuretyError::AlreadyFinalized {
                index: key.index,
                flight: key.flight,
            }),
            Some(_) => {
                debug!("Status request for {} at index {} is already open", flight, key.index);
                Ok(key)
            }
            None => {
                info!(
                    "Opened status request for airline {} flight {} at index {}",
                    airline, flight, key.index
                );
                self.requests
                    .insert(key.clone(), FlightStatusRequest::new(requester));
                Ok(key)
            }
        }
    }

    pub fn request(&self, key: &RequestKey) -> Option<&FlightStatusRequest> {
        self.requests.get(key)
    }

    /// Finalized status of a request, if it has reached quorum
    pub fn flight_status(&self, key: &RequestKey) -> Option<FlightStatus> {
        self.requests.get(key).and_then(FlightStatusRequest::final_status)
    }

    fn validate(&self, response: &OracleResponse) -> SuretyResult<&FlightStatusRequest> {
        let holds_index = self
            .oracles
            .get(&response.submitter)
            .is_some_and(|oracle| oracle.indices.contains(&response.index));
        if !holds_index {
            return Err(SuretyError::UnknownOracle(response.submitter));
        }

        let request = self
            .requests
            .get(&response.key())
            .ok_or_else(|| SuretyError::RequestNotOpen {
                index: response.index,
                flight: response.flight.clone(),
            })?;
        if request.is_finalized() {
            return Err(SuretyError::AlreadyFinalized {
                index: response.index,
                flight: response.flight.clone(),
            });
        }
        Ok(request)
    }

    /// Record a response and finalize the request once `min_responses` oracles agree.
    ///
    /// The first status to reach quorum wins. A `LateAirline` finalization calls
    /// `settlement` before anything is recorded, so a failed settlement rejects
    /// the response and leaves the request untouched.
    pub fn submit_response(
        &mut self,
        response: &OracleResponse,
        settlement: &mut dyn Settlement,
    ) -> SuretyResult<ResponseOutcome> {
        let request = self.validate(response)?;
        let already_counted = request.has_reported(response.status, &response.submitter);
        let tally = request.tally(response.status) + usize::from(!already_counted);
        let finalizes = tally >= self.min_responses;

        let credited = if finalizes && response.status.triggers_settlement() {
            settlement.settle(&response.airline, &response.flight)?
        } else {
            Vec::new()
        };

        let key = response.key();
        let request = self
            .requests
            .get_mut(&key)
            .ok_or_else(|| SuretyError::RequestNotOpen {
                index: key.index,
                flight: key.flight.clone(),
            })?;
        request
            .responses
            .entry(response.status)
            .or_default()
            .insert(response.submitter);

        if !finalizes {
            debug!(
                "Oracle {} reported {} for {} ({}/{})",
                response.submitter, response.status, response.flight, tally, self.min_responses
            );
            return Ok(ResponseOutcome::Recorded { tally });
        }

        request.final_status = Some(response.status);
        info!(
            "Flight {} of airline {} finalized as {} at index {}",
            response.flight, response.airline, response.status, response.index
        );
        Ok(ResponseOutcome::Finalized {
            status: response.status,
            credited,
        })
    }
}
