// In-process oracle swarm: one tokio task per oracle identity, answering
// the status requests addressed to its indices.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::consensus::oracle::{OracleResponse, RequestKey, ResponseOutcome};
use crate::consensus::status::FlightStatus;
use crate::errors::{SuretyError, SuretyResult};
use crate::ledger::{Address, SuretyEvent};
use crate::surety::SharedSurety;

const REPORT_DOMAIN: &[u8] = b"flightsurety/oracle-report";

/// Decides what an oracle reports for a request
#[cfg_attr(test, mockall::automock)]
pub trait StatusReporter: Send + Sync {
    fn report(&self, oracle: &Address, request: &RequestKey) -> FlightStatus;
}

/// Every oracle reports the same status
#[derive(Debug, Clone, Copy)]
pub struct FixedReporter(pub FlightStatus);

impl StatusReporter for FixedReporter {
    fn report(&self, _oracle: &Address, _request: &RequestKey) -> FlightStatus {
        self.0
    }
}

/// Each oracle picks a status at random, reproducibly: the draw depends only
/// on the seed, the oracle and the request.
#[derive(Debug, Clone, Copy)]
pub struct RandomReporter {
    seed: u64,
}

impl RandomReporter {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl StatusReporter for RandomReporter {
    fn report(&self, oracle: &Address, request: &RequestKey) -> FlightStatus {
        let mut hasher = Sha256::new();
        hasher.update(REPORT_DOMAIN);
        hasher.update(self.seed.to_be_bytes());
        hasher.update(oracle.as_bytes());
        hasher.update([request.index]);
        hasher.update(request.airline.as_bytes());
        hasher.update(request.flight.as_bytes());
        hasher.update(request.timestamp.to_be_bytes());
        let mut rng = ChaCha20Rng::from_seed(hasher.finalize().into());
        FlightStatus::ALL[rng.gen_range(0..FlightStatus::ALL.len())]
    }
}

/// How simulated oracles answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    Random,
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl ReportMode {
    pub fn fixed_status(self) -> Option<FlightStatus> {
        match self {
            ReportMode::Random => None,
            ReportMode::Unknown => Some(FlightStatus::Unknown),
            ReportMode::OnTime => Some(FlightStatus::OnTime),
            ReportMode::LateAirline => Some(FlightStatus::LateAirline),
            ReportMode::LateWeather => Some(FlightStatus::LateWeather),
            ReportMode::LateTechnical => Some(FlightStatus::LateTechnical),
            ReportMode::LateOther => Some(FlightStatus::LateOther),
        }
    }

    pub fn reporter(self, seed: u64) -> Arc<dyn StatusReporter> {
        match self.fixed_status() {
            Some(status) => Arc::new(FixedReporter(status)),
            None => Arc::new(RandomReporter::new(seed)),
        }
    }
}

/// A registered swarm member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwarmOracle {
    pub identity: Address,
    pub indices: Vec<u8>,
}

/// What one worker did before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub oracle: Option<Address>,
    /// Responses accepted by the ledger
    pub accepted: usize,
    /// Accepted responses that completed a quorum
    pub finalized: usize,
    /// Responses that arrived after the request had already finalized
    pub late: usize,
    pub rejected: usize,
}

/// Oracle identities registered on a ledger, plus their running workers
#[derive(Debug)]
pub struct OracleSwarm {
    oracles: Vec<SwarmOracle>,
    workers: Vec<JoinHandle<WorkerStats>>,
    shutdown: Option<watch::Sender<bool>>,
}

impl OracleSwarm {
    /// Deterministic identities `"{label}-0"`, `"{label}-1"`, ...
    pub fn identities(label: &str, count: usize) -> Vec<Address> {
        (0..count)
            .map(|n| Address::derive(&format!("{}-{}", label, n)))
            .collect()
    }

    /// Register every identity, each paying the oracle fee from its own balance
    pub fn register(surety: &SharedSurety, identities: Vec<Address>) -> SuretyResult<Self> {
        let fee = surety.read(|s| s.config().oracle_registration_fee);
        let mut oracles = Vec::with_capacity(identities.len());

        for identity in identities {
            let indices = surety.execute(|s| s.register_oracle(identity, fee))?;
            oracles.push(SwarmOracle { identity, indices });
        }
        info!("Registered {} oracles", oracles.len());

        Ok(Self {
            oracles,
            workers: Vec::new(),
            shutdown: None,
        })
    }

    pub fn oracles(&self) -> &[SwarmOracle] {
        &self.oracles
    }

    /// Members holding `index`
    pub fn responders(&self, index: u8) -> usize {
        self.oracles
            .iter()
            .filter(|oracle| oracle.indices.contains(&index))
            .count()
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Spawn one worker per oracle. Must be called from within a tokio runtime.
    /// Every worker subscribes before this returns, so requests emitted
    /// afterwards are seen by all of them.
    pub fn start(&mut self, surety: &SharedSurety, reporter: Arc<dyn StatusReporter>) {
        if self.is_running() {
            warn!("Oracle swarm already running");
            return;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        for oracle in &self.oracles {
            let events = surety.subscribe();
            let worker = Worker {
                oracle: oracle.clone(),
                surety: surety.clone(),
                reporter: Arc::clone(&reporter),
            };
            let shutdown = shutdown_rx.clone();
            self.workers
                .push(tokio::spawn(async move { worker.run(events, shutdown).await }));
        }

        self.shutdown = Some(shutdown_tx);
        info!("Oracle swarm started with {} workers", self.workers.len());
    }

    /// Stop every worker and collect what they did
    pub async fn shutdown(mut self) -> Vec<WorkerStats> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }

        let mut stats = Vec::with_capacity(self.workers.len());
        for result in join_all(self.workers.drain(..)).await {
            match result {
                Ok(worker_stats) => stats.push(worker_stats),
                Err(e) => warn!("Oracle worker failed: {}", e),
            }
        }
        info!("Oracle swarm stopped");
        stats
    }
}

struct Worker {
    oracle: SwarmOracle,
    surety: SharedSurety,
    reporter: Arc<dyn StatusReporter>,
}

impl Worker {
    async fn run(
        self,
        mut events: broadcast::Receiver<SuretyEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> WorkerStats {
        let mut stats = WorkerStats {
            oracle: Some(self.oracle.identity),
            ..WorkerStats::default()
        };

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                event = events.recv() => match event {
                    Ok(SuretyEvent::OracleRequest { index, airline, flight, timestamp }) => {
                        if self.oracle.indices.contains(&index) {
                            let request = RequestKey { index, airline, flight, timestamp };
                            self.answer(request, &mut stats);
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Oracle {} missed {} events", self.oracle.identity, skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
        stats
    }

    fn answer(&self, request: RequestKey, stats: &mut WorkerStats) {
        let status = self.reporter.report(&self.oracle.identity, &request);
        let response = OracleResponse {
            index: request.index,
            airline: request.airline,
            flight: request.flight,
            timestamp: request.timestamp,
            status,
            submitter: self.oracle.identity,
        };

        match self.surety.execute(|s| s.submit_oracle_response(&response)) {
            Ok(ResponseOutcome::Recorded { .. }) => stats.accepted += 1,
            Ok(ResponseOutcome::Finalized { .. }) => {
                stats.accepted += 1;
                stats.finalized += 1;
            }
            Err(SuretyError::AlreadyFinalized { .. }) => {
                debug!("Oracle {} answered after finalization", self.oracle.identity);
                stats.late += 1;
            }
            Err(e) => {
                warn!("Oracle {} response rejected: {}", self.oracle.identity, e);
                stats.rejected += 1;
            }
        }
    }
}

/// Wait until `request` is finalized, polling the ledger. `None` on timeout.
pub async fn await_finalization(
    surety: &SharedSurety,
    request: &RequestKey,
    timeout: Duration,
) -> Option<FlightStatus> {
    let poll = async {
        let mut ticker = tokio::time::interval(Duration::from_millis(10));
        loop {
            ticker.tick().await;
            if let Some(status) = surety.read(|s| s.flight_status(request)) {
                return status;
            }
        }
    };
    tokio::time::timeout(timeout, poll).await.ok()
}
