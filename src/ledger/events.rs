use std::collections::VecDeque;

use log::trace;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::consensus::FlightStatus;
use crate::ledger::{Address, Amount};

/// Events emitted by ledger operations.
///
/// `OracleRequest` is the one external collaborators must act on: oracle
/// operators answer it when `index` is one of their assigned indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SuretyEvent {
    OperatingStatusChanged {
        operational: bool,
    },
    AirlineVoted {
        candidate: Address,
        voter: Address,
        votes: usize,
        required: usize,
    },
    AirlineRegistered {
        airline: Address,
        sponsor: Address,
    },
    AirlineFunded {
        airline: Address,
        amount: Amount,
    },
    InsurancePurchased {
        airline: Address,
        flight: String,
        passenger: Address,
        amount: Amount,
    },
    InsureeCredited {
        airline: Address,
        flight: String,
        passenger: Address,
        amount: Amount,
    },
    PayoutSent {
        airline: Address,
        flight: String,
        passenger: Address,
        amount: Amount,
    },
    OracleRegistered {
        oracle: Address,
        indices: Vec<u8>,
    },
    OracleRequest {
        index: u8,
        airline: Address,
        flight: String,
        timestamp: u64,
    },
    OracleReport {
        airline: Address,
        flight: String,
        timestamp: u64,
        status: FlightStatus,
    },
    FlightStatusInfo {
        airline: Address,
        flight: String,
        timestamp: u64,
        status: FlightStatus,
    },
}

/// Fan-out for ledger events: a broadcast channel for live subscribers
/// (oracle workers) plus a bounded journal of the most recent events.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<SuretyEvent>,
    journal: VecDeque<SuretyEvent>,
    journal_capacity: usize,
}

impl EventBus {
    /// `capacity` is buffered per live subscriber; the journal keeps the
    /// latest `journal_capacity` events and drops the oldest beyond that.
    pub fn new(capacity: usize, journal_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        let journal_capacity = journal_capacity.max(1);
        Self {
            sender,
            journal: VecDeque::with_capacity(journal_capacity.min(1024)),
            journal_capacity,
        }
    }

    pub fn publish(&mut self, event: SuretyEvent) {
        // A send error only means nobody is listening right now
        if let Ok(receivers) = self.sender.send(event.clone()) {
            trace!("Event delivered to {} subscribers", receivers);
        }
        if self.journal.len() == self.journal_capacity {
            self.journal.pop_front();
        }
        self.journal.push_back(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SuretyEvent> {
        self.sender.subscribe()
    }

    /// Retained events, oldest first
    pub fn journal(&self) -> &VecDeque<SuretyEvent> {
        &self.journal
    }

    pub fn journal_capacity(&self) -> usize {
        self.journal_capacity
    }
}
