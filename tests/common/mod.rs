#![allow(dead_code)]

use flightsurety_core::{Address, Amount, FlightSurety, OracleResponse, RequestKey, SuretyConfig};
use flightsurety_core::consensus::FlightStatus;

pub const FLIGHT: &str = "FL100";
pub const DEPARTURE: u64 = 1_700_000_000;

pub fn airline(n: usize) -> Address {
    Address::derive(&format!("airline-{}", n))
}

pub fn passenger(n: usize) -> Address {
    Address::derive(&format!("passenger-{}", n))
}

pub fn oracle(n: usize) -> Address {
    Address::derive(&format!("oracle-{}", n))
}

/// Parse an exact decimal amount like "1.5"
pub fn amount(text: &str) -> Amount {
    text.parse().unwrap()
}

pub fn coins(whole: u64) -> Amount {
    Amount::from_coins(whole)
}

/// A ledger owned by "owner" with `airline(1)` as the founding airline
pub struct TestLedger {
    pub surety: FlightSurety,
    pub owner: Address,
}

impl TestLedger {
    pub fn new(config: SuretyConfig) -> Self {
        let owner = Address::derive("owner");
        Self {
            surety: FlightSurety::new(owner, airline(1), config),
            owner,
        }
    }

    /// Airlines 1..=count registered and funded
    pub fn with_funded_airlines(config: SuretyConfig, count: usize) -> Self {
        let mut ledger = Self::new(config);
        for n in 1..=count {
            if n > 1 {
                ledger.surety.register_airline(&airline(1), airline(n)).unwrap();
            }
            ledger.fund_airline(n);
        }
        ledger
    }

    pub fn give(&mut self, account: Address, amount: Amount) {
        self.surety.deposit(account, amount).unwrap();
    }

    pub fn fund_airline(&mut self, n: usize) {
        let fee = self.surety.config().airline_funding_fee;
        self.give(airline(n), fee);
        self.surety.fund(&airline(n), &airline(n), fee).unwrap();
    }

    /// Register oracles 0..count, each paying the fee from a fresh deposit
    pub fn register_oracles(&mut self, count: usize) -> Vec<Address> {
        let fee = self.surety.config().oracle_registration_fee;
        (0..count)
            .map(|n| {
                self.give(oracle(n), fee);
                self.surety.register_oracle(oracle(n), fee).unwrap();
                oracle(n)
            })
            .collect()
    }

    pub fn insure(&mut self, who: Address, premium: Amount) {
        self.give(who, premium);
        self.surety.buy(&who, airline(1), FLIGHT, who, premium).unwrap();
    }

    pub fn request_status(&mut self) -> RequestKey {
        let owner = self.owner;
        self.surety
            .fetch_flight_status(&owner, airline(1), FLIGHT, DEPARTURE)
            .unwrap()
    }
}

pub fn response(key: &RequestKey, submitter: Address, status: FlightStatus) -> OracleResponse {
    OracleResponse {
        index: key.index,
        airline: key.airline,
        flight: key.flight.clone(),
        timestamp: key.timestamp,
        status,
        submitter,
    }
}
