mod common;

use common::{airline, amount, coins, passenger, response, TestLedger, DEPARTURE, FLIGHT};
use flightsurety_core::consensus::FlightStatus;
use flightsurety_core::{ResponseOutcome, SuretyConfig, SuretyError, SuretyEvent};

/// Devnet ledger (every oracle holds every index) with an insured passenger
fn insured_devnet(oracles: usize) -> (TestLedger, Vec<flightsurety_core::Address>) {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::local_devnet(), 1);
    ledger.insure(passenger(1), coins(1));
    let oracles = ledger.register_oracles(oracles);
    (ledger, oracles)
}

#[test]
fn test_fetch_emits_oracle_request() {
    let (mut ledger, _) = insured_devnet(3);

    let key = ledger.request_status();

    assert!(key.index < 3);
    assert_eq!(
        ledger.surety.events().back(),
        Some(&SuretyEvent::OracleRequest {
            index: key.index,
            airline: airline(1),
            flight: FLIGHT.to_string(),
            timestamp: DEPARTURE,
        })
    );
}

#[test]
fn test_late_airline_quorum_credits_passengers() {
    let (mut ledger, oracles) = insured_devnet(4);
    let key = ledger.request_status();

    for oracle in &oracles[..2] {
        let outcome = ledger
            .surety
            .submit_oracle_response(&response(&key, *oracle, FlightStatus::LateAirline))
            .unwrap();
        assert!(matches!(outcome, ResponseOutcome::Recorded { .. }));
    }
    assert_eq!(
        ledger.surety.get_credit_amount(&airline(1), FLIGHT, &passenger(1)),
        coins(0)
    );

    let outcome = ledger
        .surety
        .submit_oracle_response(&response(&key, oracles[2], FlightStatus::LateAirline))
        .unwrap();
    match outcome {
        ResponseOutcome::Finalized { status, credited } => {
            assert_eq!(status, FlightStatus::LateAirline);
            assert_eq!(credited.len(), 1);
        }
        other => panic!("expected finalization, got {:?}", other),
    }
    assert_eq!(ledger.surety.flight_status(&key), Some(FlightStatus::LateAirline));
    assert_eq!(
        ledger.surety.get_credit_amount(&airline(1), FLIGHT, &passenger(1)),
        amount("1.5")
    );
    assert!(ledger.surety.is_solvent());

    let late = ledger
        .surety
        .submit_oracle_response(&response(&key, oracles[3], FlightStatus::OnTime));
    assert_eq!(
        late,
        Err(SuretyError::AlreadyFinalized {
            index: key.index,
            flight: FLIGHT.to_string(),
        })
    );
    assert_eq!(ledger.surety.flight_status(&key), Some(FlightStatus::LateAirline));
}

#[test]
fn test_on_time_quorum_credits_nobody() {
    let (mut ledger, oracles) = insured_devnet(3);
    let key = ledger.request_status();

    for oracle in &oracles {
        ledger
            .surety
            .submit_oracle_response(&response(&key, *oracle, FlightStatus::OnTime))
            .unwrap();
    }

    assert_eq!(ledger.surety.flight_status(&key), Some(FlightStatus::OnTime));
    assert_eq!(
        ledger.surety.get_credit_amount(&airline(1), FLIGHT, &passenger(1)),
        coins(0)
    );
    assert_eq!(ledger.surety.escrow_balance(), coins(1));
}

#[test]
fn test_finalization_announces_status_and_credits() {
    let (mut ledger, oracles) = insured_devnet(3);
    let key = ledger.request_status();

    for oracle in &oracles {
        ledger
            .surety
            .submit_oracle_response(&response(&key, *oracle, FlightStatus::LateAirline))
            .unwrap();
    }

    let events = ledger.surety.events();
    let reports = events
        .iter()
        .filter(|event| matches!(event, SuretyEvent::OracleReport { .. }))
        .count();
    assert_eq!(reports, 3);
    let tail: Vec<_> = events.range(events.len() - 2..).cloned().collect();
    assert_eq!(
        tail,
        vec![
            SuretyEvent::FlightStatusInfo {
                airline: airline(1),
                flight: FLIGHT.to_string(),
                timestamp: DEPARTURE,
                status: FlightStatus::LateAirline,
            },
            SuretyEvent::InsureeCredited {
                airline: airline(1),
                flight: FLIGHT.to_string(),
                passenger: passenger(1),
                amount: amount("1.5"),
            },
        ]
    );
}

#[test]
fn test_late_airline_finalizes_even_when_reserve_is_short() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::local_devnet(), 1);
    let insured: Vec<_> = (0..30).map(passenger).collect();
    for p in &insured {
        ledger.insure(*p, coins(1));
    }
    let oracles = ledger.register_oracles(3);
    let key = ledger.request_status();
    assert_eq!(ledger.surety.reserve_balance(), coins(13));

    for oracle in &oracles {
        ledger
            .surety
            .submit_oracle_response(&response(&key, *oracle, FlightStatus::LateAirline))
            .unwrap();
    }
    for oracle in &oracles {
        assert!(matches!(
            ledger
                .surety
                .submit_oracle_response(&response(&key, *oracle, FlightStatus::OnTime)),
            Err(SuretyError::AlreadyFinalized { .. })
        ));
    }

    assert_eq!(ledger.surety.flight_status(&key), Some(FlightStatus::LateAirline));
    for p in &insured {
        assert_eq!(ledger.surety.get_credit_amount(&airline(1), FLIGHT, p), amount("1.5"));
    }
    assert_eq!(ledger.surety.escrow_balance(), coins(30));
    assert_eq!(ledger.surety.reserve_shortfall(), Some(coins(2)));
    assert!(ledger.surety.is_solvent());
}

#[test]
fn test_short_reserve_defers_payouts_until_topped_up() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::local_devnet(), 1);
    let owner = ledger.owner;
    let insured: Vec<_> = (0..30).map(passenger).collect();
    for p in &insured {
        ledger.insure(*p, coins(1));
    }
    ledger.surety.credit(&owner, &airline(1), FLIGHT).unwrap();

    let paid = insured
        .iter()
        .filter(|p| ledger.surety.payout(&airline(1), FLIGHT, p).is_ok())
        .count();
    assert_eq!(paid, 20);
    assert_eq!(
        ledger.surety.payout(&airline(1), FLIGHT, &insured[29]),
        Err(SuretyError::InsufficientFunds {
            required: amount("0.5"),
            available: coins(0),
        })
    );
    assert_eq!(ledger.surety.get_credit_amount(&airline(1), FLIGHT, &insured[29]), amount("1.5"));
    assert!(ledger.surety.is_solvent());

    ledger.surety.register_airline(&airline(1), airline(2)).unwrap();
    ledger.fund_airline(2);
    for p in &insured[20..] {
        assert_eq!(ledger.surety.payout(&airline(1), FLIGHT, p), Ok(amount("1.5")));
    }
    assert_eq!(ledger.surety.escrow_balance(), coins(0));
    assert_eq!(ledger.surety.reserve_balance(), coins(5));
    assert_eq!(ledger.surety.reserve_shortfall(), Some(coins(0)));
}

#[test]
fn test_response_to_unopened_request_fails() {
    let (mut ledger, oracles) = insured_devnet(1);
    let key = ledger.request_status();
    let mut stray = response(&key, oracles[0], FlightStatus::OnTime);
    stray.timestamp += 1;

    assert_eq!(
        ledger.surety.submit_oracle_response(&stray),
        Err(SuretyError::RequestNotOpen {
            index: key.index,
            flight: FLIGHT.to_string(),
        })
    );
}

#[test]
fn test_indices_are_reproducible_for_a_seed() {
    let mut first = TestLedger::new(SuretyConfig::reference());
    let mut second = TestLedger::new(SuretyConfig::reference());

    let a = first.register_oracles(5);
    second.register_oracles(5);

    for oracle in &a {
        let indices = first.surety.get_my_indexes(oracle).unwrap();
        assert_eq!(indices.len(), 3);
        assert_eq!(Ok(indices), second.surety.get_my_indexes(oracle));
    }
}

#[test]
fn test_oracle_registration_is_announced() {
    let mut ledger = TestLedger::new(SuretyConfig::reference());
    let oracles = ledger.register_oracles(1);
    let indices = ledger.surety.get_my_indexes(&oracles[0]).unwrap();

    assert!(ledger.surety.is_oracle_registered(&oracles[0]));
    assert_eq!(
        ledger.surety.events().back(),
        Some(&SuretyEvent::OracleRegistered {
            oracle: oracles[0],
            indices,
        })
    );
}
