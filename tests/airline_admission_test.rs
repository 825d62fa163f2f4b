mod common;

use common::{airline, coins, TestLedger};
use flightsurety_core::{RegistrationOutcome, SuretyConfig, SuretyError, SuretyEvent};

#[test]
fn test_fifth_airline_needs_two_distinct_votes() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::reference(), 4);
    for n in 1..=4 {
        assert!(ledger.surety.is_registered(&airline(n)));
        assert!(ledger.surety.is_airline_funded(&airline(n)));
    }

    let first = ledger.surety.register_airline(&airline(1), airline(5)).unwrap();
    assert_eq!(first, RegistrationOutcome::Pending { votes: 1, required: 2 });
    assert!(!ledger.surety.is_registered(&airline(5)));

    let repeat = ledger.surety.register_airline(&airline(1), airline(5)).unwrap();
    assert_eq!(repeat, RegistrationOutcome::Pending { votes: 1, required: 2 });

    let second = ledger.surety.register_airline(&airline(3), airline(5)).unwrap();
    assert_eq!(second, RegistrationOutcome::Registered);
    assert!(ledger.surety.is_registered(&airline(5)));
    assert!(!ledger.surety.is_airline_funded(&airline(5)));
}

#[test]
fn test_registered_but_unfunded_airline_cannot_vote() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::reference(), 2);
    ledger.surety.register_airline(&airline(1), airline(3)).unwrap();

    assert_eq!(
        ledger.surety.register_airline(&airline(3), airline(4)),
        Err(SuretyError::Unauthorized(airline(3)))
    );
}

#[test]
fn test_funding_unregistered_airline_fails() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::reference(), 4);
    ledger.surety.register_airline(&airline(1), airline(5)).unwrap();
    ledger.give(airline(5), coins(10));

    assert_eq!(
        ledger.surety.fund(&airline(5), &airline(5), coins(10)),
        Err(SuretyError::NotRegistered(airline(5)))
    );
    assert!(!ledger.surety.is_airline_funded(&airline(5)));
    assert_eq!(ledger.surety.balance_of(&airline(5)), coins(10));
}

#[test]
fn test_votes_and_registration_are_announced() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::reference(), 4);

    ledger.surety.register_airline(&airline(2), airline(5)).unwrap();
    ledger.surety.register_airline(&airline(4), airline(5)).unwrap();

    let events = ledger.surety.events();
    let tail: Vec<_> = events.range(events.len() - 2..).cloned().collect();
    assert_eq!(
        tail,
        vec![
            SuretyEvent::AirlineVoted {
                candidate: airline(5),
                voter: airline(2),
                votes: 1,
                required: 2,
            },
            SuretyEvent::AirlineRegistered {
                airline: airline(5),
                sponsor: airline(4),
            },
        ]
    );
}

#[test]
fn test_reset_airline_is_owner_only() {
    let mut ledger = TestLedger::with_funded_airlines(SuretyConfig::reference(), 2);
    let owner = ledger.owner;

    assert_eq!(
        ledger.surety.reset_airline(&airline(1), &airline(2)),
        Err(SuretyError::Unauthorized(airline(1)))
    );
    ledger.surety.reset_airline(&owner, &airline(2)).unwrap();

    assert!(!ledger.surety.is_registered(&airline(2)));
    assert!(!ledger.surety.is_airline_funded(&airline(2)));
    assert_eq!(ledger.surety.registered_airline_count(), 1);
}
