use crate::consensus::FlightStatus;
use crate::ledger::{Address, EventBus, SuretyEvent};

#[test]
fn test_publish_journals_without_subscribers() {
    let mut bus = EventBus::new(4, 16);
    bus.publish(SuretyEvent::OperatingStatusChanged { operational: false });

    assert_eq!(bus.journal().len(), 1);
}

#[test]
fn test_subscribers_receive_published_events() {
    let mut bus = EventBus::new(4, 16);
    let mut rx = bus.subscribe();
    let event = SuretyEvent::OracleRequest {
        index: 3,
        airline: Address::derive("airline"),
        flight: "FL100".to_string(),
        timestamp: 1_700_000_000,
    };

    bus.publish(event.clone());

    assert_eq!(rx.try_recv().unwrap(), event);
}

#[test]
fn test_event_json_is_tagged() {
    let event = SuretyEvent::FlightStatusInfo {
        airline: Address::derive("airline"),
        flight: "FL100".to_string(),
        timestamp: 42,
        status: FlightStatus::LateAirline,
    };
    let json = serde_json::to_value(&event).unwrap();

    assert_eq!(json["event"], "flight_status_info");
    assert_eq!(json["status"], "late_airline");
    assert_eq!(json["flight"], "FL100");
}

#[test]
fn test_journal_keeps_only_latest_events() {
    let mut bus = EventBus::new(4, 3);
    for operational in [false, true, false, true, false] {
        bus.publish(SuretyEvent::OperatingStatusChanged { operational });
    }

    assert_eq!(bus.journal().len(), 3);
    assert_eq!(
        bus.journal(),
        &[
            SuretyEvent::OperatingStatusChanged { operational: false },
            SuretyEvent::OperatingStatusChanged { operational: true },
            SuretyEvent::OperatingStatusChanged { operational: false },
        ]
    );
}
