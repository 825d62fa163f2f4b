use flightsurety_core::consensus::{FlightStatus, ReportMode};
use flightsurety_core::simulation::{self, SimulationError};
use flightsurety_core::{Amount, SuretyConfig, SuretyEvent};

fn devnet(mode: ReportMode) -> SuretyConfig {
    let mut config = SuretyConfig::local_devnet();
    config.simulation.report_mode = mode;
    config.simulation.airlines = 6;
    config.simulation.passengers = 2;
    config
}

#[tokio::test]
async fn test_late_airline_run_pays_every_passenger() {
    let report = simulation::run(devnet(ReportMode::LateAirline)).await.unwrap();

    assert_eq!(report.status, FlightStatus::LateAirline);
    assert_eq!(report.airlines_registered, 6);
    assert_eq!(report.oracles, 5);
    assert_eq!(report.responders, 5);
    assert_eq!(report.passengers.len(), 2);
    for outcome in &report.passengers {
        assert_eq!(outcome.insured, Amount::from_coins(1));
        assert_eq!(outcome.paid, "1.5".parse::<Amount>().unwrap());
        assert_eq!(outcome.balance, "100.5".parse::<Amount>().unwrap());
    }
    assert_eq!(report.escrow, Amount::ZERO);
    assert!(report.solvent);
    assert!(report
        .events
        .iter()
        .any(|event| matches!(event, SuretyEvent::FlightStatusInfo { .. })));
}

#[tokio::test]
async fn test_on_time_run_keeps_premiums_in_escrow() {
    let report = simulation::run(devnet(ReportMode::OnTime)).await.unwrap();

    assert_eq!(report.status, FlightStatus::OnTime);
    assert!(report.passengers.iter().all(|outcome| outcome.paid.is_zero()));
    assert_eq!(report.escrow, Amount::from_coins(2));
    assert!(report.solvent);
}

#[tokio::test]
async fn test_run_without_enough_oracles_times_out() {
    let mut config = devnet(ReportMode::LateAirline);
    config.simulation.oracles = 2;
    config.simulation.finalization_timeout_ms = 100;

    let err = simulation::run(config).await.unwrap_err();

    assert!(matches!(err, SimulationError::Timeout { .. }));
}
