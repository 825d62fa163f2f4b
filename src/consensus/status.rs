use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SuretyError;

/// Flight status codes reported by oracles. Only `LateAirline` settles policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FlightStatus {
    Unknown = 0,
    OnTime = 10,
    LateAirline = 20,
    LateWeather = 30,
    LateTechnical = 40,
    LateOther = 50,
}

impl FlightStatus {
    pub const ALL: [FlightStatus; 6] = [
        FlightStatus::Unknown,
        FlightStatus::OnTime,
        FlightStatus::LateAirline,
        FlightStatus::LateWeather,
        FlightStatus::LateTechnical,
        FlightStatus::LateOther,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Airline-caused delay is the only status that compensates passengers
    pub fn triggers_settlement(self) -> bool {
        self == FlightStatus::LateAirline
    }
}

impl TryFrom<u8> for FlightStatus {
    type Error = SuretyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        FlightStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(SuretyError::InvalidStatusCode(code))
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::Unknown => "Unknown",
            FlightStatus::OnTime => "OnTime",
            FlightStatus::LateAirline => "LateAirline",
            FlightStatus::LateWeather => "LateWeather",
            FlightStatus::LateTechnical => "LateTechnical",
            FlightStatus::LateOther => "LateOther",
        };
        write!(f, "{}({})", name, self.code())
    }
}
