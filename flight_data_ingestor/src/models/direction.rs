use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the board a query asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Direction {
    /// Flights leaving the queried airport.
    Departure,
    /// Flights arriving at the queried airport.
    Arrival,
}

impl Direction {
    /// The label the portal's direction select uses for this value.
    pub fn portal_label(self) -> &'static str {
        match self {
            Direction::Departure => "출발",
            Direction::Arrival => "도착",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Departure => write!(f, "departure"),
            Direction::Arrival => write!(f, "arrival"),
        }
    }
}
