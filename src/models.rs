use std::fmt;

use serde::{Serialize, Serializer};

/// Placeholder stop id for a trip whose predictions carry no usable timestamp.
pub const NO_STOP: &str = "(no stop)";

/// Direction a train is traveling, taken from the stop id suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    #[serde(rename = "N")]
    Uptown,
    #[serde(rename = "S")]
    Downtown,
}

impl Direction {
    pub fn as_char(self) -> char {
        match self {
            Direction::Uptown => 'N',
            Direction::Downtown => 'S',
        }
    }
}

/// Split a feed stop id into its base id and direction suffix.
///
/// Stop ids end with N (northbound/uptown) or S (southbound/downtown). A
/// single-character id is never treated as a bare suffix.
pub fn split_direction(stop_id: &str) -> (&str, Option<Direction>) {
    if stop_id.len() < 2 {
        return (stop_id, None);
    }
    let (base, suffix) = stop_id.split_at(stop_id.len() - 1);
    match suffix {
        "N" => (base, Some(Direction::Uptown)),
        "S" => (base, Some(Direction::Downtown)),
        _ => (stop_id, None),
    }
}

/// Vehicle stop status as reported in a vehicle position record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleStatus {
    IncomingAt,
    StoppedAt,
    InTransitTo,
    /// A status code outside the known enum values.
    Other(i32),
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleStatus::IncomingAt => write!(f, "INCOMING_AT"),
            VehicleStatus::StoppedAt => write!(f, "STOPPED_AT"),
            VehicleStatus::InTransitTo => write!(f, "IN_TRANSIT_TO"),
            VehicleStatus::Other(code) => write!(f, "{}", code),
        }
    }
}

impl Serialize for VehicleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single train approaching on the selected route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Train {
    pub trip_id: String,
    pub route_id: String,
    pub start_date: String,
    /// Stop id as seen in the feed, direction suffix included.
    pub next_stop_id: String,
    pub direction: Option<Direction>,
    /// Seconds until arrival at the next stop, never negative.
    pub time_until_secs: f64,
    /// Position along the line, or -1 when the stop is not in the directory.
    pub next_station_index: i32,
    pub section_name: Option<String>,
    pub vehicle_stop_id: Option<String>,
    pub status: Option<VehicleStatus>,
}

impl Train {
    /// Stop id with the direction suffix removed.
    pub fn base_stop_id(&self) -> &str {
        split_direction(&self.next_stop_id).0
    }

    /// Whether the train is bound for the reference endpoint of the line.
    pub fn is_toward_endpoint(&self) -> bool {
        self.direction == Some(Direction::Uptown)
    }
}

/// Overall outcome of a resolve, so "nothing to show" states stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardStatus {
    /// The station directory has no data for the route.
    NoDirectory,
    /// The feed had no trips for the route.
    NoTrips,
    Ready,
}

/// Trains within one section of the line, in board order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionGroup {
    pub name: String,
    pub trains: Vec<Train>,
}

/// Complete immutable board for one route, grouped by section.
///
/// Every directory section appears exactly once, even with no trains.
/// Trains whose stop is not in the directory are kept in `unplaced`.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub route: String,
    pub status: BoardStatus,
    pub sections: Vec<SectionGroup>,
    pub unplaced: Vec<Train>,
    pub resolved_at: f64,
    /// Creation time of the feed the board was resolved from.
    pub feed_timestamp: Option<u64>,
}

impl Board {
    /// Create an empty board for initialization.
    pub fn empty(route: &str) -> Self {
        Board {
            route: route.to_string(),
            status: BoardStatus::NoTrips,
            sections: Vec::new(),
            unplaced: Vec::new(),
            resolved_at: 0.0,
            feed_timestamp: None,
        }
    }

    pub fn section(&self, name: &str) -> Option<&SectionGroup> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn train_count(&self) -> usize {
        self.sections.iter().map(|s| s.trains.len()).sum::<usize>() + self.unplaced.len()
    }
}
