//! Train resolver: correlates trip updates with vehicle positions, places each
//! trip on the line through the station directory, and orders the result.
//!
//! Resolving is total. Missing fields, unknown stops and routes without a
//! directory all degrade to defaults or an empty board, never to an error.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::models::{split_direction, Board, BoardStatus, SectionGroup, Train, NO_STOP};
use crate::mta::snapshot::{FeedSnapshot, TripRecord};
use crate::mta::stations::StationDirectory;

/// Current wall-clock time in POSIX seconds.
pub fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

/// Resolve a snapshot into a section-grouped board at the current time.
pub fn resolve(snapshot: &FeedSnapshot, directory: &StationDirectory, route: &str) -> Board {
    resolve_at(snapshot, directory, route, now_secs())
}

/// Resolve a snapshot into a section-grouped board as of `now`.
pub fn resolve_at(
    snapshot: &FeedSnapshot,
    directory: &StationDirectory,
    route: &str,
    now: f64,
) -> Board {
    let trains = resolve_trains(snapshot, directory, route, now);
    let mut board = group_by_section(route, trains, directory, now);
    board.feed_timestamp = snapshot.feed_timestamp;
    board
}

/// Resolve every trip of `route` into an ordered train list.
pub fn resolve_trains(
    snapshot: &FeedSnapshot,
    directory: &StationDirectory,
    route: &str,
    now: f64,
) -> Vec<Train> {
    let mut trains: Vec<Train> = route_trips(snapshot, route)
        .into_iter()
        .map(|trip| resolve_trip(trip, snapshot, directory, now))
        .collect();

    sort_trains(&mut trains);
    debug!("Resolved {} trains for route {}", trains.len(), route);
    trains
}

/// Trip updates of `route`, one per trip id.
///
/// A repeated trip id keeps the position of its first matching update and
/// takes the last matching one. Updates for other routes never displace it.
fn route_trips<'a>(snapshot: &'a FeedSnapshot, route: &str) -> Vec<&'a TripRecord> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut trips: Vec<&TripRecord> = Vec::new();

    for trip in snapshot
        .trip_updates()
        .iter()
        .filter(|trip| trip.route_id.as_deref() == Some(route))
    {
        match positions.get(trip.trip_id.as_str()) {
            Some(&pos) => trips[pos] = trip,
            None => {
                positions.insert(&trip.trip_id, trips.len());
                trips.push(trip);
            }
        }
    }
    trips
}

/// Build one train from a trip record and its matching vehicle, if any.
fn resolve_trip(
    trip: &TripRecord,
    snapshot: &FeedSnapshot,
    directory: &StationDirectory,
    now: f64,
) -> Train {
    let (next_stop_id, timestamp) = next_stop(trip);
    let time_until_secs = timestamp.map(|ts| secs_until(ts, now)).unwrap_or(0.0);

    let (base_stop_id, direction) = split_direction(&next_stop_id);
    let next_station_index = directory
        .station_name(base_stop_id)
        .and_then(|name| directory.station_index(name))
        .and_then(|idx| i32::try_from(idx).ok())
        .unwrap_or(-1);
    let section_name = directory.section_for(base_stop_id).map(str::to_string);

    if next_station_index < 0 && next_stop_id != NO_STOP {
        debug!("Stop {} not in directory for trip {}", next_stop_id, trip.trip_id);
    }

    let vehicle = snapshot.vehicle(&trip.trip_id);

    Train {
        trip_id: trip.trip_id.clone(),
        route_id: trip.route_id.clone().unwrap_or_default(),
        start_date: trip.start_date.clone().unwrap_or_default(),
        next_stop_id,
        direction,
        time_until_secs,
        next_station_index,
        section_name,
        vehicle_stop_id: vehicle.and_then(|v| v.stop_id.clone()),
        status: vehicle.and_then(|v| v.status),
    }
}

/// First prediction with a usable arrival (preferred) or departure time.
fn next_stop(trip: &TripRecord) -> (String, Option<i64>) {
    trip.stop_times
        .iter()
        .find_map(|stu| {
            stu.arrival.or(stu.departure).map(|ts| {
                let stop_id = stu.stop_id.clone().unwrap_or_else(|| NO_STOP.to_string());
                (stop_id, Some(ts))
            })
        })
        .unwrap_or_else(|| (NO_STOP.to_string(), None))
}

/// Seconds from `now` until `timestamp`, clamped at zero.
fn secs_until(timestamp: i64, now: f64) -> f64 {
    let remaining = timestamp as f64 - now;
    if remaining > 0.0 {
        remaining
    } else {
        0.0
    }
}

/// Composite ordering key for a train.
///
/// Primary sorts descending by station index, shifted one place for trains
/// bound toward the endpoint so opposite directions at one station do not tie.
/// Secondary sorts soonest first toward the endpoint and latest first otherwise.
fn sort_key(train: &Train) -> (i64, f64) {
    let toward_endpoint = train.is_toward_endpoint();
    let offset = if toward_endpoint { 1 } else { 0 };
    let primary = -(i64::from(train.next_station_index) - offset);
    let secondary = if toward_endpoint {
        train.time_until_secs
    } else {
        -train.time_until_secs
    };
    (primary, secondary)
}

/// Total over NaN-free keys. `-0.0` and `0.0` tie.
fn compare_keys(a: (i64, f64), b: (i64, f64)) -> Ordering {
    a.0.cmp(&b.0)
        .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

/// Stable sort by composite key. Leaves feed order untouched if any key is
/// incomparable (a NaN ETA).
pub fn sort_trains(trains: &mut [Train]) {
    let keys: Vec<(i64, f64)> = trains.iter().map(sort_key).collect();
    if keys.iter().any(|k| k.1.is_nan()) {
        warn!("Train ordering failed; keeping feed order");
        return;
    }

    // Keys are computed once and carried with each train
    let mut keyed: Vec<((i64, f64), Train)> = keys
        .into_iter()
        .zip(trains.iter().cloned())
        .collect();
    keyed.sort_by(|a, b| compare_keys(a.0, b.0));
    for (slot, (_, train)) in trains.iter_mut().zip(keyed) {
        *slot = train;
    }
}

/// Partition ordered trains into the directory's sections.
///
/// Every section is kept, empty or not. Trains with no known section go to
/// `unplaced`, preserving order.
pub fn group_by_section(
    route: &str,
    trains: Vec<Train>,
    directory: &StationDirectory,
    now: f64,
) -> Board {
    let status = if directory.is_empty() {
        BoardStatus::NoDirectory
    } else if trains.is_empty() {
        BoardStatus::NoTrips
    } else {
        BoardStatus::Ready
    };

    let mut sections: Vec<SectionGroup> = directory
        .sections()
        .iter()
        .map(|name| SectionGroup {
            name: name.clone(),
            trains: Vec::new(),
        })
        .collect();
    let mut unplaced = Vec::new();

    for train in trains {
        let slot = train
            .section_name
            .as_deref()
            .and_then(|name| sections.iter_mut().find(|s| s.name == name));
        match slot {
            Some(section) => section.trains.push(train),
            None => unplaced.push(train),
        }
    }

    Board {
        route: route.to_string(),
        status,
        sections,
        unplaced,
        resolved_at: now,
        feed_timestamp: None,
    }
}
