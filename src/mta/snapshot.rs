use std::collections::HashMap;

use tracing::debug;

use crate::models::VehicleStatus;
use crate::mta::realtime::trip_update::StopTimeEvent;
use crate::mta::realtime::vehicle_position::VehicleStopStatus;
use crate::mta::realtime::{FeedMessage, TripDescriptor};

/// One predicted stop event of a trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopTimePrediction {
    /// Feed stop id, possibly carrying an N/S suffix.
    pub stop_id: Option<String>,
    /// Arrival time in POSIX seconds.
    pub arrival: Option<i64>,
    /// Departure time in POSIX seconds.
    pub departure: Option<i64>,
}

/// Trip update payload keyed by trip id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripRecord {
    pub trip_id: String,
    pub route_id: Option<String>,
    pub start_date: Option<String>,
    pub stop_times: Vec<StopTimePrediction>,
}

/// Vehicle position payload keyed by trip id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehicleRecord {
    pub stop_id: Option<String>,
    pub status: Option<VehicleStatus>,
}

/// Decoded feed contents, independent of the protobuf types.
///
/// Trip updates keep feed order, repeats included, so a consumer can pick
/// among records sharing a trip id after filtering by route.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    trip_updates: Vec<TripRecord>,
    vehicle_positions: HashMap<String, VehicleRecord>,
    pub feed_timestamp: Option<u64>,
}

impl FeedSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the entities of a decoded feed message into trip-keyed records.
    pub fn from_feed(feed: &FeedMessage) -> Self {
        let mut snapshot = FeedSnapshot {
            feed_timestamp: feed.header.timestamp,
            ..Default::default()
        };

        for entity in &feed.entity {
            if let Some(ref trip_update) = entity.trip_update {
                match trip_id(&trip_update.trip) {
                    Some(id) => {
                        let stop_times = trip_update
                            .stop_time_update
                            .iter()
                            .map(|stu| StopTimePrediction {
                                stop_id: non_empty(&stu.stop_id),
                                arrival: event_time(&stu.arrival),
                                departure: event_time(&stu.departure),
                            })
                            .collect();
                        snapshot.insert_trip(TripRecord {
                            trip_id: id,
                            route_id: non_empty(&trip_update.trip.route_id),
                            start_date: non_empty(&trip_update.trip.start_date),
                            stop_times,
                        });
                    }
                    None => debug!("Skipping trip update {} without trip id", entity.id),
                }
            }

            if let Some(ref vehicle) = entity.vehicle {
                match vehicle.trip.as_ref().and_then(trip_id) {
                    Some(id) => snapshot.insert_vehicle(
                        id,
                        VehicleRecord {
                            stop_id: non_empty(&vehicle.stop_id),
                            status: Some(vehicle_status(
                                vehicle
                                    .current_status
                                    .unwrap_or(VehicleStopStatus::InTransitTo as i32),
                            )),
                        },
                    ),
                    None => debug!("Skipping vehicle {} without trip id", entity.id),
                }
            }
        }

        debug!(
            "Snapshot: {} trip updates, {} vehicle positions",
            snapshot.trip_updates.len(),
            snapshot.vehicle_count()
        );
        snapshot
    }

    pub fn insert_trip(&mut self, record: TripRecord) {
        self.trip_updates.push(record);
    }

    pub fn insert_vehicle(&mut self, trip_id: String, record: VehicleRecord) {
        self.vehicle_positions.insert(trip_id, record);
    }

    /// Trip updates in feed order.
    pub fn trip_updates(&self) -> &[TripRecord] {
        &self.trip_updates
    }

    pub fn vehicle(&self, trip_id: &str) -> Option<&VehicleRecord> {
        self.vehicle_positions.get(trip_id)
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicle_positions.len()
    }
}

/// Optional string field, empty treated as absent.
pub fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|s| !s.is_empty()).map(str::to_string)
}

/// Event timestamp, zero treated as absent.
pub fn event_time(event: &Option<StopTimeEvent>) -> Option<i64> {
    event.as_ref().and_then(|e| e.time).filter(|&t| t != 0)
}

/// Map a raw status code, keeping unknown codes as-is. An absent
/// `current_status` reads as `IN_TRANSIT_TO`, the field's default.
pub fn vehicle_status(code: i32) -> VehicleStatus {
    match VehicleStopStatus::try_from(code) {
        Ok(VehicleStopStatus::IncomingAt) => VehicleStatus::IncomingAt,
        Ok(VehicleStopStatus::StoppedAt) => VehicleStatus::StoppedAt,
        Ok(VehicleStopStatus::InTransitTo) => VehicleStatus::InTransitTo,
        Err(_) => VehicleStatus::Other(code),
    }
}

fn trip_id(trip: &TripDescriptor) -> Option<String> {
    non_empty(&trip.trip_id)
}
