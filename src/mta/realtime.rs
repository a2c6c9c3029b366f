//! GTFS-Realtime message types (subset of gtfs-realtime.proto).
//!
//! Only the fields the arrivals board reads are declared. Everything else,
//! including the NYCT extensions, is skipped by the decoder as unknown fields.

/// The contents of a feed message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeedMessage {
    #[prost(message, required, tag = "1")]
    pub header: FeedHeader,
    #[prost(message, repeated, tag = "2")]
    pub entity: Vec<FeedEntity>,
}

/// Metadata about a feed, included in feed messages.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeedHeader {
    #[prost(string, required, tag = "1")]
    pub gtfs_realtime_version: String,
    /// POSIX time the feed content was created.
    #[prost(uint64, optional, tag = "3")]
    pub timestamp: Option<u64>,
}

/// A definition (or update) of an entity in the transit feed.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FeedEntity {
    #[prost(string, required, tag = "1")]
    pub id: String,
    #[prost(bool, optional, tag = "2")]
    pub is_deleted: Option<bool>,
    #[prost(message, optional, tag = "3")]
    pub trip_update: Option<TripUpdate>,
    #[prost(message, optional, tag = "4")]
    pub vehicle: Option<VehiclePosition>,
}

/// Realtime update of the progress of a vehicle along a trip.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TripUpdate {
    #[prost(message, required, tag = "1")]
    pub trip: TripDescriptor,
    #[prost(message, repeated, tag = "2")]
    pub stop_time_update: Vec<trip_update::StopTimeUpdate>,
    #[prost(uint64, optional, tag = "4")]
    pub timestamp: Option<u64>,
}

/// Nested message types in `TripUpdate`.
pub mod trip_update {
    /// Timing information for a single predicted event (arrival or departure).
    #[derive(Clone, Copy, PartialEq, ::prost::Message)]
    pub struct StopTimeEvent {
        #[prost(int32, optional, tag = "1")]
        pub delay: Option<i32>,
        /// Absolute event time in POSIX seconds.
        #[prost(int64, optional, tag = "2")]
        pub time: Option<i64>,
        #[prost(int32, optional, tag = "3")]
        pub uncertainty: Option<i32>,
    }

    /// Realtime update for arrival and/or departure events for a given stop.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct StopTimeUpdate {
        #[prost(uint32, optional, tag = "1")]
        pub stop_sequence: Option<u32>,
        #[prost(message, optional, tag = "2")]
        pub arrival: Option<StopTimeEvent>,
        #[prost(message, optional, tag = "3")]
        pub departure: Option<StopTimeEvent>,
        #[prost(string, optional, tag = "4")]
        pub stop_id: Option<String>,
    }
}

/// Realtime positioning information for a given vehicle.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VehiclePosition {
    #[prost(message, optional, tag = "1")]
    pub trip: Option<TripDescriptor>,
    #[prost(uint32, optional, tag = "3")]
    pub current_stop_sequence: Option<u32>,
    #[prost(enumeration = "vehicle_position::VehicleStopStatus", optional, tag = "4")]
    pub current_status: Option<i32>,
    #[prost(uint64, optional, tag = "5")]
    pub timestamp: Option<u64>,
    #[prost(string, optional, tag = "7")]
    pub stop_id: Option<String>,
}

/// Nested enum types in `VehiclePosition`.
pub mod vehicle_position {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum VehicleStopStatus {
        /// The vehicle is just about to arrive at the stop.
        IncomingAt = 0,
        /// The vehicle is standing at the stop.
        StoppedAt = 1,
        /// The vehicle has departed the previous stop and is in transit.
        InTransitTo = 2,
    }
}

/// A descriptor that identifies a single instance of a GTFS trip.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TripDescriptor {
    #[prost(string, optional, tag = "1")]
    pub trip_id: Option<String>,
    #[prost(string, optional, tag = "2")]
    pub start_time: Option<String>,
    #[prost(string, optional, tag = "3")]
    pub start_date: Option<String>,
    #[prost(string, optional, tag = "5")]
    pub route_id: Option<String>,
    #[prost(uint32, optional, tag = "6")]
    pub direction_id: Option<u32>,
}
