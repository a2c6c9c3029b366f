pub mod client;
pub mod feeds;
pub mod realtime;
pub mod resolver;
pub mod snapshot;
pub mod stations;
