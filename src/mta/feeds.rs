//! MTA GTFS-RT feed URL mapping and the route catalog.
//!
//! Each feed covers a group of routes. The feed IDs map to:
//! `https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs{suffix}`

/// Every route the board can track.
pub const ROUTE_IDS: [&str; 29] = [
    "1", "2", "3", "4", "5", "6", "6X", "7", "7X", "GS", "A", "B", "C", "D", "E", "F", "FX", "FS",
    "G", "J", "L", "M", "N", "Q", "R", "H", "W", "Z", "SI",
];

pub fn is_known_route(route: &str) -> bool {
    ROUTE_IDS.contains(&route)
}

/// Returns the feed URL suffix for a given route.
pub fn feed_id_for_route(route: &str) -> Option<&'static str> {
    match route {
        // IRT: 1-7 and the 42 St shuttle share the main feed
        "1" | "2" | "3" | "4" | "5" | "5X" | "6" | "6X" | "7" | "7X" | "GS" => Some(""),
        // IND: A, C, E and the Rockaway shuttle
        "A" | "C" | "E" | "H" => Some("-ace"),
        // IND: B, D, F, M and the Franklin shuttle
        "B" | "D" | "F" | "FX" | "FS" | "M" => Some("-bdfm"),
        // IND: G
        "G" => Some("-g"),
        // BMT: J, Z
        "J" | "Z" => Some("-jz"),
        // BMT: N, Q, R, W
        "N" | "Q" | "R" | "W" => Some("-nqrw"),
        // BMT: L
        "L" => Some("-l"),
        // SIR (Staten Island Railway)
        "SI" | "SIR" => Some("-si"),
        _ => None,
    }
}

/// Base URL for MTA GTFS-RT feeds.
pub const MTA_FEED_BASE_URL: &str =
    "https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs";

/// Returns the full feed URL for a route.
pub fn feed_url_for_route(route: &str) -> Option<String> {
    feed_id_for_route(route).map(|suffix| format!("{}{}", MTA_FEED_BASE_URL, suffix))
}

/// Long service name for a route.
pub fn route_long_name(route: &str) -> Option<&'static str> {
    let name = match route {
        "1" => "Broadway - 7 Avenue Local",
        "2" | "3" => "7 Avenue Express",
        "4" | "5" | "5X" => "Lexington Avenue Express",
        "6" => "Lexington Avenue Local",
        "6X" => "Pelham Bay Park Express",
        "7" => "Flushing Local",
        "7X" => "Flushing Express",
        "GS" => "42 St Shuttle",
        "A" => "8 Avenue Express",
        "B" | "D" => "6 Avenue Express",
        "C" | "E" => "8 Avenue Local",
        "F" => "Queens Blvd Express/ 6 Av Local",
        "FX" => "Brooklyn F Express",
        "FS" => "Franklin Avenue Shuttle",
        "G" => "Brooklyn-Queens Crosstown",
        "J" => "Nassau St Local",
        "L" => "14 St-Canarsie Local",
        "M" => "Queens Blvd Local/6 Av Local",
        "N" | "R" | "W" => "Broadway Local",
        "Q" => "Broadway Express",
        "H" => "Rockaway Park Shuttle",
        "Z" => "Nassau St Express",
        "SI" => "Staten Island Railway",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_id_for_known_routes() {
        assert_eq!(feed_id_for_route("1"), Some(""));
        assert_eq!(feed_id_for_route("7"), Some(""));
        assert_eq!(feed_id_for_route("A"), Some("-ace"));
        assert_eq!(feed_id_for_route("H"), Some("-ace"));
        assert_eq!(feed_id_for_route("FS"), Some("-bdfm"));
        assert_eq!(feed_id_for_route("N"), Some("-nqrw"));
        assert_eq!(feed_id_for_route("L"), Some("-l"));
        assert_eq!(feed_id_for_route("SI"), Some("-si"));
    }

    #[test]
    fn test_feed_id_for_unknown_route() {
        assert_eq!(feed_id_for_route("X"), None);
        assert_eq!(feed_url_for_route("X"), None);
    }

    #[test]
    fn test_feed_url_for_route() {
        assert_eq!(
            feed_url_for_route("G").as_deref(),
            Some("https://api-endpoint.mta.info/Dataservice/mtagtfsfeeds/nyct%2Fgtfs-g")
        );
    }

    #[test]
    fn test_catalog_is_complete() {
        for route in ROUTE_IDS {
            assert!(feed_id_for_route(route).is_some(), "no feed for {}", route);
            assert!(route_long_name(route).is_some(), "no name for {}", route);
        }
        assert!(is_known_route("GS"));
        assert!(!is_known_route("S"));
    }
}
