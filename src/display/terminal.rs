//! Plain-text board rendering for the terminal.

use crate::display::colors::{route_color, RouteStyle};
use crate::models::{Board, BoardStatus, Train};
use crate::mta::feeds;
use crate::mta::stations::{StationDirectory, StationSource};

/// Render a board: route header, then every section with its trains.
pub fn render_board(board: &Board, directory: &StationDirectory, style: &RouteStyle) -> String {
    let long_name = feeds::route_long_name(&board.route).unwrap_or("");
    let mut out = style.badge(&format!(" {}: {} ", board.route, long_name));
    out.push('\n');

    match board.status {
        BoardStatus::NoDirectory => {
            out.push_str(&format!("No station data found for route {}\n", board.route));
            return out;
        }
        BoardStatus::NoTrips => out.push_str("No trip updates for this route in feed.\n"),
        BoardStatus::Ready => {}
    }

    for section in &board.sections {
        out.push('\n');
        out.push_str(&style.heading(&section.name));
        out.push('\n');
        for train in &section.trains {
            out.push_str(&render_train(train, directory, style));
            out.push('\n');
        }
    }

    out
}

/// Two-line train entry: direction, trip id and status, then station and ETA.
pub fn render_train(train: &Train, directory: &StationDirectory, style: &RouteStyle) -> String {
    let direction = train
        .direction
        .map(|d| d.as_char().to_string())
        .unwrap_or_default();
    let status = train.status.map(|s| s.to_string()).unwrap_or_default();
    let station = directory
        .station_name(train.base_stop_id())
        .unwrap_or(&train.next_stop_id);

    format!(
        "{} {} {}\n{} in {}s",
        style.badge(&format!(" {} ", direction)),
        style.trip(&train.trip_id),
        style.status(&status),
        station,
        train.time_until_secs as i64
    )
}

/// Route catalog listing with badges and table counts. Routes the station
/// document does not cover are marked.
pub fn render_self_test(color: bool, stations: &StationSource) -> String {
    let mut out = String::from("NYC MTA Subway Routes:\n\n");
    for route in feeds::ROUTE_IDS {
        let style = RouteStyle::for_route(route, color);
        let name = feeds::route_long_name(route).unwrap_or("");
        out.push_str(&style.badge(&format!("{}: {}", route, name)));
        if !stations.has_route(route) {
            out.push_str(" (no station data)");
        }
        out.push('\n');
    }

    out.push_str("\n\n");
    out.push_str(&format!("{} routes total.\n", feeds::ROUTE_IDS.len()));
    out.push_str(&format!(
        "{} long names total.\n",
        count_routes(|r| feeds::route_long_name(r).is_some())
    ));
    out.push_str(&format!(
        "{} ANSI colors total.\n",
        count_routes(|r| route_color(r).is_some())
    ));
    out.push_str(&format!(
        "{} line to URL mappings total.\n",
        count_routes(|r| feeds::feed_url_for_route(r).is_some())
    ));
    out.push_str(&format!(
        "{} routes with station data.\n",
        count_routes(|r| stations.has_route(r))
    ));
    out
}

fn count_routes(f: impl Fn(&str) -> bool) -> usize {
    feeds::ROUTE_IDS.iter().filter(|route| f(route)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Direction, SectionGroup, VehicleStatus};
    use crate::mta::stations::SourceSection;

    fn directory() -> StationDirectory {
        StationDirectory::from_sections(
            "6",
            &[
                SourceSection {
                    name: "Bronx".into(),
                    stops: vec![("601".into(), "Pelham Bay Park".into())],
                },
                SourceSection {
                    name: "Manhattan".into(),
                    stops: vec![("631".into(), "Grand Central-42 St".into())],
                },
            ],
        )
    }

    fn train(stop_id: &str, direction: Option<Direction>) -> Train {
        Train {
            trip_id: "012345_6..N01R".into(),
            route_id: "6".into(),
            start_date: "20250101".into(),
            next_stop_id: stop_id.into(),
            direction,
            time_until_secs: 95.7,
            next_station_index: 1,
            section_name: Some("Manhattan".into()),
            vehicle_stop_id: None,
            status: Some(VehicleStatus::InTransitTo),
        }
    }

    fn board(status: BoardStatus, trains: Vec<Train>) -> Board {
        Board {
            route: "6".into(),
            status,
            sections: vec![
                SectionGroup {
                    name: "Bronx".into(),
                    trains: Vec::new(),
                },
                SectionGroup {
                    name: "Manhattan".into(),
                    trains,
                },
            ],
            unplaced: Vec::new(),
            resolved_at: 0.0,
            feed_timestamp: None,
        }
    }

    #[test]
    fn test_render_train_plain() {
        let style = RouteStyle::for_route("6", false);
        let text = render_train(&train("631N", Some(Direction::Uptown)), &directory(), &style);
        assert_eq!(
            text,
            " N  012345_6..N01R IN_TRANSIT_TO\nGrand Central-42 St in 95s"
        );
    }

    #[test]
    fn test_render_train_unknown_stop_falls_back_to_id() {
        let style = RouteStyle::for_route("6", false);
        let text = render_train(&train("999S", Some(Direction::Downtown)), &directory(), &style);
        assert!(text.ends_with("999S in 95s"));
    }

    #[test]
    fn test_render_board_shows_empty_sections() {
        let style = RouteStyle::for_route("6", false);
        let text = render_board(
            &board(BoardStatus::Ready, vec![train("631N", Some(Direction::Uptown))]),
            &directory(),
            &style,
        );
        assert!(text.starts_with(" 6: Lexington Avenue Local \n"));
        let bronx = text.find("\nBronx\n").unwrap();
        let manhattan = text.find("\nManhattan\n").unwrap();
        assert!(bronx < manhattan);
        assert!(text.contains("Grand Central-42 St in 95s"));
    }

    #[test]
    fn test_render_board_no_trips() {
        let style = RouteStyle::for_route("6", false);
        let text = render_board(&board(BoardStatus::NoTrips, vec![]), &directory(), &style);
        assert!(text.contains("No trip updates for this route in feed."));
        assert!(text.contains("\nManhattan\n"));
    }

    #[test]
    fn test_render_board_no_directory() {
        let style = RouteStyle::for_route("6", false);
        let mut empty = Board::empty("6");
        empty.status = BoardStatus::NoDirectory;
        let text = render_board(&empty, &StationDirectory::default(), &style);
        assert!(text.contains("No station data found for route 6"));
    }

    #[test]
    fn test_self_test_counts() {
        let text = render_self_test(false, &StationSource::embedded().unwrap());
        assert!(text.contains("GS: 42 St Shuttle"));
        assert!(text.contains("29 routes total."));
        assert!(text.contains("29 long names total."));
        assert!(text.contains("29 ANSI colors total."));
        assert!(text.contains("29 line to URL mappings total."));
        assert!(text.contains("8 routes with station data."));
        assert!(text.contains("A: 8 Avenue Express (no station data)\n"));
        assert!(text.contains("6: Lexington Avenue Local\n"));
    }
}
