use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

/// Embedded station directory document (compiled into the binary).
const STATION_DIRECTORY_JSON: &str = include_str!("../../assets/mta_subway_stations.json");

/// Source key holding the sections of every shuttle line.
const SHUTTLE_SOURCE_ROUTE: &str = "S";

/// Shuttle route aliases → the single section of the shared shuttle table they use.
const SHUTTLE_SECTIONS: [(&str, &str); 3] = [
    ("GS", "42 St Shuttle (Manhattan)"),
    ("FS", "Franklin Shuttle (Brooklyn)"),
    ("H", "Rockaway Shuttle (Queens)"),
];

/// Section name a shuttle route alias is filtered down to.
pub fn shuttle_section(route: &str) -> Option<&'static str> {
    SHUTTLE_SECTIONS
        .iter()
        .find(|(alias, _)| *alias == route)
        .map(|(_, section)| *section)
}

/// One section of the source document, stops in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSection {
    pub name: String,
    /// `(stop_id, station_name)` pairs.
    pub stops: Vec<(String, String)>,
}

/// Parsed station directory document: route → section → stop id → name.
///
/// Ordering at every level follows the document.
#[derive(Debug, Clone, Default)]
pub struct StationSource {
    routes: Vec<(String, Vec<SourceSection>)>,
}

impl StationSource {
    /// Parse the embedded document.
    pub fn embedded() -> Result<Self, StationSourceError> {
        Self::from_json(STATION_DIRECTORY_JSON)
    }

    /// Load a document from disk.
    pub fn load(path: &Path) -> Result<Self, StationSourceError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StationSourceError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, StationSourceError> {
        let root: Value =
            serde_json::from_str(json).map_err(|e| StationSourceError::Parse(e.to_string()))?;
        let root = as_object(&root, "document")?;

        let mut routes = Vec::with_capacity(root.len());
        for (route, sections) in root {
            let sections = as_object(sections, route)?;
            let mut parsed = Vec::with_capacity(sections.len());
            for (section_name, stops) in sections {
                let stops = as_object(stops, section_name)?;
                let mut pairs = Vec::with_capacity(stops.len());
                for (stop_id, name) in stops {
                    let name = name.as_str().ok_or_else(|| {
                        StationSourceError::Shape(format!(
                            "stop {} in {}/{} has a non-string name",
                            stop_id, route, section_name
                        ))
                    })?;
                    pairs.push((stop_id.clone(), name.to_string()));
                }
                parsed.push(SourceSection {
                    name: section_name.clone(),
                    stops: pairs,
                });
            }
            routes.push((route.clone(), parsed));
        }

        Ok(StationSource { routes })
    }

    /// Sections for a route key exactly as it appears in the document.
    pub fn sections(&self, route: &str) -> Option<&[SourceSection]> {
        self.routes
            .iter()
            .find(|(r, _)| r == route)
            .map(|(_, sections)| sections.as_slice())
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Whether a route id (shuttle aliases included) has any sections.
    pub fn has_route(&self, route: &str) -> bool {
        match shuttle_section(route) {
            Some(wanted) => self
                .sections(SHUTTLE_SOURCE_ROUTE)
                .is_some_and(|sections| sections.iter().any(|s| s.name == wanted)),
            None => self.sections(route).is_some_and(|sections| !sections.is_empty()),
        }
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>, StationSourceError> {
    value
        .as_object()
        .ok_or_else(|| StationSourceError::Shape(format!("{} is not a JSON object", what)))
}

/// Immutable per-route station lookup, built once at startup.
///
/// Station index is the position of a name in the flattened, de-duplicated
/// walk of all sections in order, and stands in for distance along the line.
#[derive(Debug, Clone, Default)]
pub struct StationDirectory {
    route: String,
    sections: Vec<String>,
    stop_id_to_name: HashMap<String, String>,
    stop_id_to_section: HashMap<String, String>,
    name_to_index: HashMap<String, usize>,
    station_names: Vec<String>,
    /// Section → name of its first stop.
    #[cfg_attr(not(test), allow(dead_code))]
    section_endpoints: HashMap<String, String>,
}

impl StationDirectory {
    /// Build the directory for `route` from the source document.
    ///
    /// A route with no data yields an empty directory rather than an error.
    pub fn build(source: &StationSource, route: &str) -> Self {
        let sections: Vec<SourceSection> = match shuttle_section(route) {
            Some(wanted) => source
                .sections(SHUTTLE_SOURCE_ROUTE)
                .unwrap_or_default()
                .iter()
                .filter(|s| s.name == wanted)
                .take(1)
                .cloned()
                .collect(),
            None => source.sections(route).unwrap_or_default().to_vec(),
        };

        let directory = Self::from_sections(route, &sections);
        if directory.is_empty() {
            info!(
                "[STATIONS] No station data for route {} ({} routes in document)",
                directory.route(),
                source.route_count()
            );
        } else {
            info!(
                "[STATIONS] Route {}: {} sections, {} stations",
                directory.route(),
                directory.sections.len(),
                directory.station_names.len()
            );
        }
        directory
    }

    /// Build a directory from an ordered section table.
    pub fn from_sections(route: &str, sections: &[SourceSection]) -> Self {
        let mut directory = StationDirectory {
            route: route.to_string(),
            ..Default::default()
        };

        for section in sections {
            directory.sections.push(section.name.clone());

            if let Some((_, first_name)) = section.stops.first() {
                debug!(
                    "[STATIONS] Section '{}' starts at {}",
                    section.name, first_name
                );
                directory
                    .section_endpoints
                    .insert(section.name.clone(), first_name.clone());
            }

            for (stop_id, name) in &section.stops {
                directory
                    .stop_id_to_name
                    .insert(stop_id.clone(), name.clone());
                directory
                    .stop_id_to_section
                    .insert(stop_id.clone(), section.name.clone());
                if !directory.name_to_index.contains_key(name) {
                    directory
                        .name_to_index
                        .insert(name.clone(), directory.station_names.len());
                    directory.station_names.push(name.clone());
                }
            }
        }

        directory
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    /// Section names in line order.
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    /// Distinct station names in line order.
    pub fn station_names(&self) -> &[String] {
        &self.station_names
    }

    /// True when the route had no data in the source document.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Display name for a base stop id (no direction suffix).
    pub fn station_name(&self, stop_id: &str) -> Option<&str> {
        self.stop_id_to_name.get(stop_id).map(|s| s.as_str())
    }

    /// Position of a station name along the line.
    pub fn station_index(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// Section containing a base stop id.
    pub fn section_for(&self, stop_id: &str) -> Option<&str> {
        self.stop_id_to_section.get(stop_id).map(|s| s.as_str())
    }
}

/// Station directory document errors.
#[derive(Debug)]
pub enum StationSourceError {
    Io(String),
    Parse(String),
    Shape(String),
}

impl std::fmt::Display for StationSourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationSourceError::Io(msg) => write!(f, "Station data I/O error: {}", msg),
            StationSourceError::Parse(msg) => write!(f, "Station data parse error: {}", msg),
            StationSourceError::Shape(msg) => write!(f, "Station data shape error: {}", msg),
        }
    }
}

impl std::error::Error for StationSourceError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SAMPLE: &str = r#"{
        "6": {
            "Bronx": {
                "601": "Pelham Bay Park",
                "602": "Buhre Av"
            },
            "Manhattan": {
                "621": "125 St",
                "631": "Grand Central-42 St",
                "640": "Brooklyn Bridge-City Hall"
            }
        },
        "4": {
            "Manhattan": {
                "621": "125 St",
                "631": "Grand Central-42 St"
            },
            "Brooklyn": {
                "423": "Borough Hall",
                "R28": "Borough Hall",
                "234": "Nevins St"
            }
        },
        "S": {
            "42 St Shuttle (Manhattan)": {
                "902": "Times Sq-42 St",
                "901": "Grand Central-42 St"
            },
            "Franklin Shuttle (Brooklyn)": {
                "S01": "Franklin Av",
                "D26": "Prospect Park"
            }
        }
    }"#;

    fn sample_source() -> StationSource {
        StationSource::from_json(SAMPLE).expect("sample is valid")
    }

    fn assert_directory_invariants(dir: &StationDirectory) {
        let indices: HashSet<usize> = dir.name_to_index.values().copied().collect();
        let expected: HashSet<usize> = (0..dir.station_names.len()).collect();
        assert_eq!(indices, expected, "indices must be 0..k");
        assert_eq!(dir.name_to_index.len(), dir.station_names.len());

        let name_keys: HashSet<&String> = dir.stop_id_to_name.keys().collect();
        let section_keys: HashSet<&String> = dir.stop_id_to_section.keys().collect();
        assert_eq!(name_keys, section_keys);

        let names: HashSet<&String> = dir.stop_id_to_name.values().collect();
        for name in dir.name_to_index.keys() {
            assert!(names.contains(name));
        }
    }

    #[test]
    fn test_source_preserves_order() {
        let source = sample_source();
        assert_eq!(source.route_count(), 3);
        let sections = source.sections("6").unwrap();
        assert_eq!(sections[0].name, "Bronx");
        assert_eq!(sections[1].name, "Manhattan");
        assert_eq!(sections[1].stops[2].0, "640");
    }

    #[test]
    fn test_build_indices_follow_walk_order() {
        let dir = StationDirectory::build(&sample_source(), "6");
        assert_eq!(dir.sections(), &["Bronx".to_string(), "Manhattan".to_string()]);
        assert_eq!(dir.station_index("Pelham Bay Park"), Some(0));
        assert_eq!(dir.station_index("125 St"), Some(2));
        assert_eq!(dir.station_index("Brooklyn Bridge-City Hall"), Some(4));
        assert_eq!(dir.station_name("631"), Some("Grand Central-42 St"));
        assert_eq!(dir.section_for("602"), Some("Bronx"));
        assert_directory_invariants(&dir);
    }

    #[test]
    fn test_duplicate_names_coalesce_to_first_index() {
        let dir = StationDirectory::build(&sample_source(), "4");
        assert_eq!(dir.station_names().len(), 4);
        assert_eq!(dir.station_index("Borough Hall"), Some(2));
        assert_eq!(dir.station_name("R28"), Some("Borough Hall"));
        assert_eq!(dir.station_index("Nevins St"), Some(3));
        assert_directory_invariants(&dir);
    }

    #[test]
    fn test_section_endpoints() {
        let dir = StationDirectory::build(&sample_source(), "6");
        assert_eq!(dir.section_endpoints["Bronx"], "Pelham Bay Park");
        assert_eq!(dir.section_endpoints["Manhattan"], "125 St");
    }

    #[test]
    fn test_unknown_route_is_empty() {
        let dir = StationDirectory::build(&sample_source(), "Z");
        assert!(dir.is_empty());
        assert!(dir.sections().is_empty());
        assert!(dir.station_names().is_empty());
        assert_eq!(dir.station_name("601"), None);
        assert_eq!(dir.station_index("125 St"), None);
        assert_eq!(dir.route(), "Z");
        assert_directory_invariants(&dir);
    }

    #[test]
    fn test_shuttle_alias_filters_to_one_section() {
        let dir = StationDirectory::build(&sample_source(), "GS");
        assert_eq!(dir.sections(), &["42 St Shuttle (Manhattan)".to_string()]);
        assert_eq!(dir.station_index("Times Sq-42 St"), Some(0));
        assert_eq!(dir.station_name("S01"), None);
        assert_directory_invariants(&dir);

        let dir = StationDirectory::build(&sample_source(), "FS");
        assert_eq!(dir.sections(), &["Franklin Shuttle (Brooklyn)".to_string()]);
        assert_eq!(dir.section_for("D26"), Some("Franklin Shuttle (Brooklyn)"));
    }

    #[test]
    fn test_shuttle_alias_missing_section_is_empty() {
        // Rockaway section is absent from the sample
        let dir = StationDirectory::build(&sample_source(), "H");
        assert!(dir.is_empty());
    }

    #[test]
    fn test_shuttle_section_table() {
        assert_eq!(shuttle_section("GS"), Some("42 St Shuttle (Manhattan)"));
        assert_eq!(shuttle_section("H"), Some("Rockaway Shuttle (Queens)"));
        assert_eq!(shuttle_section("S"), None);
        assert_eq!(shuttle_section("6"), None);
    }

    #[test]
    fn test_embedded_directory_loads() {
        let source = StationSource::embedded().expect("embedded data is valid");
        let dir = StationDirectory::build(&source, "6");
        assert!(!dir.is_empty());
        assert_eq!(dir.station_name("635"), Some("14 St-Union Sq"));
        assert_directory_invariants(&dir);

        for (alias, section) in SHUTTLE_SECTIONS {
            let dir = StationDirectory::build(&source, alias);
            assert_eq!(dir.sections(), &[section.to_string()]);
        }
    }

    #[test]
    fn test_embedded_flushing_and_crosstown() {
        let source = StationSource::embedded().unwrap();

        let dir = StationDirectory::build(&source, "7");
        assert_eq!(dir.sections(), &["Queens".to_string(), "Manhattan".to_string()]);
        assert_eq!(dir.station_index("Flushing-Main St"), Some(0));
        assert_eq!(dir.section_for("725"), Some("Manhattan"));
        assert_directory_invariants(&dir);

        let dir = StationDirectory::build(&source, "G");
        assert_eq!(dir.station_name("A42"), Some("Hoyt-Schermerhorn Sts"));
        assert_eq!(dir.section_for("G22"), Some("Queens"));
        assert_directory_invariants(&dir);
    }

    #[test]
    fn test_has_route() {
        let source = sample_source();
        assert!(source.has_route("6"));
        assert!(source.has_route("GS"));
        assert!(source.has_route("FS"));
        // Rockaway section is absent from the sample
        assert!(!source.has_route("H"));
        assert!(!source.has_route("Z"));

        let embedded = StationSource::embedded().unwrap();
        for route in ["6", "7", "L", "G", "GS", "FS", "H", "SI"] {
            assert!(embedded.has_route(route), "no data for {}", route);
        }
        assert!(!embedded.has_route("A"));
    }

    #[test]
    fn test_shape_errors() {
        let err = StationSource::from_json(r#"["6"]"#).unwrap_err();
        assert!(err.to_string().contains("shape"));

        let err = StationSource::from_json(r#"{"6": {"Bronx": {"601": 5}}}"#).unwrap_err();
        assert!(err.to_string().contains("601"));

        let err = StationSource::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
