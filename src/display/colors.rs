/// RGB color tuple.
pub type Rgb = (u8, u8, u8);

// MTA Official Route Colors (RGB)
// IRT Broadway-Seventh Avenue Line
pub const COLOR_123: Rgb = (216, 34, 51);
// IRT Lexington Avenue Line
pub const COLOR_456: Rgb = (0, 153, 82);
// IRT Flushing Line
pub const COLOR_7: Rgb = (154, 56, 161);
// Shuttles and the BMT Canarsie Line
pub const COLOR_GRAY: Rgb = (124, 133, 140);
// IND Eighth Avenue Line
pub const COLOR_ACE: Rgb = (0, 98, 207);
// IND Sixth Avenue Line
pub const COLOR_BDFM: Rgb = (235, 104, 0);
// IND Crosstown Line
pub const COLOR_G: Rgb = (121, 149, 52);
// BMT Nassau Street Line
pub const COLOR_JZ: Rgb = (142, 92, 51);
// BMT Broadway Line
pub const COLOR_NQRW: Rgb = (246, 188, 38);
// Staten Island Railway
pub const COLOR_SIR: Rgb = (8, 23, 156);

pub const COLOR_WHITE: Rgb = (255, 255, 255);
pub const COLOR_BLACK: Rgb = (0, 0, 0);

const RESET: &str = "\x1b[0m";

/// Get the badge background color for a route.
pub fn route_color(route: &str) -> Option<Rgb> {
    let color = match route {
        "1" | "2" | "3" => COLOR_123,
        "4" | "5" | "5X" | "6" | "6X" => COLOR_456,
        "7" | "7X" => COLOR_7,
        "GS" | "FS" | "H" | "L" => COLOR_GRAY,
        "A" | "C" | "E" => COLOR_ACE,
        "B" | "D" | "F" | "FX" | "M" => COLOR_BDFM,
        "G" => COLOR_G,
        "J" | "Z" => COLOR_JZ,
        "N" | "Q" | "R" | "W" => COLOR_NQRW,
        "SI" => COLOR_SIR,
        _ => return None,
    };
    Some(color)
}

/// Badge text color: black on the yellow Broadway Line, white elsewhere.
pub fn route_text_color(route: &str) -> Rgb {
    match route {
        "N" | "Q" | "R" | "W" => COLOR_BLACK,
        _ => COLOR_WHITE,
    }
}

/// ANSI styling for one route's terminal output. Disabled styles emit plain text.
#[derive(Debug, Clone)]
pub struct RouteStyle {
    badge: Option<String>,
    enabled: bool,
}

impl RouteStyle {
    pub fn for_route(route: &str, enabled: bool) -> Self {
        let badge = route_color(route).map(|(r, g, b)| {
            let (fr, fg, fb) = route_text_color(route);
            format!(
                "\x1b[1m\x1b[38;2;{};{};{}m\x1b[48;2;{};{};{}m",
                fr, fg, fb, r, g, b
            )
        });
        RouteStyle { badge, enabled }
    }

    /// Route-colored badge.
    pub fn badge(&self, text: &str) -> String {
        match (&self.badge, self.enabled) {
            (Some(code), true) => format!("{}{}{}", code, text, RESET),
            _ => text.to_string(),
        }
    }

    /// Bold underline, for section headers.
    pub fn heading(&self, text: &str) -> String {
        self.paint("\x1b[1;4m", text)
    }

    /// Bold on blue, for trip ids.
    pub fn trip(&self, text: &str) -> String {
        self.paint("\x1b[1;44m", text)
    }

    /// Bold yellow, for vehicle status.
    pub fn status(&self, text: &str) -> String {
        self.paint("\x1b[1;33m", text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{}{}{}", code, text, RESET)
        } else {
            text.to_string()
        }
    }
}
