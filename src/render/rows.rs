//! Schedule rows: CSV loading and per-row HTML.

use super::escape_html;
use crate::error::AppError;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, warn};

/// Column order of every schedule CSV.
pub const CSV_HEADERS: [&str; 9] = [
    "Date", "Day", "Opponent", "Location", "Venue", "Time", "Event", "Watch", "Result",
];

const CELL_INDENT: &str = "                            ";
const ROW_INDENT: &str = "                        ";

/// One game. All fields are free text; nothing is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Opponent")]
    pub opponent: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Venue")]
    pub venue: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Watch")]
    pub watch: String,
    #[serde(rename = "Result")]
    pub result: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Home,
    Away,
    Neutral,
}

impl LocationKind {
    pub fn classify(location: &str) -> Self {
        let location = location.trim().to_lowercase();
        if location == "home" || location == "lincoln ne" {
            LocationKind::Home
        } else if ["neutral", "kansas city", "sioux falls"]
            .iter()
            .any(|needle| location.contains(needle))
        {
            LocationKind::Neutral
        } else {
            LocationKind::Away
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            LocationKind::Home => "home-game",
            LocationKind::Away => "away-game",
            LocationKind::Neutral => "neutral-game",
        }
    }
}

impl GameRow {
    pub fn is_completed(&self) -> bool {
        !self.result.trim().is_empty()
    }

    pub fn status_class(&self) -> &'static str {
        if self.is_completed() {
            "game-completed"
        } else {
            "game-upcoming"
        }
    }

    pub fn location_kind(&self) -> LocationKind {
        LocationKind::classify(&self.location)
    }

    /// Renders the Result cell contents.
    pub fn result_html(&self) -> String {
        let result = self.result.trim();
        if result.is_empty() {
            "<span class=\"result-upcoming\">—</span>".to_string()
        } else if result.starts_with('W') {
            format!("<span class=\"result-win\">{}</span>", escape_html(result))
        } else if result.starts_with('L') {
            format!("<span class=\"result-loss\">{}</span>", escape_html(result))
        } else {
            escape_html(result)
        }
    }

    /// Renders the whole `<tr>` including trailing newline.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(
            html,
            "{ROW_INDENT}<tr class=\"{} {}\">",
            self.status_class(),
            self.location_kind().css_class()
        );
        for value in [
            self.date.as_str(),
            self.day.as_str(),
            self.opponent.as_str(),
            self.location.trim(),
            self.venue.as_str(),
            self.time.as_str(),
        ] {
            let _ = writeln!(html, "{CELL_INDENT}<td>{}</td>", escape_html(value));
        }
        let _ = writeln!(html, "{CELL_INDENT}{}", badge_cell(&self.event, "event-badge"));
        let _ = writeln!(html, "{CELL_INDENT}{}", badge_cell(&self.watch, "watch-channel"));
        let _ = writeln!(html, "{CELL_INDENT}<td>{}</td>", self.result_html());
        let _ = writeln!(html, "{ROW_INDENT}</tr>");
        html
    }
}

fn badge_cell(value: &str, class: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        "<td></td>".to_string()
    } else {
        format!("<td><span class=\"{class}\">{}</span></td>", escape_html(value))
    }
}

/// Reads a schedule CSV.
///
/// Returns `Ok(None)` when the file does not exist. Short rows are padded with
/// empty fields and extra columns are ignored; a record that cannot be decoded
/// is skipped with a warning. I/O failures abort the read.
pub fn read_game_rows(path: &Path) -> Result<Option<Vec<GameRow>>, AppError> {
    if !path.exists() {
        debug!("No schedule file at {}", path.display());
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<GameRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => warn!(
                "Skipping record {} in {}: {e}",
                index + 1,
                path.display()
            ),
        }
    }
    Ok(Some(rows))
}
