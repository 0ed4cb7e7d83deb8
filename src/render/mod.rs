//! Static schedule page built from the per-sport CSV files.
//!
//! Rendering never fails because of one sport: a missing, empty or unreadable
//! CSV turns into a "not yet available" section.

pub mod page;
pub mod rows;

pub use rows::{CSV_HEADERS, GameRow, LocationKind, read_game_rows};

use crate::config::SportSpec;
use crate::error::AppError;
use chrono::{DateTime, Datelike, Local};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Emoji shown in front of known sport names.
pub fn sport_emoji(sport_name: &str) -> &'static str {
    match sport_name {
        "Football" => "🏈",
        "Volleyball" => "🏐",
        "Men's Basketball" | "Women's Basketball" => "🏀",
        "Softball" => "🥎",
        "Baseball" => "⚾",
        _ => "",
    }
}

/// Escapes text for use inside element content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders one sport's section from `<csv_dir>/<filename>`.
pub fn render_sport_section(csv_dir: &Path, sport: &SportSpec) -> String {
    let emoji = sport_emoji(&sport.name);
    let path = csv_dir.join(&sport.filename);

    match read_game_rows(&path) {
        Ok(Some(games)) if !games.is_empty() => {
            info!("Rendering {} game(s) for {}", games.len(), sport.name);
            page::table_section(&sport.name, emoji, &games)
        }
        Ok(Some(_)) => {
            warn!("{} has no games, showing placeholder", path.display());
            page::placeholder_section(&sport.name, emoji)
        }
        Ok(None) => {
            info!("No schedule for {}, showing placeholder", sport.name);
            page::placeholder_section(&sport.name, emoji)
        }
        Err(e) => {
            warn!("Could not read {}: {e}", path.display());
            page::placeholder_section(&sport.name, emoji)
        }
    }
}

/// Builds the full document. `now` stamps the title season and the banner.
pub fn render_document(csv_dir: &Path, sports: &[SportSpec], now: DateTime<Local>) -> String {
    let year = now.year();
    let last_updated = now.format("%B %d, %Y").to_string();

    let mut html = page::document_head(year, &last_updated);
    for sport in sports {
        html.push_str(&render_sport_section(csv_dir, sport));
    }
    html.push_str(&page::document_foot(year));
    html
}

/// Renders the page and saves it as `<output_dir>/<html_filename>`.
pub async fn write_page(
    output_dir: &Path,
    html_filename: &str,
    sports: &[SportSpec],
    now: DateTime<Local>,
) -> Result<PathBuf, AppError> {
    let html = render_document(output_dir, sports, now);
    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(html_filename);
    tokio::fs::write(&path, html).await?;
    info!("HTML page generated: {}", path.display());
    Ok(path)
}

/// Splits configured sports by whether their CSV exists.
pub fn partition_by_csv<'a>(
    csv_dir: &Path,
    sports: &'a [SportSpec],
) -> (Vec<&'a SportSpec>, Vec<&'a SportSpec>) {
    sports
        .iter()
        .partition(|sport| csv_dir.join(&sport.filename).is_file())
}
