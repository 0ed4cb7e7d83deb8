//! Sports list loading
//!
//! The sports list names every sport to fetch and the CSV file its schedule
//! lives in. It is read once at startup and never changes during a run.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

/// One configured sport and the CSV file holding its schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SportSpec {
    pub name: String,
    pub filename: String,
}

impl SportSpec {
    pub fn new(name: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
        }
    }
}

/// `sports.json` is accepted both wrapped (`{"sports": [...]}`) and as a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SportsFile {
    Wrapped { sports: Vec<SportSpec> },
    List(Vec<SportSpec>),
}

impl SportsFile {
    fn into_sports(self) -> Vec<SportSpec> {
        match self {
            SportsFile::Wrapped { sports } => sports,
            SportsFile::List(sports) => sports,
        }
    }
}

/// The built-in six-sport list used when no sports file exists.
pub fn default_sports() -> Vec<SportSpec> {
    vec![
        SportSpec::new("Football", "Football.csv"),
        SportSpec::new("Baseball", "Baseball.csv"),
        SportSpec::new("Softball", "Softball.csv"),
        SportSpec::new("Men's Basketball", "MensBasketball.csv"),
        SportSpec::new("Women's Basketball", "WomensBasketball.csv"),
        SportSpec::new("Volleyball", "Volleyball.csv"),
    ]
}

/// Parses sports list JSON in either accepted shape.
pub fn parse_sports(content: &str) -> Result<Vec<SportSpec>, AppError> {
    let sports = serde_json::from_str::<SportsFile>(content)?.into_sports();

    if sports.is_empty() {
        return Err(AppError::config_error("Sports list is empty"));
    }
    if let Some(sport) = sports
        .iter()
        .find(|s| s.name.trim().is_empty() || s.filename.trim().is_empty())
    {
        return Err(AppError::config_error(format!(
            "Sports entry needs both a name and a filename: {sport:?}"
        )));
    }

    Ok(sports)
}

/// Loads the sports list, falling back to [`default_sports`] when the file is absent.
pub async fn load_sports(path: &Path) -> Result<Vec<SportSpec>, AppError> {
    if !path.exists() {
        warn!(
            "Sports file not found at {}, using built-in sports list",
            path.display()
        );
        return Ok(default_sports());
    }

    let content = fs::read_to_string(path).await?;
    let sports = parse_sports(&content)?;
    info!("Loaded {} sports from {}", sports.len(), path.display());
    Ok(sports)
}
