//! Pulling files out of free-form model output.
//!
//! The model is asked to answer with fenced blocks whose opening fence names
//! the content type and the target file:
//!
//! ````text
//! ```csv:Football.csv
//! Date,Day,Opponent,...
//! ```
//! ````
//!
//! Extraction is a pure text → records function; writing happens elsewhere.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

// Only csv and html blocks carry files
static FENCED_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:csv|html):([^\n]+)\n(.*?)```")
        .expect("fenced file pattern is a valid regex")
});

/// One file recovered from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    pub filename: String,
    pub content: String,
}

/// Returns every well-formed fenced file block in source order.
///
/// # Behaviour
/// - Filename and body are trimmed of surrounding whitespace
/// - An unterminated block yields nothing
/// - The first closing fence ends a block, so a fence nested inside a body cuts it short
/// - Duplicate filenames are all returned; the caller decides which wins
pub fn extract_files(text: &str) -> Vec<ExtractedFile> {
    let files: Vec<ExtractedFile> = FENCED_FILE_RE
        .captures_iter(text)
        .map(|caps| ExtractedFile {
            filename: caps[1].trim().to_string(),
            content: caps[2].trim().to_string(),
        })
        .collect();

    for file in &files {
        info!("Extracted code block for file: {}", file.filename);
    }
    if files.is_empty() {
        warn!("No code blocks with filenames found in response");
    }

    files
}

/// Filenames that appear more than once, in first-seen order.
pub fn duplicate_filenames(files: &[ExtractedFile]) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::new();
    let mut duplicates: Vec<String> = Vec::new();
    for file in files {
        if seen.contains(&file.filename.as_str()) {
            if !duplicates.contains(&file.filename) {
                duplicates.push(file.filename.clone());
            }
        } else {
            seen.push(&file.filename);
        }
    }
    duplicates
}
