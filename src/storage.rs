//! Output and scratch directories for a fetch run.

use crate::error::AppError;
use crate::extract::{ExtractedFile, duplicate_filenames};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const WRITE_CHECK_FILE_NAME: &str = ".write_check";

/// Files written for one sport, plus the names that were refused.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: Vec<PathBuf>,
    pub rejected: Vec<String>,
}

impl WriteSummary {
    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct OutputStore {
    output_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl OutputStore {
    pub fn new(output_dir: impl Into<PathBuf>, tmp_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tmp_dir: tmp_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    /// Creates both directories and proves they are writable.
    ///
    /// Runs before any network call, so a read-only target fails the run
    /// without spending an API request.
    pub async fn prepare(&self) -> Result<(), AppError> {
        for dir in [&self.output_dir, &self.tmp_dir] {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::permission(dir.display().to_string(), e.to_string()))?;
            check_writable(dir).await?;
            debug!("Directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Writes the raw combined response to `tmp/` before any parsing happens.
    pub async fn save_raw_response(&self, sport: &str, text: &str) -> Result<PathBuf, AppError> {
        self.save_raw_response_at(sport, text, Local::now()).await
    }

    pub async fn save_raw_response_at(
        &self,
        sport: &str,
        text: &str,
        now: DateTime<Local>,
    ) -> Result<PathBuf, AppError> {
        let file_name = raw_response_file_name(sport, now);
        let path = self.tmp_dir.join(file_name);
        atomic_write(&path, text.as_bytes()).await?;
        info!("Saved raw response ({} bytes) to {}", text.len(), path.display());
        Ok(path)
    }

    /// Writes each extracted file into the output directory.
    ///
    /// Names failing [`validate_filename`] are skipped. Repeated names are
    /// written in order, so the last block wins.
    pub async fn write_files(&self, files: &[ExtractedFile]) -> Result<WriteSummary, AppError> {
        for name in duplicate_filenames(files) {
            warn!("File {name} appears more than once in the response; the last block wins");
        }

        let mut summary = WriteSummary::default();
        for file in files {
            if let Err(reason) = validate_filename(&file.filename) {
                warn!("Refusing to write {:?}: {reason}", file.filename);
                summary.rejected.push(file.filename.clone());
                continue;
            }

            let path = self.output_dir.join(&file.filename);
            atomic_write(&path, file.content.as_bytes()).await?;
            info!("Saved file: {}", path.display());
            if !summary.written.contains(&path) {
                summary.written.push(path);
            }
        }
        Ok(summary)
    }

    /// Removes files and directories in `tmp/` last modified longer ago than
    /// `retention`. Returns how many entries were removed.
    pub async fn cleanup_tmp(&self, retention: Duration) -> Result<usize, AppError> {
        let cutoff = SystemTime::now()
            .checked_sub(retention)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut entries = match fs::read_dir(&self.tmp_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }
            let path = entry.path();
            let result = if metadata.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            match result {
                Ok(()) => removed += 1,
                Err(e) => warn!("Could not remove {}: {e}", path.display()),
            }
        }

        if removed > 0 {
            info!("Removed {removed} old entries from {}", self.tmp_dir.display());
        }
        Ok(removed)
    }
}

/// Checks that a model-supplied name is a plain file name inside the output directory.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("empty file name".to_string());
    }
    if name == "." || name == ".." {
        return Err("not a file name".to_string());
    }
    if name.contains('\0') {
        return Err("contains a NUL byte".to_string());
    }
    if name.contains('/') || name.contains('\\') {
        return Err("contains a path separator".to_string());
    }
    if Path::new(name).is_absolute() {
        return Err("absolute path".to_string());
    }
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err("drive prefix".to_string());
    }
    Ok(())
}

/// Lowercase ASCII slug: "Men's Basketball" → "men_s_basketball".
pub fn sport_slug(sport: &str) -> String {
    let mut slug = String::with_capacity(sport.len());
    for c in sport.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_').to_string();
    if slug.is_empty() {
        "sport".to_string()
    } else {
        slug
    }
}

pub fn raw_response_file_name(sport: &str, now: DateTime<Local>) -> String {
    format!(
        "response_{}_{}.txt",
        sport_slug(sport),
        now.format("%Y%m%d_%H%M%S")
    )
}

async fn check_writable(dir: &Path) -> Result<(), AppError> {
    let marker = dir.join(WRITE_CHECK_FILE_NAME);
    let to_permission = |e: std::io::Error| {
        AppError::permission(dir.display().to_string(), format!("directory is not writable: {e}"))
    };
    fs::write(&marker, b"ok").await.map_err(to_permission)?;
    fs::remove_file(&marker).await.map_err(to_permission)?;
    Ok(())
}

/// Writes through a sibling temp file and renames it into place.
async fn atomic_write(path: &Path, content: &[u8]) -> Result<(), AppError> {
    let parent = path
        .parent()
        .ok_or_else(|| AppError::config_error(format!("{} has no parent directory", path.display())))?;
    fs::create_dir_all(parent).await?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));

    let result = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = result {
        // Never leave a partial temp file behind
        let _ = fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    Ok(())
}
