use crate::constants::layout;
use std::path::{Path, PathBuf};

/// Resolved locations of every file and directory the application touches.
///
/// Everything hangs off a single base directory (the current directory unless
/// `--base-dir` is given), matching the layout:
///
/// ```text
/// <base>/config/config.json
/// <base>/config/sports.json
/// <base>/prompt-schedule-getter.txt
/// <base>/output/
/// <base>/tmp/
/// <base>/logs/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePaths {
    base_dir: PathBuf,
}

impl BasePaths {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Returns the path of `config.json`.
    pub fn config_file(&self) -> PathBuf {
        self.base_dir
            .join(layout::CONFIG_DIR)
            .join(layout::CONFIG_FILE)
    }

    /// Returns the path of `sports.json`.
    pub fn sports_file(&self) -> PathBuf {
        self.base_dir
            .join(layout::CONFIG_DIR)
            .join(layout::SPORTS_FILE)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.base_dir.join(layout::TMP_DIR)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join(layout::LOG_DIR)
    }

    /// Resolves a possibly relative path against the base directory.
    /// Absolute paths are returned unchanged.
    pub fn resolve(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.base_dir.join(candidate)
        }
    }
}
