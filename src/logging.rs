use crate::cli::Args;
use crate::config::{BasePaths, Config};
use crate::constants::layout;
use crate::error::AppError;
use std::io::stdout;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Directory and file name prefix for the rolling log.
///
/// Precedence: `--log-file`, then `log_file_path` from config (which already
/// carries the `HUSKERS_LOG_FILE` override), then `<base>/logs/schedule_fetcher.log`.
pub fn resolve_log_location(
    args: &Args,
    config: &Config,
    paths: &BasePaths,
) -> (PathBuf, String) {
    let custom_log_path = args.log_file.as_ref().or(config.log_file_path.as_ref());
    match custom_log_path {
        Some(custom_path) => {
            let path = paths.resolve(custom_path);
            let parent = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| paths.base_dir().to_path_buf());
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(layout::LOG_FILE_NAME)
                .to_string();
            (parent, file_name)
        }
        None => (paths.log_dir(), layout::LOG_FILE_NAME.to_string()),
    }
}

fn env_filter(debug: bool) -> Result<EnvFilter, AppError> {
    let level = if debug { "debug" } else { "info" };
    let directive = format!("{}={level}", env!("CARGO_CRATE_NAME"))
        .parse()
        .map_err(|e| AppError::log_setup_error(format!("Invalid log directive: {e}")))?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

/// Sets up logging configuration for the application.
///
/// - Logs to stdout and to a daily rolling file, or to the file only with `--quiet`
/// - Creates the log directory if it doesn't exist
///
/// Returns the path to the log file and the guard that must be kept alive
/// for the duration of the program to ensure proper log flushing.
pub async fn setup_logging(
    args: &Args,
    config: &Config,
    paths: &BasePaths,
) -> Result<(String, WorkerGuard), AppError> {
    let (log_dir, log_file_name) = resolve_log_location(args, config, paths);

    if !log_dir.exists() {
        tokio::fs::create_dir_all(&log_dir).await.map_err(|e| {
            AppError::log_setup_error(format!("Failed to create log directory: {e}"))
        })?;
    }

    // A new file per day, suffixed with the date
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, &log_file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::Layer::new()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(env_filter(args.debug)?);

    let registry = tracing_subscriber::registry().with(file_layer);

    let init_result = if args.quiet {
        registry.try_init()
    } else {
        registry
            .with(
                fmt::Layer::new()
                    .with_writer(stdout)
                    .with_ansi(true)
                    .with_filter(env_filter(args.debug)?),
            )
            .try_init()
    };
    init_result.map_err(|e| AppError::log_setup_error(format!("Logger already set: {e}")))?;

    let log_file_path = log_dir.join(log_file_name).display().to_string();
    Ok((log_file_path, guard))
}
