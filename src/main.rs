// src/main.rs
use clap::Parser;
use huskers_schedule::app;
use huskers_schedule::cli::Args;
use huskers_schedule::config::{BasePaths, Config};
use huskers_schedule::logging::setup_logging;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let paths = BasePaths::new(args.base_dir());

    // Config comes first since it may name the log file
    let config = match Config::load(&paths).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match setup_logging(&args, &config, &paths).await {
        Ok((log_file_path, guard)) => {
            info!("Logs are being written to: {log_file_path}");
            guard
        }
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if !paths.config_file().exists() {
        warn!(
            "No config file at {}, built-in defaults in use",
            paths.config_file().display()
        );
    }

    match app::run(&args, &config, &paths).await {
        Ok(code) => code,
        Err(e) => {
            if e.is_startup_fatal() {
                error!("Startup check failed, nothing was fetched: {e}");
            } else {
                error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
