use crate::cli::{Args, RunMode};
use crate::commands;
use crate::config::{BasePaths, Config};
use crate::error::AppError;
use std::process::ExitCode;
use tracing::{error, info};

/// Runs the mode selected on the command line.
///
/// Logging must already be initialised. Startup failures (missing
/// credential, unwritable output, missing prompt) surface as `Err` before
/// any request is sent.
pub async fn run(args: &Args, config: &Config, paths: &BasePaths) -> Result<ExitCode, AppError> {
    match args.mode() {
        RunMode::ListConfig => {
            commands::handle_list_config_command(config, paths).await?;
            Ok(ExitCode::SUCCESS)
        }
        RunMode::RenderOnly => {
            info!("Render-only mode: building the page from existing CSV files");
            if commands::handle_render_only_command(config, paths).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        RunMode::Fetch => {
            let summary = commands::handle_fetch_command(args, config, paths).await?;
            if summary.is_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                error!("No sport was fetched successfully");
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
