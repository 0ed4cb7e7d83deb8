use crate::anthropic::{
    AnthropicClient, CompletionStatus, ConversationDriver, MessageParams, MessagesApi,
};
use crate::cli::Args;
use crate::config::{BasePaths, Config, SportSpec, load_sports};
use crate::error::AppError;
use crate::extract::extract_files;
use crate::prompt::{load_template, prompt_for_sport};
use crate::render::{partition_by_csv, write_page};
use crate::storage::OutputStore;
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{Instrument, error, info, info_span, warn};

/// What happened to one sport during a fetch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SportStatus {
    /// At least one file was written.
    Saved {
        files: Vec<PathBuf>,
        completion: CompletionStatus,
    },
    /// The model answered but nothing usable could be extracted.
    NoFiles,
    /// The fetch failed with an error.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SportReport {
    pub name: String,
    pub status: SportStatus,
}

impl SportReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.status, SportStatus::Saved { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<SportReport>,
    pub html_path: Option<PathBuf>,
}

impl RunSummary {
    pub fn succeeded(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| r.succeeded())
            .map(|r| r.name.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter(|r| !r.succeeded())
            .map(|r| r.name.as_str())
            .collect()
    }

    /// A run counts as successful when at least one sport was saved.
    pub fn is_success(&self) -> bool {
        self.reports.iter().any(SportReport::succeeded)
    }
}

/// Everything a fetch run needs once startup checks have passed.
pub struct FetchPlan<'a> {
    pub config: &'a Config,
    pub store: &'a OutputStore,
    pub template: &'a str,
    /// Every configured sport; the page lists all of them.
    pub sports: &'a [SportSpec],
    /// The sports to fetch in this run.
    pub selected: &'a [SportSpec],
}

/// Restricts the run to the named sports (case-insensitive).
/// An empty filter selects every sport; an unknown name is a configuration error.
pub fn select_sports(sports: &[SportSpec], names: &[String]) -> Result<Vec<SportSpec>, AppError> {
    if names.is_empty() {
        return Ok(sports.to_vec());
    }

    let mut selected = Vec::new();
    for name in names {
        let sport = sports
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                let known: Vec<&str> = sports.iter().map(|s| s.name.as_str()).collect();
                AppError::config_error(format!(
                    "Unknown sport '{name}'. Configured sports: {}",
                    known.join(", ")
                ))
            })?;
        if !selected.contains(sport) {
            selected.push(sport.clone());
        }
    }
    Ok(selected)
}

/// Handles the default fetch run.
///
/// Every check that can fail without touching the network runs first:
/// sports list, credential, output directories, prompt template.
pub async fn handle_fetch_command(
    args: &Args,
    config: &Config,
    paths: &BasePaths,
) -> Result<RunSummary, AppError> {
    let sports = load_sports(&paths.sports_file()).await?;
    let selected = select_sports(&sports, &args.sports)?;
    let api_key = Config::api_key_from_env()?;

    let store = OutputStore::new(config.output_dir_path(paths), paths.tmp_dir());
    store.prepare().await?;

    let template = load_template(&config.prompt_file_path(paths)).await?;

    let client = AnthropicClient::new(config, api_key)?;
    info!("Using model {} via {}", config.model, client.messages_url());
    let driver = ConversationDriver::new(client, MessageParams::from_config(config));

    let plan = FetchPlan {
        config,
        store: &store,
        template: &template,
        sports: &sports,
        selected: &selected,
    };
    run_fetch(&driver, &plan).await
}

/// Fetches the selected sports one after another, then builds the page.
pub async fn run_fetch<A: MessagesApi>(
    driver: &ConversationDriver<A>,
    plan: &FetchPlan<'_>,
) -> Result<RunSummary, AppError> {
    let delay = plan.config.delay_between_sports();
    let total = plan.selected.len();
    let mut summary = RunSummary::default();

    for (index, sport) in plan.selected.iter().enumerate() {
        info!("Fetching {} ({}/{total})", sport.name, index + 1);

        let span = info_span!("sport", name = %sport.name);
        let status = match fetch_sport(driver, plan.store, plan.template, sport)
            .instrument(span)
            .await
        {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to fetch {}: {e}", sport.name);
                SportStatus::Failed(e.to_string())
            }
        };
        summary.reports.push(SportReport {
            name: sport.name.clone(),
            status,
        });

        if index + 1 < total {
            pause(delay, "before next sport").await;
        }
    }

    pause(delay, "before generating HTML").await;

    if let Err(e) = plan.store.cleanup_tmp(plan.config.tmp_retention()).await {
        warn!("Could not clean up {}: {e}", plan.store.tmp_dir().display());
    }

    match write_page(
        plan.store.output_dir(),
        &plan.config.html_filename,
        plan.sports,
        Local::now(),
    )
    .await
    {
        Ok(path) => summary.html_path = Some(path),
        Err(e) => error!("Failed to generate HTML page: {e}"),
    }

    log_summary(&summary);
    Ok(summary)
}

async fn fetch_sport<A: MessagesApi>(
    driver: &ConversationDriver<A>,
    store: &OutputStore,
    template: &str,
    sport: &SportSpec,
) -> Result<SportStatus, AppError> {
    let prompt = prompt_for_sport(template, sport);
    let outcome = driver.run(&prompt).await?;

    match &outcome.status {
        CompletionStatus::Final => {}
        CompletionStatus::Truncated => warn!("Response hit max_tokens and may be incomplete"),
        CompletionStatus::UnexpectedStop(reason) => {
            warn!("Response ended with unexpected stop reason: {reason}")
        }
        CompletionStatus::IterationLimit => warn!(
            "Gave up continuing after {} iterations, using the last response",
            outcome.iterations
        ),
    }

    let text = outcome.assistant_text();
    store.save_raw_response(&sport.name, &text).await?;

    let files = extract_files(&text);
    if files.is_empty() {
        warn!("No files found in response for {}", sport.name);
        return Ok(SportStatus::NoFiles);
    }

    let written = store.write_files(&files).await?;
    if written.is_empty() {
        warn!("Every file in the response for {} was rejected", sport.name);
        return Ok(SportStatus::NoFiles);
    }

    if !files.iter().any(|f| f.filename == sport.filename) {
        warn!(
            "Response did not include {}; the page will show a placeholder for {}",
            sport.filename, sport.name
        );
    }

    info!("Saved {} file(s) for {}", written.written.len(), sport.name);
    Ok(SportStatus::Saved {
        files: written.written,
        completion: outcome.status,
    })
}

async fn pause(delay: Duration, reason: &str) {
    if delay.is_zero() {
        return;
    }
    info!("Waiting {} seconds {reason}...", delay.as_secs());
    tokio::time::sleep(delay).await;
}

fn log_summary(summary: &RunSummary) {
    let succeeded = summary.succeeded();
    let failed = summary.failed();
    info!(
        "Fetch complete: {} succeeded, {} failed",
        succeeded.len(),
        failed.len()
    );
    if !succeeded.is_empty() {
        info!("Successful: {}", succeeded.join(", "));
    }
    if !failed.is_empty() {
        warn!("Failed: {}", failed.join(", "));
    }
    if let Some(path) = &summary.html_path {
        info!("Schedule page: {}", path.display());
    }
}

/// Handles `--render-only`: rebuilds the page from whatever CSV files exist.
///
/// Returns `Ok(false)` when there is nothing to render.
pub async fn handle_render_only_command(
    config: &Config,
    paths: &BasePaths,
) -> Result<bool, AppError> {
    let sports = load_sports(&paths.sports_file()).await?;
    let output_dir = config.output_dir_path(paths);

    let (found, missing) = partition_by_csv(&output_dir, &sports);
    for sport in &found {
        info!("Found {} for {}", sport.filename, sport.name);
    }
    for sport in &missing {
        warn!("Missing {} for {}", sport.filename, sport.name);
    }

    if found.is_empty() {
        error!("No schedule CSV files found in {}", output_dir.display());
        return Ok(false);
    }

    let path = write_page(&output_dir, &config.html_filename, &sports, Local::now()).await?;
    info!(
        "Rendered {} of {} sports into {}",
        found.len(),
        sports.len(),
        path.display()
    );
    Ok(true)
}

/// Handles `--list-config`.
pub async fn handle_list_config_command(
    config: &Config,
    paths: &BasePaths,
) -> Result<(), AppError> {
    config.display(paths);

    let sports = load_sports(&paths.sports_file()).await?;
    println!("────────────────────────────────────");
    println!("Sports ({}):", sports.len());
    for sport in &sports {
        println!("  {:<20} {}", sport.name, sport.filename);
    }
    Ok(())
}
