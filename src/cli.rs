use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use std::path::PathBuf;

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .usage(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Yellow.on_default())
        .error(AnsiColor::Red.on_default().effects(Effects::BOLD))
        .valid(AnsiColor::Green.on_default())
        .invalid(AnsiColor::Red.on_default())
}

/// Run modes selected by the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Fetch,
    RenderOnly,
    ListConfig,
}

/// Nebraska Cornhuskers schedule fetcher
///
/// Asks the Anthropic Messages API (with web search) for each configured
/// sport's schedule, saves the returned CSV files, and builds a static
/// HTML page from them.
///
/// Requires ANTHROPIC_API_KEY unless --render-only or --list-config is used.
#[derive(Parser, Debug, Default)]
#[command(about, long_about = None, version)]
#[command(styles = get_styles())]
pub struct Args {
    /// Directory holding config/, the prompt template, tmp/, logs/ and the output directory.
    /// Defaults to the current directory.
    #[arg(long = "base-dir", short = 'b', value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Only fetch the named sport. Repeat to fetch several.
    /// The generated page still lists every configured sport.
    #[arg(long = "sport", short = 's', value_name = "NAME", help_heading = "Fetching")]
    pub sports: Vec<String>,

    /// Skip fetching and rebuild the HTML page from existing CSV files.
    /// No API key is needed in this mode.
    #[arg(long = "render-only", short = 'r', help_heading = "Fetching")]
    pub render_only: bool,

    /// List current configuration settings
    #[arg(long = "list-config", short = 'l', help_heading = "Configuration")]
    pub list_config: bool,

    /// Specify a custom log file path. If not provided, logs will be written to the default location.
    #[arg(long = "log-file", help_heading = "Logging")]
    pub log_file: Option<String>,

    /// Log to the file only, not to stdout.
    #[arg(long = "quiet", short = 'q', help_heading = "Logging")]
    pub quiet: bool,

    /// Enable debug-level logging for this crate.
    #[arg(long = "debug", help_heading = "Logging")]
    pub debug: bool,
}

impl Args {
    pub fn mode(&self) -> RunMode {
        if self.list_config {
            RunMode::ListConfig
        } else if self.render_only {
            RunMode::RenderOnly
        } else {
            RunMode::Fetch
        }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
