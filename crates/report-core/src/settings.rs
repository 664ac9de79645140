use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Service-level report for customer-support ticket exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ticket-report",
    about = "Service-level report for customer-support ticket exports",
    version
)]
pub struct Settings {
    /// Export files (CSV) or directories containing them
    #[arg(required_unless_present = "dump_config")]
    pub inputs: Vec<PathBuf>,

    /// Pipeline configuration file (JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Only analyse these channels (repeatable or comma-separated)
    #[arg(long = "channel", value_delimiter = ',')]
    pub channels: Option<Vec<String>>,

    /// Only analyse these brand lines (repeatable or comma-separated)
    #[arg(long = "brand-line", value_delimiter = ',')]
    pub brand_lines: Option<Vec<String>>,

    /// Include tickets that are not closed yet
    #[arg(long)]
    pub include_open: bool,

    /// Output format
    #[arg(long, default_value = "xlsx", value_parser = ["xlsx", "csv", "json"])]
    pub format: String,

    /// Output directory
    #[arg(long, short, default_value = "report")]
    pub output: PathBuf,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Print the effective pipeline configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,
}

impl Settings {
    /// Parse process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::resolve(Self::parse())
    }

    /// Same as [`Settings::load`] with an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::resolve(Self::parse_from(args))
    }

    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
