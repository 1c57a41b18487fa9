// src/config.rs
// =============================================================================
// Runtime settings for one audit run.
//
// The values come from the command line (or ROBOTS_AUDIT_* environment
// variables, see cli.rs). They are resolved once in main, then passed down by
// reference. Nothing changes them after that.
// =============================================================================

use crate::cli::Cli;
use crate::sheet::{check_output_path, SheetFormat};
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

// Identifies the tool to the sites we check
pub const DEFAULT_USER_AGENT: &str = concat!(
    "Mozilla/5.0 (compatible; robots-audit/",
    env!("CARGO_PKG_VERSION"),
    ")"
);

// Client timeout: bounds the HTTP exchange
pub const DEFAULT_TRANSPORT_TIMEOUT_SECS: u64 = 20;

// Job deadline: bounds the whole call, must be the larger of the two
pub const DEFAULT_DEADLINE_SECS: u64 = 25;

// Settings the fetcher needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub user_agent: String,
    pub transport_timeout: Duration,
    pub deadline: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            transport_timeout: Duration::from_secs(DEFAULT_TRANSPORT_TIMEOUT_SECS),
            deadline: Duration::from_secs(DEFAULT_DEADLINE_SECS),
        }
    }
}

// Everything one run needs
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    /// None means "pick from the number of CPUs"
    pub workers: Option<usize>,
    pub fetch: FetchConfig,
    pub json: bool,
}

impl AuditConfig {
    // Resolves defaults and checks the values make sense together
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.timeout_secs == 0 || cli.deadline_secs == 0 {
            bail!("timeouts must be at least 1 second");
        }
        if cli.deadline_secs < cli.timeout_secs {
            bail!(
                "--deadline-secs ({}) must not be shorter than --timeout-secs ({})",
                cli.deadline_secs,
                cli.timeout_secs
            );
        }
        if cli.workers == Some(0) {
            bail!("--workers must be at least 1");
        }

        let output = match &cli.output {
            Some(path) => path.clone(),
            None => default_output_path(&cli.input),
        };
        // Fail now rather than after every URL has been fetched
        check_output_path(&output)?;

        Ok(Self {
            input: cli.input.clone(),
            output,
            workers: cli.workers,
            fetch: FetchConfig {
                user_agent: cli.user_agent.clone(),
                transport_timeout: Duration::from_secs(cli.timeout_secs),
                deadline: Duration::from_secs(cli.deadline_secs),
            },
            json: cli.json,
        })
    }
}

// "List-Link.xlsx" -> "List-Link_RESULT.xlsx", next to the input
//
// Workbooks of any kind come out as .xlsx, everything else as .csv.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "links".to_string());
    let extension = SheetFormat::from_path(input).output_extension();
    input.with_file_name(format!("{}_RESULT.{}", stem, extension))
}
