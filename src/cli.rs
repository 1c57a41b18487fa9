// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every option can also be set through an environment variable
// (ROBOTS_AUDIT_WORKERS, ROBOTS_AUDIT_TIMEOUT_SECS, ...) which is handy in CI.
// =============================================================================

use crate::config::{DEFAULT_DEADLINE_SECS, DEFAULT_TRANSPORT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "robots-audit",
    version,
    about = "Audit a list of URLs for noindex / nofollow directives",
    long_about = "robots-audit reads an Excel workbook or CSV file with a 'Link' column, fetches every URL concurrently \
                  and reports whether the page excludes itself from search engines through the \
                  X-Robots-Tag header or a robots / googlebot meta tag. The verdict is written \
                  to a 'Result' column in a copy of the file."
)]
pub struct Cli {
    /// Workbook (.xlsx) or CSV file with a header row containing a "Link" column
    #[arg(default_value = "List-Link.xlsx", env = "ROBOTS_AUDIT_INPUT")]
    pub input: PathBuf,

    /// Where to write the results (default: <input>_RESULT.xlsx or .csv)
    #[arg(env = "ROBOTS_AUDIT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Number of concurrent workers (default: number of CPUs, at least 4)
    #[arg(long, short = 'w', env = "ROBOTS_AUDIT_WORKERS")]
    pub workers: Option<usize>,

    /// HTTP client timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TRANSPORT_TIMEOUT_SECS, env = "ROBOTS_AUDIT_TIMEOUT_SECS")]
    pub timeout_secs: u64,

    /// Deadline for one URL in seconds, redirects and body included
    #[arg(long, default_value_t = DEFAULT_DEADLINE_SECS, env = "ROBOTS_AUDIT_DEADLINE_SECS")]
    pub deadline_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT, env = "ROBOTS_AUDIT_USER_AGENT")]
    pub user_agent: String,

    /// Print results as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    pub quiet: bool,
}
