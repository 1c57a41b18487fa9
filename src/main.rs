// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Read the link list (XLSX or CSV) and turn every row into a Job
// 3. Run the jobs through the worker pool
// 4. Write each verdict back into its row, save the file, print a report
// 5. Exit with proper code (0 = all clean, 1 = excluded/failed pages, 2 = error)
// =============================================================================

mod checker;
mod cli;
mod config;
mod pool;
mod report;
mod sheet;
mod telemetry;

use anyhow::{Context, Result};
use checker::{AuditResult, HttpFetcher, PageFetcher};
use clap::Parser;
use cli::Cli;
use config::AuditConfig;
use futures::StreamExt;
use report::Summary;
use sheet::Sheet;
use std::sync::Arc;
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.quiet);

    let exit_code = match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: &Cli) -> Result<i32> {
    let config = AuditConfig::from_cli(cli)?;

    let mut sheet = Sheet::read(&config.input)?;
    let jobs = sheet.jobs();
    let total = jobs.len();

    if !config.json {
        println!("🔍 Auditing {} link(s) from {}", total, config.input.display());
    }
    if total < sheet.data_rows() {
        info!(skipped = sheet.data_rows() - total, "rows without a link were skipped");
    }

    // One client for the whole run, shared by every worker
    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new(&config.fetch).context("could not build the HTTP client")?);

    let workers = pool::pool_size(config.workers);
    info!(
        workers,
        jobs = total,
        deadline_secs = config.fetch.deadline.as_secs(),
        "starting audit"
    );

    let mut results: Vec<AuditResult> = Vec::with_capacity(total);
    let mut stream = pool::run(jobs, workers, fetcher);
    while let Some(result) = stream.next().await {
        sheet.set_result(result.id, &result.render())?;
        debug!(
            done = results.len() + 1,
            total,
            id = %result.id,
            status = ?result.status,
            "result received"
        );
        results.push(result);
    }

    sheet.write(&config.output)?;

    // Completion order is random, the report reads better in row order
    results.sort_by_key(|r| r.id);
    report::print_results(&results, config.json)?;

    let summary = Summary::from_results(&results);
    info!(
        clean = summary.clean,
        excluded = summary.excluded,
        failed = summary.failed,
        output = %config.output.display(),
        "audit finished"
    );
    if !config.json {
        println!("\n💾 Results written to {}", config.output.display());
    }

    Ok(summary.exit_code())
}
