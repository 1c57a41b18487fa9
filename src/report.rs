// src/report.rs
// =============================================================================
// Prints the audit results to the terminal.
//
// Two formats:
// - a human-readable table plus a summary (default)
// - pretty JSON (--json), handy for piping into jq or other tools
//
// The results sheet is written separately (see sheet/), this is just what the
// user sees on stdout.
// =============================================================================

use crate::checker::{AuditResult, AuditStatus};
use anyhow::Result;

// Widest URL we print before truncating
const URL_WIDTH: usize = 57;

// Counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub clean: usize,
    pub excluded: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_results(results: &[AuditResult]) -> Self {
        results.iter().fold(Summary::default(), |mut summary, result| {
            match result.status {
                AuditStatus::Clean => summary.clean += 1,
                AuditStatus::Excluded => summary.excluded += 1,
                AuditStatus::Failed => summary.failed += 1,
            }
            summary
        })
    }

    pub fn total(&self) -> usize {
        self.clean + self.excluded + self.failed
    }

    // 0 = every page is indexable, 1 = at least one excluded or failed page
    pub fn exit_code(&self) -> i32 {
        if self.excluded + self.failed > 0 {
            1
        } else {
            0
        }
    }
}

// Prints the results either as a table or JSON
pub fn print_results(results: &[AuditResult], json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(results)?;
        println!("{}", json_output);
    } else {
        print_table(results);
    }
    Ok(())
}

fn print_table(results: &[AuditResult]) {
    println!("{:<6} {:<60} {:<14} {}", "ROW", "URL", "STATUS", "DETAIL");
    println!("{}", "=".repeat(110));

    for result in results {
        println!(
            "{:<6} {:<60} {:<14} {}",
            result.id.0,
            truncate_url(&result.url),
            format_status(result.status),
            detail(result)
        );
    }

    println!();

    let summary = Summary::from_results(results);
    println!("📊 Summary:");
    println!("   ✅ Clean: {}", summary.clean);
    println!("   🚫 Excluded: {}", summary.excluded);
    println!("   ⚠️  Failed: {}", summary.failed);
    println!("   📋 Total: {}", summary.total());
}

fn format_status(status: AuditStatus) -> &'static str {
    match status {
        AuditStatus::Clean => "✅ CLEAN",
        AuditStatus::Excluded => "🚫 EXCLUDED",
        AuditStatus::Failed => "⚠️  FAILED",
    }
}

// One-line description for the DETAIL column
fn detail(result: &AuditResult) -> String {
    match result.status {
        AuditStatus::Clean => String::new(),
        AuditStatus::Excluded => result
            .findings
            .iter()
            .map(|f| format!("{}: {}", f.source, f.normalized_value))
            .collect::<Vec<_>>()
            .join("; "),
        AuditStatus::Failed => result.error.clone().unwrap_or_default(),
    }
}

// Counts characters, not bytes, so non-ASCII URLs don't get cut mid-character
fn truncate_url(url: &str) -> String {
    if url.chars().count() > URL_WIDTH {
        format!("{}...", url.chars().take(URL_WIDTH).collect::<String>())
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckError, Detection, Job, RowId};

    fn clean(row: usize) -> AuditResult {
        let detection = Detection {
            findings: vec![],
            html_parsed: true,
        };
        AuditResult::classify(Job::new(RowId(row), "https://a.example"), Some(200), Ok(detection))
    }

    fn failed(row: usize) -> AuditResult {
        AuditResult::failed(
            Job::new(RowId(row), "https://b.example"),
            &CheckError::Transport("refused".into()),
        )
    }

    #[test]
    fn test_summary_counts_and_exit_code() {
        let all_clean = vec![clean(2), clean(3)];
        assert_eq!(Summary::from_results(&all_clean).exit_code(), 0);

        let mixed = vec![clean(2), failed(3)];
        let summary = Summary::from_results(&mixed);
        assert_eq!(summary.clean, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_empty_run_is_success() {
        assert_eq!(Summary::from_results(&[]).exit_code(), 0);
    }

    #[test]
    fn test_truncate_url_is_char_safe() {
        let long = format!("https://example.com/{}", "é".repeat(80));
        let shown = truncate_url(&long);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), URL_WIDTH + 3);
        assert_eq!(truncate_url("https://a.example"), "https://a.example");
    }

    #[test]
    fn test_detail_for_failed_result() {
        assert_eq!(detail(&failed(2)), "request failed: refused");
        assert_eq!(detail(&clean(2)), "");
    }
}
