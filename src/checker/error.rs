// src/checker/error.rs
// =============================================================================
// Errors that can happen while checking ONE url.
//
// Every variant is local to a single job: it turns that job's result into
// `Failed` and never stops the other workers.
//
// We use `thiserror` so each variant gets a readable Display message for free.
// That message is exactly what ends up in the results sheet.
// =============================================================================

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckError {
    /// The URL could not be turned into a request (bad syntax, wrong scheme)
    #[error("invalid URL: {0}")]
    RequestConstruction(String),

    /// DNS, TLS, connection or protocol failure
    #[error("request failed: {0}")]
    Transport(String),

    /// The per-job deadline expired
    #[error("timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The body could not be read or is not an HTML text document
    #[error("could not parse HTML: {0}")]
    Parse(String),
}

impl CheckError {
    // Converts a reqwest error into our own kinds
    //
    // reqwest reports its own client-level timeout as an error too, so we map
    // that onto Timeout with the duration we know about.
    pub fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            CheckError::Timeout(timeout)
        } else if error.is_builder() {
            CheckError::RequestConstruction(error.to_string())
        } else {
            CheckError::Transport(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_readable() {
        assert_eq!(
            CheckError::Timeout(Duration::from_secs(25)).to_string(),
            "timed out after 25s"
        );
        assert_eq!(
            CheckError::RequestConstruction("relative URL without a base".into()).to_string(),
            "invalid URL: relative URL without a base"
        );
        assert_eq!(
            CheckError::Parse("body is not valid UTF-8".into()).to_string(),
            "could not parse HTML: body is not valid UTF-8"
        );
    }
}
