// src/checker/mod.rs
// =============================================================================
// This module contains all the logic for checking ONE url.
//
// Submodules:
// - normalize: cleans up directive strings ("NoIndex , X" -> "noindex,x")
// - detect: finds noindex / nofollow in headers and meta tags
// - fetch: downloads the page (the PageFetcher trait + the reqwest version)
// - model: Job, AuditResult and friends
// - error: the ways a single check can fail
//
// Running many checks at once lives in the pool module, not here.
// =============================================================================

mod detect;
mod error;
mod fetch;
mod model;
mod normalize;

// Re-export public items from submodules so callers can write
// `checker::HttpFetcher` instead of `checker::fetch::HttpFetcher`
pub use detect::detect;
pub use error::CheckError;
pub use fetch::{HttpFetcher, PageFetcher};
pub use model::{AuditResult, AuditStatus, Job, RowId, FAILURE_MARKER, SUCCESS_MARKER};

// Only the fake fetchers and hand-built results in tests need these by name
#[cfg(test)]
pub use detect::Detection;
#[cfg(test)]
pub use fetch::FetchedPage;
