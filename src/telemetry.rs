// src/telemetry.rs
// =============================================================================
// Sets up logging with `tracing`.
//
// Logs go to stderr so they never mix with the table or JSON on stdout.
// RUST_LOG overrides the default level, e.g. RUST_LOG=robots_audit=debug
// shows every job moving through fetching -> classifying -> completed.
// =============================================================================

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "warn,robots_audit=info" };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
