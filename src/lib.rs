//! Read/write splitting for a sharding proxy.
//!
//! Replica query rules map a primary datasource to its replicas and a load
//! balancer. Statements are parsed, enriched by segment fillers, and routed:
//! writes to the primary, reads to a replica picked by the balancer.

pub mod balancer;
pub mod cli;
pub mod config;
pub mod parser;
pub mod router;
pub mod rule;
pub mod sighup;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use std::io::IsTerminal;

/// Setup the logger, so `info!`, `debug!`
/// and other macros actually output something.
///
/// Using try_init and ignoring errors to allow
/// for use in tests (setting up multiple times).
pub fn logger() {
    let format = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_file(false);
    #[cfg(not(debug_assertions))]
    let format = format.with_target(false);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let _ = tracing_subscriber::registry()
        .with(format)
        .with(filter)
        .try_init();
}
