#![deny(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![cfg_attr(docsrs, feature(doc_cfg))]
//! This crate collects objects and methods needed to run the blood-flow simulation built from
//! the [building blocks](vessel_flow_building_blocks) which satisfy the given
//! [concepts](vessel_flow_concepts).
//!
//! ## Backends
//! Currently only the [backend::serial] backend exists.
//! It owns the complete state of the simulation and advances it one tick at a time.
//!
//! ## Configuration
//! All constants are collected in [Settings](backend::serial::Settings) which can be read from
//! json or ron files.
//! Parameters which may change between two ticks are supplied as
//! [TickParameters](backend::serial::TickParameters).
//!
//! ## Logging
//! With the `tracing` feature enabled, every phase of a tick opens a span and noteworthy
//! events such as a reset of the simulation are logged.

pub mod backend;

pub mod time;

#[cfg(feature = "tracing")]
#[doc(hidden)]
pub use tracing;

/// Installs a global subscriber which prints log messages of at least the given level to
/// stdout.
#[cfg(feature = "tracing")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing")))]
pub fn init_tracing(level: tracing::Level) -> Result<(), backend::serial::SimulationError> {
    use tracing_subscriber::{filter, prelude::*};

    let stdout_log = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_level(true);
    tracing_subscriber::registry()
        .with(stdout_log.with_filter(filter::LevelFilter::from_level(level)))
        .try_init()
        .map_err(|error| vessel_flow_concepts::SetupError(format!("{error}")).into())
}
