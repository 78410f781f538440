//! lepasserelle - Command Line & Configuration
//!
//! *La Passerelle* (The Gateway) - `lesuivi` CLI wiring storage, summaries, exports and the HTTP API together

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Command line interface
pub mod cli;
/// `lesuivi.toml` loading and environment overrides
pub mod config;
/// Sample portfolio generator
pub mod sample;

pub use config::{AppConfig, ExportConfig, DEFAULT_CONFIG_FILE};
pub use sample::{seed_sample_data, SeedReport};
