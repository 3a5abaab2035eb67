//! Prepdocs Core — error types and splitting configuration shared by every crate.

pub mod config;
pub mod error;

pub use config::{IngestConfig, SplitConfig, DEFAULT_BATCH_SIZE};
pub use error::{Error, Result};
