//! Command implementations.

pub mod backend;
pub mod record;
pub mod sequence;

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Errors from reading inputs or writing results.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] salesdesk_client::ConfigError),

    #[error("Invalid identifier: {0}")]
    Sequence(#[from] salesdesk_core::sequence::SequenceError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write `value` to `out` as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut out: W, value: &T) -> Result<(), CommandError> {
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Write `value` to stdout as pretty JSON.
pub fn emit<T: Serialize>(value: &T) -> Result<(), CommandError> {
    write_json(std::io::stdout().lock(), value)
}
