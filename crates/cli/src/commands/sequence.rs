//! Sequence identifier commands.
//!
//! # Usage
//!
//! ```bash
//! sd-cli next-id --prefix LD --latest LD-999   # LD-1000
//! sd-cli next-id --prefix DO                   # DO-01
//! sd-cli next-id --prefix QN --from-backend    # QN only; the backend lists no LD/DO numbers
//! ```
//!
//! # Environment Variables
//!
//! - `SEQUENCE_WIDTHS` - Pad widths per prefix, e.g. `LD=3,DO=2,QN=3`

use salesdesk_client::ClientConfig;
use salesdesk_core::sequence::{SequenceNumber, SequenceRegistry};
use serde::Serialize;

use super::{CommandError, emit};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct NextId {
    pub prefix: String,
    pub latest: Option<String>,
    pub next: String,
}

/// Print the identifier following `latest`.
pub fn next_id(prefix: &str, latest: Option<&str>) -> Result<(), CommandError> {
    let registry = ClientConfig::sequences_from_env()?;
    emit(&compute(&registry, prefix, latest)?)
}

fn compute(
    registry: &SequenceRegistry,
    prefix: &str,
    latest: Option<&str>,
) -> Result<NextId, CommandError> {
    let prefix = prefix.trim();
    SequenceNumber::parse(&format!("{prefix}-1"))?;

    if let Some(malformed) =
        latest.filter(|latest| SequenceNumber::parse_with_prefix(latest, prefix).is_none())
    {
        tracing::warn!(prefix, latest = malformed, "Latest identifier is malformed, starting over");
    }

    Ok(NextId {
        prefix: prefix.to_string(),
        latest: latest.map(str::to_string),
        next: registry.next(prefix, latest),
    })
}
