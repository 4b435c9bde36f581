//! Commands over stored quotation records.
//!
//! A record file holds one quotation as the backend stores it. It is loaded
//! the same way a revision is, so totals are always recomputed.

use std::path::Path;

use salesdesk_core::raw::RawQuotationRecord;
use salesdesk_core::{
    PrintOptions, Revision, reconstruct, to_persistence_payload, to_print_payload,
};

use super::{CommandError, emit};

/// Load and reconstruct a record file.
pub fn load(path: &Path) -> Result<Revision, CommandError> {
    let text = std::fs::read_to_string(path).map_err(|source| CommandError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| CommandError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(reconstruct(&RawQuotationRecord::from_value(&value)))
}

/// Print recomputed totals.
pub fn totals(path: &Path) -> Result<(), CommandError> {
    let revision = load(path)?;
    emit(revision.document.totals())
}

/// Print the persistence payload.
pub fn payload(path: &Path, pdf_url: Option<String>) -> Result<(), CommandError> {
    let revision = load(path)?;
    emit(&to_persistence_payload(&revision.document, pdf_url))
}

/// Print the print payload.
pub fn print(path: &Path, options: PrintOptions) -> Result<(), CommandError> {
    let revision = load(path)?;
    emit(&to_print_payload(&revision.document, options))
}
