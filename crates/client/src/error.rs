//! Error types for backend calls and number issuance.

use thiserror::Error;

/// Errors that can occur when talking to the quotation backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the body, or the status reason.
        message: String,
    },

    /// Backend answered `success: false`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Failed to parse response.
    #[error("parse error: {0}")]
    Parse(String),

    /// The rendered document could not be stored.
    #[error("document upload failed: {0}")]
    UploadFailed(String),

    /// An autofill edit did not fit the document.
    #[error("edit failed: {0}")]
    Edit(#[from] salesdesk_core::EditError),

    /// The backend keeps no list of identifiers for this prefix.
    #[error("backend lists only quotation numbers, not {0} identifiers")]
    UnsupportedSequence(String),

    /// Every claim attempt lost to a concurrent issuer.
    #[error("could not claim a {prefix} number after {attempts} attempts")]
    SequenceExhausted {
        /// Sequence prefix.
        prefix: String,
        /// Attempts made.
        attempts: u32,
    },
}
