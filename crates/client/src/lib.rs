//! Sales Desk backend client.
//!
//! Async adapters between the quotation engine in `salesdesk-core` and the
//! quotation backend:
//!
//! - [`ports`]: traits the workflow is written against
//! - [`BackendClient`]: the REST implementation of those traits
//! - [`SequenceIssuer`]: number issuance with conditional claims
//! - [`QuotationDesk`]: create, revise, autofill and save quotations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod desk;
pub mod error;
pub mod http;
pub mod issuer;
pub mod ports;

pub use config::{ClientConfig, ConfigError};
pub use desk::QuotationDesk;
pub use error::ClientError;
pub use http::BackendClient;
pub use issuer::{MemorySequenceStore, SequenceIssuer, SequenceStore, UnguardedSequenceStore};
pub use ports::{
    CatalogSource, DocumentStorage, LatestIdentifierSource, QuotationSink, QuotationSource,
    SaveOutcome, UploadOutcome,
};
