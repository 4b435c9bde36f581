//! Sales Desk Core - quotation computation and revision engine.
//!
//! This crate holds the deterministic part of the quotation editor:
//! - [`sequence`] - Document identifiers (`QN-007`, `LD-1000`)
//! - [`line_item`] - Per-line amounts after percentage and flat discounts
//! - [`totals`] - Subtotal, GST (CGST + SGST or IGST) and grand total
//! - [`document`] - The quotation and the reducer that edits it
//! - [`raw`] / [`revision`] - Rebuilding a quotation from a stored record
//! - [`assembler`] - Persistence and print payloads
//! - [`catalog`] - Company, product and lead autofill
//!
//! # Architecture
//!
//! The core crate does no I/O: no HTTP clients, no storage, no clocks. Every
//! function is synchronous and pure apart from `tracing` events, so the same
//! inputs always produce the same totals. Boundary adapters live in
//! `salesdesk-client`.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assembler;
pub mod catalog;
pub mod date;
pub mod document;
pub mod line_item;
pub mod money;
pub mod raw;
pub mod revision;
pub mod sequence;
pub mod totals;

pub use assembler::{
    PersistencePayload, PrintOptions, PrintPayload, to_persistence_payload, to_print_payload,
};
pub use catalog::{CompanyDirectory, LeadDetails, ProductCatalog};
pub use document::{
    DocumentField, DocumentParts, Edit, EditError, ItemChange, QuotationDocument,
};
pub use line_item::LineItem;
pub use raw::RawQuotationRecord;
pub use revision::{Revision, RevisionWarning, reconstruct};
pub use sequence::{SequenceNumber, SequenceRegistry};
pub use totals::{TaxBreakdown, TaxMode, Totals};
