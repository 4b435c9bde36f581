//! Rebuilding a quotation from a stored record.
//!
//! [`reconstruct`] is total. Whatever the record holds, it returns a
//! document whose totals are recomputed from its inputs, along with the
//! problems it noticed on the way. Stored totals and item amounts are only
//! compared against, never trusted.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::document::{DocumentField, DocumentParts, QuotationDocument};
use crate::line_item::{DEFAULT_ITEM_GST_RATE, DEFAULT_UNITS, LineItem};
use crate::money::within_tolerance;
use crate::raw::{RawLineItem, RawList, RawQuotationRecord};
use crate::totals::{DEFAULT_CGST_RATE, DEFAULT_SGST_RATE, TaxMode};

/// Separator of joined special offers and notes.
pub const LIST_SEPARATOR: char = '|';

/// Something off about a stored record. The load still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevisionWarning {
    #[error("ignored malformed value at {field}")]
    MalformedInput { field: String },

    #[error("stored grand total {stored} differs from recomputed {recomputed}")]
    InconsistentTotals { stored: Decimal, recomputed: Decimal },

    #[error("item {index}: stored amount {stored} differs from recomputed {recomputed}")]
    InconsistentItemAmount {
        index: usize,
        stored: Decimal,
        recomputed: Decimal,
    },
}

/// A reconstructed document and what was noticed while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub document: QuotationDocument,
    pub warnings: Vec<RevisionWarning>,
}

/// Rebuild a document from a stored record.
///
/// ```
/// use salesdesk_core::raw::RawQuotationRecord;
/// use salesdesk_core::revision::reconstruct;
/// use serde_json::json;
///
/// let raw = RawQuotationRecord::from_value(&json!({"specialOffers": "A|B|"}));
/// let revision = reconstruct(&raw);
/// assert_eq!(revision.document.special_offers(), ["A", "B"]);
/// assert_eq!(revision.document.notes(), [""]);
/// ```
#[must_use]
pub fn reconstruct(raw: &RawQuotationRecord) -> Revision {
    let mut warnings: Vec<RevisionWarning> = raw
        .malformed
        .iter()
        .map(|field| RevisionWarning::MalformedInput {
            field: field.clone(),
        })
        .collect();

    let mut parts = DocumentParts {
        date: raw.date,
        items: raw.items.iter().map(line_item).collect(),
        total_flat_discount: raw.total_flat_discount.unwrap_or_default(),
        special_discount: raw.special_discount.unwrap_or_default(),
        tax_mode: tax_mode(raw),
        special_offers: special_offers(raw.special_offers.as_ref()),
        notes: notes(raw.notes.as_ref()),
        ..DocumentParts::default()
    };
    for field in DocumentField::ALL {
        if let Some(text) = raw.text(*field) {
            *field.slot(&mut parts) = text.to_string();
        }
    }

    let document = QuotationDocument::from_parts(parts);

    for (index, (stored, item)) in raw.items.iter().zip(document.items()).enumerate() {
        let Some(stored) = stored.stored_amount else {
            continue;
        };
        if !within_tolerance(stored, item.amount()) {
            warnings.push(RevisionWarning::InconsistentItemAmount {
                index,
                stored,
                recomputed: item.amount(),
            });
        }
    }
    if let Some(stored) = raw.stored_grand_total {
        let recomputed = document.totals().grand_total;
        if !within_tolerance(stored, recomputed) {
            warnings.push(RevisionWarning::InconsistentTotals { stored, recomputed });
        }
    }

    for warning in &warnings {
        tracing::warn!(
            quotation_no = %document.quotation_no(),
            %warning,
            "Revision loaded with warning"
        );
    }
    tracing::debug!(
        quotation_no = %document.quotation_no(),
        items = document.items().len(),
        warnings = warnings.len(),
        "Reconstructed quotation"
    );

    Revision { document, warnings }
}

fn line_item(raw: &RawLineItem) -> LineItem {
    let mut item = LineItem::new(
        raw.name.clone().unwrap_or_default(),
        raw.quantity.unwrap_or_default(),
        raw.rate.unwrap_or_default(),
    );
    item.code = raw.code.clone().unwrap_or_default();
    item.description = raw.description.clone().unwrap_or_default();
    item.units = raw
        .units
        .clone()
        .unwrap_or_else(|| DEFAULT_UNITS.to_string());
    item.gst_rate = raw.gst_rate.unwrap_or(DEFAULT_ITEM_GST_RATE);
    item.percent_discount = raw.percent_discount.unwrap_or_default();
    item.flat_discount_per_unit = raw.flat_discount_per_unit.unwrap_or_default();
    item.recompute();
    item
}

/// IGST when the record says so, or when it only carries an IGST rate;
/// otherwise CGST + SGST, each defaulting to the standard split.
fn tax_mode(raw: &RawQuotationRecord) -> TaxMode {
    let has_split = raw.cgst_rate.is_some() || raw.sgst_rate.is_some();
    let igst = raw
        .is_igst
        .unwrap_or_else(|| !has_split && raw.igst_rate.is_some_and(|rate| rate > Decimal::ZERO));
    if igst {
        TaxMode::integrated(
            raw.igst_rate
                .unwrap_or(DEFAULT_CGST_RATE + DEFAULT_SGST_RATE),
        )
    } else {
        TaxMode::split(
            raw.cgst_rate.unwrap_or(DEFAULT_CGST_RATE),
            raw.sgst_rate.unwrap_or(DEFAULT_SGST_RATE),
        )
    }
}

fn special_offers(raw: Option<&RawList>) -> Vec<String> {
    match raw {
        Some(RawList::Joined(joined)) => {
            let offers: Vec<String> = joined
                .split(LIST_SEPARATOR)
                .filter(|offer| !offer.trim().is_empty())
                .map(str::to_string)
                .collect();
            if offers.is_empty() {
                vec![String::new()]
            } else {
                offers
            }
        }
        Some(RawList::Items(items)) => items.clone(),
        None => vec![String::new()],
    }
}

fn notes(raw: Option<&RawList>) -> Vec<String> {
    match raw {
        Some(RawList::Joined(note)) => vec![note.clone()],
        Some(RawList::Items(items)) => items.clone(),
        None => vec![String::new()],
    }
}
