//! The quotation document.
//!
//! A [`QuotationDocument`] is owned by a single editing session. Its fields
//! are only reachable through accessors and [`QuotationDocument::apply`], and
//! every constructor and every edit goes through the same normalisation step,
//! which re-derives item amounts and [`Totals`]. Readers therefore never see a
//! total that lags behind the inputs it was computed from.

mod edit;
mod fields;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line_item::LineItem;
use crate::money::{MAX_PRICE, bounded};
use crate::totals::{TaxMode, Totals, TotalsInput, compute_totals};

pub use edit::{Edit, EditError, ItemChange};
pub use fields::DocumentField;

/// The issuing party. `name` holds the comma-separated sales references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consignor {
    pub name: String,
    pub address: String,
    pub state: String,
    pub state_code: String,
    pub gstin: String,
    pub mobile: String,
    pub phone: String,
}

/// The customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consignee {
    pub company_name: String,
    pub address: String,
    pub ship_to: String,
    pub state: String,
    pub state_code: String,
    pub contact_name: String,
    pub contact_no: String,
    pub gstin: String,
    pub msme_number: String,
}

/// Commercial terms, all free text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    pub validity: String,
    pub payment_terms: String,
    pub delivery: String,
    pub freight: String,
    pub insurance: String,
    pub taxes: String,
}

/// Bank and company contact details printed in the footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    pub account_no: String,
    pub bank_name: String,
    pub bank_address: String,
    pub ifsc_code: String,
    pub email: String,
    pub website: String,
    pub pan: String,
}

/// The editable inputs of a document, without derived values.
///
/// This is the shape both fresh creation and the revision loader fill in
/// before handing it to [`QuotationDocument::from_parts`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentParts {
    pub quotation_no: String,
    pub date: Option<NaiveDate>,
    pub prepared_by: String,
    pub consignor: Consignor,
    pub consignee: Consignee,
    pub terms: Terms,
    pub bank: BankDetails,
    pub items: Vec<LineItem>,
    pub total_flat_discount: Decimal,
    pub special_discount: Decimal,
    pub tax_mode: TaxMode,
    pub special_offers: Vec<String>,
    pub notes: Vec<String>,
}

/// A quotation with its derived totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationDocument {
    #[serde(flatten)]
    parts: DocumentParts,
    totals: Totals,
}

impl QuotationDocument {
    /// An empty document with a freshly issued number.
    #[must_use]
    pub fn new(quotation_no: impl Into<String>, date: NaiveDate) -> Self {
        Self::from_parts(DocumentParts {
            quotation_no: quotation_no.into(),
            date: Some(date),
            ..DocumentParts::default()
        })
    }

    /// Build a document from raw parts, normalising them first.
    ///
    /// Normalisation trims the quotation number, clamps document discounts to
    /// zero or above, guarantees at least one note and one special-offer
    /// slot, and re-derives every item amount and the totals.
    #[must_use]
    pub fn from_parts(parts: DocumentParts) -> Self {
        let mut document = Self {
            parts,
            totals: compute_totals(&[], &TotalsInput::default()),
        };
        document.normalize();
        document
    }

    /// Give back the editable parts.
    #[must_use]
    pub fn into_parts(self) -> DocumentParts {
        self.parts
    }

    /// Apply one edit and re-derive totals.
    ///
    /// On error the document is left unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the edit addresses an item, note or offer that
    /// does not exist.
    pub fn apply(&mut self, edit: Edit) -> Result<(), EditError> {
        edit::apply(&mut self.parts, edit)?;
        self.normalize();
        Ok(())
    }

    /// Apply several edits in order, stopping at the first failure.
    ///
    /// Edits before the failing one stay applied, and totals are current
    /// either way.
    ///
    /// # Errors
    ///
    /// Returns the first edit error.
    pub fn apply_all<I>(&mut self, edits: I) -> Result<(), EditError>
    where
        I: IntoIterator<Item = Edit>,
    {
        edits.into_iter().try_for_each(|edit| self.apply(edit))
    }

    fn normalize(&mut self) {
        let parts = &mut self.parts;
        parts.quotation_no = parts.quotation_no.trim().to_string();
        parts.total_flat_discount = bounded(parts.total_flat_discount, MAX_PRICE);
        parts.special_discount = bounded(parts.special_discount, MAX_PRICE);
        parts.tax_mode = match parts.tax_mode {
            TaxMode::Intrastate {
                cgst_rate,
                sgst_rate,
            } => TaxMode::split(cgst_rate, sgst_rate),
            TaxMode::Interstate { igst_rate } => TaxMode::integrated(igst_rate),
        };
        if parts.notes.is_empty() {
            parts.notes.push(String::new());
        }
        if parts.special_offers.is_empty() {
            parts.special_offers.push(String::new());
        }
        for item in &mut parts.items {
            item.recompute();
        }
        self.totals = compute_totals(
            &parts.items,
            &TotalsInput {
                total_flat_discount: parts.total_flat_discount,
                special_discount: parts.special_discount,
                tax_mode: parts.tax_mode,
            },
        );
        tracing::debug!(
            quotation_no = %parts.quotation_no,
            items = parts.items.len(),
            grand_total = %self.totals.grand_total,
            "Recomputed quotation totals"
        );
    }

    #[must_use]
    pub fn quotation_no(&self) -> &str {
        &self.parts.quotation_no
    }

    #[must_use]
    pub const fn date(&self) -> Option<NaiveDate> {
        self.parts.date
    }

    #[must_use]
    pub fn prepared_by(&self) -> &str {
        &self.parts.prepared_by
    }

    #[must_use]
    pub const fn consignor(&self) -> &Consignor {
        &self.parts.consignor
    }

    #[must_use]
    pub const fn consignee(&self) -> &Consignee {
        &self.parts.consignee
    }

    #[must_use]
    pub const fn terms(&self) -> &Terms {
        &self.parts.terms
    }

    #[must_use]
    pub const fn bank(&self) -> &BankDetails {
        &self.parts.bank
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.parts.items
    }

    #[must_use]
    pub const fn total_flat_discount(&self) -> Decimal {
        self.parts.total_flat_discount
    }

    #[must_use]
    pub const fn special_discount(&self) -> Decimal {
        self.parts.special_discount
    }

    #[must_use]
    pub const fn tax_mode(&self) -> TaxMode {
        self.parts.tax_mode
    }

    #[must_use]
    pub fn special_offers(&self) -> &[String] {
        &self.parts.special_offers
    }

    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.parts.notes
    }

    /// Totals as of the last edit.
    #[must_use]
    pub const fn totals(&self) -> &Totals {
        &self.totals
    }

    /// Sales references parsed from the consignor name.
    #[must_use]
    pub fn references(&self) -> Vec<String> {
        parse_references(&self.parts.consignor.name)
    }
}

/// Split a comma-separated reference list into distinct, trimmed names.
///
/// Order of first appearance is kept.
#[must_use]
pub fn parse_references(list: &str) -> Vec<String> {
    let mut references: Vec<String> = Vec::new();
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !references.iter().any(|r| r == name) {
            references.push(name.to_string());
        }
    }
    references
}
