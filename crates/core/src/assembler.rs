//! Outbound shapes of a quotation.
//!
//! [`to_persistence_payload`] produces the record the backend stores, keyed
//! the way the backend names its columns. [`to_print_payload`] produces
//! everything a renderer needs with figures already formatted, so nothing
//! downstream recomputes a total.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::date::{display_date, storage_date};
use crate::document::{BankDetails, Consignee, Consignor, QuotationDocument, Terms};
use crate::line_item::LineItem;
use crate::money::format_money;
use crate::revision::LIST_SEPARATOR;
use crate::totals::{TaxBreakdown, TaxMode};

/// A line item as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedItem {
    pub code: String,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub gst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub qty: Decimal,
    pub units: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub flat_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl From<&LineItem> for PersistedItem {
    fn from(item: &LineItem) -> Self {
        Self {
            code: item.code.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            gst: item.gst_rate,
            qty: item.quantity,
            units: item.units.clone(),
            rate: item.rate,
            discount: item.percent_discount,
            flat_discount: item.flat_discount_per_unit,
            amount: item.amount(),
        }
    }
}

/// The record sent to the quotation store.
///
/// Monetary values travel as JSON numbers. Exactly one of the CGST/SGST pair
/// and the IGST rate is set, matching `is_igst`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistencePayload {
    pub quotation_no: String,
    /// `YYYY-MM-DD`.
    pub quotation_date: Option<String>,
    pub prepared_by: String,

    pub consigner_state: String,
    /// Comma-separated sales references.
    pub reference_name: String,
    pub consigner_address: String,
    pub consigner_mobile: String,
    pub consigner_phone: String,
    pub consigner_gstin: String,
    pub consigner_state_code: String,

    pub company_name: String,
    pub consignee_address: String,
    pub ship_to: String,
    pub consignee_state: String,
    pub contact_name: String,
    pub contact_no: String,
    pub consignee_gstin: String,
    pub consignee_state_code: String,
    pub msme_no: String,

    pub validity: String,
    pub payment_terms: String,
    pub delivery: String,
    pub freight: String,
    pub insurance: String,
    pub taxes: String,
    /// Notes joined by `|`.
    pub notes: String,
    /// Special offers joined by `|`.
    pub special_offers: String,

    pub account_no: String,
    pub bank_name: String,
    pub bank_address: String,
    pub ifsc_code: String,
    pub email: String,
    pub website: String,
    pub pan: String,

    pub items: Vec<PersistedItem>,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_flat_discount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub special_discount: Decimal,
    #[serde(rename = "isIGST")]
    pub is_igst: bool,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub cgst_rate: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub sgst_rate: Option<Decimal>,
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub igst_rate: Option<Decimal>,

    /// Where the rendered document was stored.
    pub pdf_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub grand_total: Decimal,
}

/// Build the record the backend stores for `document`.
#[must_use]
pub fn to_persistence_payload(
    document: &QuotationDocument,
    pdf_url: Option<String>,
) -> PersistencePayload {
    let Consignor {
        name: reference_name,
        address: consigner_address,
        state: consigner_state,
        state_code: consigner_state_code,
        gstin: consigner_gstin,
        mobile: consigner_mobile,
        phone: consigner_phone,
    } = document.consignor().clone();
    let Consignee {
        company_name,
        address: consignee_address,
        ship_to,
        state: consignee_state,
        state_code: consignee_state_code,
        contact_name,
        contact_no,
        gstin: consignee_gstin,
        msme_number: msme_no,
    } = document.consignee().clone();
    let Terms {
        validity,
        payment_terms,
        delivery,
        freight,
        insurance,
        taxes,
    } = document.terms().clone();
    let BankDetails {
        account_no,
        bank_name,
        bank_address,
        ifsc_code,
        email,
        website,
        pan,
    } = document.bank().clone();

    let (cgst_rate, sgst_rate, igst_rate) = match document.tax_mode() {
        TaxMode::Intrastate {
            cgst_rate,
            sgst_rate,
        } => (Some(cgst_rate), Some(sgst_rate), None),
        TaxMode::Interstate { igst_rate } => (None, None, Some(igst_rate)),
    };
    let separator = LIST_SEPARATOR.to_string();

    PersistencePayload {
        quotation_no: document.quotation_no().to_string(),
        quotation_date: document.date().map(storage_date),
        prepared_by: document.prepared_by().to_string(),
        consigner_state,
        reference_name,
        consigner_address,
        consigner_mobile,
        consigner_phone,
        consigner_gstin,
        consigner_state_code,
        company_name,
        consignee_address,
        ship_to,
        consignee_state,
        contact_name,
        contact_no,
        consignee_gstin,
        consignee_state_code,
        msme_no,
        validity,
        payment_terms,
        delivery,
        freight,
        insurance,
        taxes,
        notes: document.notes().join(&separator),
        special_offers: document.special_offers().join(&separator),
        account_no,
        bank_name,
        bank_address,
        ifsc_code,
        email,
        website,
        pan,
        items: document.items().iter().map(PersistedItem::from).collect(),
        total_flat_discount: document.total_flat_discount(),
        special_discount: document.special_discount(),
        is_igst: document.tax_mode().is_igst(),
        cgst_rate,
        sgst_rate,
        igst_rate,
        pdf_url,
        grand_total: document.totals().grand_total,
    }
}

/// Column visibility passed through to the renderer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintOptions {
    pub hide_disc: bool,
    pub hide_flat_disc: bool,
    pub hide_total_flat_disc: bool,
    pub hide_special_discount: bool,
}

/// One printed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintItem {
    /// 1-based position.
    pub serial: usize,
    pub code: String,
    pub name: String,
    pub description: String,
    pub gst_rate: String,
    pub quantity: String,
    pub units: String,
    pub rate: String,
    pub percent_discount: String,
    pub flat_discount_per_unit: String,
    pub amount: String,
}

/// A printed tax row, e.g. `CGST @ 9%`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintTaxLine {
    pub label: &'static str,
    pub rate: String,
    pub amount: String,
}

/// Everything a renderer needs, figures pre-formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintPayload {
    pub quotation_no: String,
    /// `DD/MM/YYYY`, empty when unset.
    pub date: String,
    pub prepared_by: String,
    pub consignor: Consignor,
    pub references: Vec<String>,
    pub consignee: Consignee,
    pub terms: Terms,
    pub bank: BankDetails,
    pub items: Vec<PrintItem>,
    pub subtotal: String,
    pub total_flat_discount: String,
    pub taxable_amount: String,
    pub is_igst: bool,
    pub tax_lines: Vec<PrintTaxLine>,
    pub special_discount: String,
    pub grand_total: String,
    pub special_offers: Vec<String>,
    pub notes: Vec<String>,
    pub options: PrintOptions,
}

/// Build the printable view of `document`.
#[must_use]
pub fn to_print_payload(document: &QuotationDocument, options: PrintOptions) -> PrintPayload {
    let totals = document.totals();
    let items = document
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| PrintItem {
            serial: index + 1,
            code: item.code.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            gst_rate: plain(item.gst_rate),
            quantity: plain(item.quantity),
            units: item.units.clone(),
            rate: format_money(item.rate),
            percent_discount: plain(item.percent_discount),
            flat_discount_per_unit: format_money(item.flat_discount_per_unit),
            amount: format_money(item.amount()),
        })
        .collect();

    PrintPayload {
        quotation_no: document.quotation_no().to_string(),
        date: document.date().map(display_date).unwrap_or_default(),
        prepared_by: document.prepared_by().to_string(),
        consignor: document.consignor().clone(),
        references: document.references(),
        consignee: document.consignee().clone(),
        terms: document.terms().clone(),
        bank: document.bank().clone(),
        items,
        subtotal: format_money(totals.subtotal),
        total_flat_discount: format_money(totals.total_flat_discount),
        taxable_amount: format_money(totals.taxable_amount),
        is_igst: document.tax_mode().is_igst(),
        tax_lines: tax_lines(&totals.taxes),
        special_discount: format_money(totals.special_discount),
        grand_total: format_money(totals.grand_total),
        special_offers: document.special_offers().to_vec(),
        notes: document.notes().to_vec(),
        options,
    }
}

fn tax_lines(taxes: &TaxBreakdown) -> Vec<PrintTaxLine> {
    match *taxes {
        TaxBreakdown::Split {
            cgst_rate,
            cgst_amount,
            sgst_rate,
            sgst_amount,
        } => vec![
            PrintTaxLine {
                label: "CGST",
                rate: plain(cgst_rate),
                amount: format_money(cgst_amount),
            },
            PrintTaxLine {
                label: "SGST",
                rate: plain(sgst_rate),
                amount: format_money(sgst_amount),
            },
        ],
        TaxBreakdown::Integrated {
            igst_rate,
            igst_amount,
        } => vec![PrintTaxLine {
            label: "IGST",
            rate: plain(igst_rate),
            amount: format_money(igst_amount),
        }],
    }
}

/// A quantity or percentage without trailing zeros.
fn plain(value: Decimal) -> String {
    value.normalize().to_string()
}
