//! The document reducer.
//!
//! Every change to a quotation is an [`Edit`]. `apply` validates the edit
//! against the current parts before touching them, so a rejected edit leaves
//! the document exactly as it was.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use super::{DocumentField, DocumentParts, parse_references};
use crate::catalog::{CompanyDetails, ProductInfo};
use crate::line_item::LineItem;
use crate::money::non_negative;
use crate::totals::TaxMode;

/// A change to a single line item field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemChange {
    Code(String),
    Name(String),
    Description(String),
    Units(String),
    GstRate(Decimal),
    Quantity(Decimal),
    Rate(Decimal),
    PercentDiscount(Decimal),
    FlatDiscountPerUnit(Decimal),
}

impl ItemChange {
    fn write(self, item: &mut LineItem) {
        match self {
            Self::Code(code) => item.code = code,
            Self::Name(name) => item.name = name,
            Self::Description(description) => item.description = description,
            Self::Units(units) => item.units = units,
            Self::GstRate(rate) => item.gst_rate = rate,
            Self::Quantity(quantity) => item.quantity = quantity,
            Self::Rate(rate) => item.rate = rate,
            Self::PercentDiscount(percent) => item.percent_discount = percent,
            Self::FlatDiscountPerUnit(per_unit) => item.flat_discount_per_unit = per_unit,
        }
    }
}

/// One change to a quotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace a free-text field.
    SetField(DocumentField, String),
    SetDate(Option<NaiveDate>),

    AddItem(LineItem),
    RemoveItem(usize),
    ReplaceItems(Vec<LineItem>),
    UpdateItem { index: usize, change: ItemChange },

    SetTotalFlatDiscount(Decimal),
    SetSpecialDiscount(Decimal),

    /// Replace the tax mode outright.
    SetTaxMode(TaxMode),
    /// Switch between IGST and CGST+SGST, carrying the combined rate over.
    UseIgst(bool),
    /// Set the CGST rate, switching to intra-state mode if needed.
    SetCgstRate(Decimal),
    /// Set the SGST rate, switching to intra-state mode if needed.
    SetSgstRate(Decimal),
    /// Set the IGST rate, switching to inter-state mode if needed.
    SetIgstRate(Decimal),

    AddNote,
    SetNote(usize, String),
    /// Remove a note. Removing the only note clears it instead.
    RemoveNote(usize),

    AddSpecialOffer,
    SetSpecialOffer(usize, String),
    /// Remove an offer. Removing the only offer clears it instead.
    RemoveSpecialOffer(usize),

    /// Add a sales reference to the consignor name, or drop it if present.
    ToggleReference(String),

    /// Fill the consignee from a company directory entry.
    ApplyCompany(CompanyDetails),
    /// Fill an item from a catalog product.
    ApplyProduct { index: usize, product: ProductInfo },
}

/// A rejected edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("item {index} out of range (document has {len} items)")]
    ItemOutOfRange { index: usize, len: usize },

    #[error("note {index} out of range (document has {len} notes)")]
    NoteOutOfRange { index: usize, len: usize },

    #[error("special offer {index} out of range (document has {len} offers)")]
    OfferOutOfRange { index: usize, len: usize },
}

pub(super) fn apply(parts: &mut DocumentParts, edit: Edit) -> Result<(), EditError> {
    match edit {
        Edit::SetField(field, value) => *field.slot(parts) = value,
        Edit::SetDate(date) => parts.date = date,

        Edit::AddItem(item) => parts.items.push(item),
        Edit::RemoveItem(index) => {
            check_item(parts, index)?;
            parts.items.remove(index);
        }
        Edit::ReplaceItems(items) => parts.items = items,
        Edit::UpdateItem { index, change } => {
            let len = parts.items.len();
            let item = parts
                .items
                .get_mut(index)
                .ok_or(EditError::ItemOutOfRange { index, len })?;
            change.write(item);
        }

        Edit::SetTotalFlatDiscount(amount) => parts.total_flat_discount = amount,
        Edit::SetSpecialDiscount(amount) => parts.special_discount = amount,

        Edit::SetTaxMode(mode) => parts.tax_mode = mode,
        Edit::UseIgst(igst) => parts.tax_mode = switch_mode(parts.tax_mode, igst),
        Edit::SetCgstRate(rate) => {
            parts.tax_mode = match parts.tax_mode {
                TaxMode::Intrastate { sgst_rate, .. } => TaxMode::split(rate, sgst_rate),
                TaxMode::Interstate { .. } => TaxMode::split(rate, Decimal::ZERO),
            };
        }
        Edit::SetSgstRate(rate) => {
            parts.tax_mode = match parts.tax_mode {
                TaxMode::Intrastate { cgst_rate, .. } => TaxMode::split(cgst_rate, rate),
                TaxMode::Interstate { .. } => TaxMode::split(Decimal::ZERO, rate),
            };
        }
        Edit::SetIgstRate(rate) => parts.tax_mode = TaxMode::integrated(rate),

        Edit::AddNote => parts.notes.push(String::new()),
        Edit::SetNote(index, text) => {
            let len = parts.notes.len();
            let note = parts
                .notes
                .get_mut(index)
                .ok_or(EditError::NoteOutOfRange { index, len })?;
            *note = text;
        }
        Edit::RemoveNote(index) => {
            let len = parts.notes.len();
            if index >= len {
                return Err(EditError::NoteOutOfRange { index, len });
            }
            remove_keeping_one(&mut parts.notes, index);
        }

        Edit::AddSpecialOffer => parts.special_offers.push(String::new()),
        Edit::SetSpecialOffer(index, text) => {
            let len = parts.special_offers.len();
            let offer = parts
                .special_offers
                .get_mut(index)
                .ok_or(EditError::OfferOutOfRange { index, len })?;
            *offer = text;
        }
        Edit::RemoveSpecialOffer(index) => {
            let len = parts.special_offers.len();
            if index >= len {
                return Err(EditError::OfferOutOfRange { index, len });
            }
            remove_keeping_one(&mut parts.special_offers, index);
        }

        Edit::ToggleReference(name) => toggle_reference(parts, &name),

        Edit::ApplyCompany(company) => {
            let consignee = &mut parts.consignee;
            consignee.company_name = company.name;
            consignee.address = company.address;
            consignee.state = company.state;
            consignee.contact_name = company.contact_name;
            consignee.contact_no = company.contact_no;
            consignee.gstin = company.gstin;
            consignee.state_code = company.state_code;
        }
        Edit::ApplyProduct { index, product } => {
            let len = parts.items.len();
            let item = parts
                .items
                .get_mut(index)
                .ok_or(EditError::ItemOutOfRange { index, len })?;
            item.code = product.code;
            item.name = product.name;
            item.description = product.description;
            item.rate = product.rate;
        }
    }
    Ok(())
}

fn check_item(parts: &DocumentParts, index: usize) -> Result<(), EditError> {
    let len = parts.items.len();
    if index < len {
        Ok(())
    } else {
        Err(EditError::ItemOutOfRange { index, len })
    }
}

fn switch_mode(current: TaxMode, igst: bool) -> TaxMode {
    match (current, igst) {
        (TaxMode::Intrastate { .. }, true) => TaxMode::integrated(current.combined_rate()),
        (TaxMode::Interstate { igst_rate }, false) => {
            let half = non_negative(igst_rate) / Decimal::TWO;
            TaxMode::split(half, half)
        }
        (mode, _) => mode,
    }
}

fn remove_keeping_one(list: &mut Vec<String>, index: usize) {
    if list.len() > 1 {
        list.remove(index);
    } else if let Some(only) = list.first_mut() {
        only.clear();
    }
}

fn toggle_reference(parts: &mut DocumentParts, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        return;
    }
    let mut references = parse_references(&parts.consignor.name);
    if let Some(position) = references.iter().position(|r| r == name) {
        references.remove(position);
    } else {
        references.push(name.to_string());
    }
    parts.consignor.name = references.join(", ");
}
