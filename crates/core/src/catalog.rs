//! Read-only lookups used to autofill a quotation.
//!
//! - [`CompanyDirectory`]: customer details keyed by company name, built from
//!   the parallel option lists of the backend's dropdown source.
//! - [`ProductCatalog`]: products keyed by both code and name.
//! - [`LeadDetails`]: an intake lead that pre-fills the consignee and items.
//!
//! None of these are owned by a document. Applying an entry produces
//! [`Edit`]s that copy values into it.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::document::{DocumentField, Edit};
use crate::line_item::{DEFAULT_ITEM_GST_RATE, LineItem};
use crate::raw::{Field, parse_decimal, parse_text};

/// Placeholder entry the dropdown source puts at the head of company lists.
pub const COMPANY_PLACEHOLDER: &str = "Select Company";

/// Number of leading characters compared by the loose product match.
const LOOSE_MATCH_CHARS: usize = 10;

/// Option lists returned by the dropdown source.
///
/// The `direct_*`, `consignee_gstin_uin` and `consignee_state_code` lists are
/// parallel: index `i` of each describes the same company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DropdownOptions {
    pub direct_company_name: Vec<Option<String>>,
    pub direct_billing_address: Vec<Option<String>>,
    pub direct_state: Vec<Option<String>>,
    pub direct_client_name: Vec<Option<String>>,
    pub direct_client_contact_no: Vec<Option<String>>,
    pub consignee_gstin_uin: Vec<Option<String>>,
    pub consignee_state_code: Vec<Option<String>>,
    pub prepared_by: Vec<Option<String>>,
    pub state: Vec<Option<String>>,
    pub sp_state: Vec<Option<String>>,
    pub consignee_state: Vec<Option<String>>,
    pub sp_name: Vec<Option<String>>,
}

impl DropdownOptions {
    /// Every known state name, de-duplicated in order of appearance.
    #[must_use]
    pub fn states(&self) -> Vec<String> {
        distinct(
            self.state
                .iter()
                .chain(&self.sp_state)
                .chain(&self.consignee_state)
                .chain(&self.direct_state),
        )
    }

    /// Sales references that may be toggled on the consignor.
    #[must_use]
    pub fn references(&self) -> Vec<String> {
        distinct(self.sp_name.iter())
    }

    /// Names for the "prepared by" field.
    #[must_use]
    pub fn preparers(&self) -> Vec<String> {
        distinct(self.prepared_by.iter())
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a Option<String>>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.flatten() {
        let value = value.trim();
        if !value.is_empty() && !out.iter().any(|v| v == value) {
            out.push(value.to_string());
        }
    }
    out
}

/// Customer details copied into the consignee by [`Edit::ApplyCompany`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetails {
    pub name: String,
    pub address: String,
    pub state: String,
    pub contact_name: String,
    pub contact_no: String,
    pub gstin: String,
    pub state_code: String,
}

/// Companies known to the dropdown source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDirectory {
    companies: Vec<CompanyDetails>,
}

impl CompanyDirectory {
    /// Zip the parallel option lists into company entries.
    ///
    /// Blank names and the [`COMPANY_PLACEHOLDER`] are skipped. A later entry
    /// with the same name replaces an earlier one.
    #[must_use]
    pub fn from_dropdowns(options: &DropdownOptions) -> Self {
        let column = |list: &[Option<String>], index: usize| {
            list.get(index)
                .cloned()
                .flatten()
                .unwrap_or_default()
                .trim()
                .to_string()
        };

        let mut directory = Self::default();
        for (index, name) in options.direct_company_name.iter().enumerate() {
            let Some(name) = name.as_deref().map(str::trim) else {
                continue;
            };
            if name.is_empty() || name == COMPANY_PLACEHOLDER {
                continue;
            }
            directory.insert(CompanyDetails {
                name: name.to_string(),
                address: column(&options.direct_billing_address, index),
                state: column(&options.direct_state, index),
                contact_name: column(&options.direct_client_name, index),
                contact_no: column(&options.direct_client_contact_no, index),
                gstin: column(&options.consignee_gstin_uin, index),
                state_code: column(&options.consignee_state_code, index),
            });
        }
        directory
    }

    /// Add or replace an entry by name.
    pub fn insert(&mut self, company: CompanyDetails) {
        if let Some(existing) = self.companies.iter_mut().find(|c| c.name == company.name) {
            *existing = company;
        } else {
            self.companies.push(company);
        }
    }

    /// Find a company by name; exact first, then case-insensitive.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompanyDetails> {
        let name = name.trim();
        self.companies
            .iter()
            .find(|c| c.name == name)
            .or_else(|| {
                let lower = name.to_lowercase();
                self.companies.iter().find(|c| c.name.to_lowercase() == lower)
            })
    }

    /// Company names in source order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.companies.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.companies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// The edit that fills the consignee from `name`, if known.
    #[must_use]
    pub fn apply(&self, name: &str) -> Option<Edit> {
        self.get(name).cloned().map(Edit::ApplyCompany)
    }
}

/// A product as listed by the product source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub item_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub item_name: String,
}

/// Product data copied into an item by [`Edit::ApplyProduct`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    pub code: String,
    pub name: String,
    pub description: String,
    pub rate: Decimal,
}

/// Products addressable by code or by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCatalog {
    entries: Vec<(String, ProductInfo)>,
}

impl ProductCatalog {
    #[must_use]
    pub fn from_records(records: &[ProductRecord]) -> Self {
        let mut catalog = Self::default();
        for record in records {
            catalog.insert(ProductInfo {
                code: record.item_code.trim().to_string(),
                name: record.item_name.trim().to_string(),
                description: String::new(),
                rate: Decimal::ZERO,
            });
        }
        catalog
    }

    /// Register a product under its code and its name.
    pub fn insert(&mut self, product: ProductInfo) {
        for key in [product.code.clone(), product.name.clone()] {
            if key.is_empty() {
                continue;
            }
            if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = product.clone();
            } else {
                self.entries.push((key, product.clone()));
            }
        }
    }

    /// Resolve a product code or name.
    ///
    /// Tries an exact key, then a case-insensitive trimmed key, then a loose
    /// match where the first ten lowercase characters of one side appear in
    /// the other.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&ProductInfo> {
        if let Some((_, product)) = self.entries.iter().find(|(k, _)| k == key) {
            return Some(product);
        }

        let wanted = key.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        if let Some((_, product)) = self
            .entries
            .iter()
            .find(|(k, _)| k.trim().to_lowercase() == wanted)
        {
            return Some(product);
        }

        let wanted_head: String = wanted.chars().take(LOOSE_MATCH_CHARS).collect();
        self.entries
            .iter()
            .find(|(k, _)| {
                let candidate = k.to_lowercase();
                let candidate_head: String = candidate.chars().take(LOOSE_MATCH_CHARS).collect();
                candidate.contains(&wanted_head) || wanted.contains(&candidate_head)
            })
            .map(|(_, product)| product)
    }

    /// Known product codes, de-duplicated.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.distinct_by(|p| p.code.as_str())
    }

    /// Known product names, de-duplicated.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.distinct_by(|p| p.name.as_str())
    }

    fn distinct_by<'a>(&'a self, key: impl Fn(&'a ProductInfo) -> &'a str) -> Vec<&'a str> {
        let mut out: Vec<&str> = Vec::new();
        for (_, product) in &self.entries {
            let value = key(product);
            if !value.is_empty() && !out.contains(&value) {
                out.push(value);
            }
        }
        out
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The edit that fills item `index` from the product `key`, if known.
    #[must_use]
    pub fn apply(&self, index: usize, key: &str) -> Option<Edit> {
        self.lookup(key).cloned().map(|product| Edit::ApplyProduct { index, product })
    }
}

/// A lead as returned by the lead-details source.
///
/// The two lead sheets name the salesperson column differently, so both
/// spellings are kept.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LeadDetails {
    #[serde(deserialize_with = "lenient_string")]
    pub company_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub address: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub salesperson_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub sales_person_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub phone_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub gstin: String,
    /// `[{name, quantity}]`, either as JSON text or inline.
    pub item_qty: Value,
}

/// A requested product and quantity on a lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadItem {
    pub name: String,
    pub quantity: Decimal,
}

impl LeadDetails {
    /// The salesperson under whichever column carried it.
    #[must_use]
    pub fn salesperson(&self) -> &str {
        if self.salesperson_name.trim().is_empty() {
            self.sales_person_name.trim()
        } else {
            self.salesperson_name.trim()
        }
    }

    /// Items requested on the lead.
    ///
    /// Entries without a name or quantity are skipped. A quantity that is
    /// not a number becomes 1. Unreadable `item_qty` yields no items.
    #[must_use]
    pub fn items(&self) -> Vec<LeadItem> {
        let parsed;
        let list = match &self.item_qty {
            Value::String(text) if !text.trim().is_empty() => {
                match serde_json::from_str::<Value>(text) {
                    Ok(value) => {
                        parsed = value;
                        &parsed
                    }
                    Err(error) => {
                        tracing::warn!(%error, "Lead item list is not valid JSON");
                        return Vec::new();
                    }
                }
            }
            other => other,
        };
        let Some(entries) = list.as_array() else {
            return Vec::new();
        };

        entries
            .iter()
            .filter_map(|entry| {
                let name = entry.get("name")?.as_str()?.trim();
                let quantity = entry.get("quantity").filter(|q| !q.is_null())?;
                if name.is_empty() {
                    return None;
                }
                let quantity = match parse_decimal(quantity) {
                    Field::Present(q) => q,
                    Field::Absent => Decimal::ZERO,
                    Field::Malformed => Decimal::ONE,
                };
                Some(LeadItem {
                    name: name.to_string(),
                    quantity,
                })
            })
            .collect()
    }

    /// Edits that fill the consignee and items from this lead.
    ///
    /// Blank lead fields fall back to the company directory entry for the
    /// lead's company. Items are replaced only when the lead lists any.
    #[must_use]
    pub fn edits(&self, catalog: &ProductCatalog, directory: &CompanyDirectory) -> Vec<Edit> {
        let company = directory.get(&self.company_name);

        let mut edits = vec![
            Edit::SetField(
                DocumentField::ConsigneeName,
                self.company_name.trim().to_string(),
            ),
            Edit::SetField(
                DocumentField::ConsigneeAddress,
                or_company(&self.address, company, |c| &c.address),
            ),
            Edit::SetField(
                DocumentField::ConsigneeState,
                or_company(&self.state, company, |c| &c.state),
            ),
            Edit::SetField(
                DocumentField::ConsigneeContactName,
                or_company(self.salesperson(), company, |c| &c.contact_name),
            ),
            Edit::SetField(
                DocumentField::ConsigneeContactNo,
                or_company(&self.phone_number, company, |c| &c.contact_no),
            ),
            Edit::SetField(
                DocumentField::ConsigneeGstin,
                or_company(&self.gstin, company, |c| &c.gstin),
            ),
        ];
        if let Some(state_code) = company.map(|c| c.state_code.trim()).filter(|s| !s.is_empty()) {
            edits.push(Edit::SetField(
                DocumentField::ConsigneeStateCode,
                state_code.to_string(),
            ));
        }

        let items: Vec<LineItem> = self
            .items()
            .into_iter()
            .map(|requested| {
                let mut item = LineItem::new(requested.name, requested.quantity, Decimal::ZERO);
                if let Some(product) = catalog.lookup(&item.name) {
                    item.code.clone_from(&product.code);
                    item.description.clone_from(&product.description);
                    item.rate = product.rate;
                }
                item.gst_rate = DEFAULT_ITEM_GST_RATE;
                item.recompute();
                item
            })
            .collect();
        if !items.is_empty() {
            edits.push(Edit::ReplaceItems(items));
        }
        edits
    }
}

fn or_company(
    own: &str,
    company: Option<&CompanyDetails>,
    field: fn(&CompanyDetails) -> &str,
) -> String {
    let own = own.trim();
    if own.is_empty() {
        company.map(field).unwrap_or_default().trim().to_string()
    } else {
        own.to_string()
    }
}

/// Accept strings and numbers as text; anything else is empty.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_text(&value).value().unwrap_or_default())
}
