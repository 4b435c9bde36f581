//! Untrusted quotation records as they come back from storage.
//!
//! A stored record may be partial, may use the editor's key names or the
//! persistence layer's, may spell keys in camelCase or snake_case, and may
//! carry numbers as JSON numbers or as text. [`RawQuotationRecord`] accepts
//! all of that. Building one never fails: unusable values are dropped and
//! their paths collected in [`RawQuotationRecord::malformed`]. Quantities and
//! money inputs above [`MAX_QUANTITY`] and [`MAX_PRICE`] count as unusable.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::date::parse_date;
use crate::document::DocumentField;
use crate::money::{MAX_PRICE, MAX_QUANTITY};

/// A field read from an untrusted record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field<T> {
    /// Missing, `null`, or blank text.
    Absent,
    /// Present but unusable.
    Malformed,
    Present(T),
}

impl<T> Field<T> {
    /// The value, treating malformed input as absent.
    pub fn value(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent | Self::Malformed => None,
        }
    }

    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed)
    }
}

/// A list field that may be stored delimited or as a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawList {
    /// A single string, possibly holding several `|`-separated entries.
    Joined(String),
    Items(Vec<String>),
}

/// One item of a stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLineItem {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub units: Option<String>,
    pub gst_rate: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub rate: Option<Decimal>,
    pub percent_discount: Option<Decimal>,
    pub flat_discount_per_unit: Option<Decimal>,
    /// The amount the record claims; never used as input.
    pub stored_amount: Option<Decimal>,
}

/// A stored quotation, every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawQuotationRecord {
    /// Free-text fields that were present.
    pub text: BTreeMap<DocumentField, String>,
    pub date: Option<NaiveDate>,
    /// Items that were objects, in stored order.
    pub items: Vec<RawLineItem>,
    pub total_flat_discount: Option<Decimal>,
    pub special_discount: Option<Decimal>,
    pub is_igst: Option<bool>,
    pub cgst_rate: Option<Decimal>,
    pub sgst_rate: Option<Decimal>,
    pub igst_rate: Option<Decimal>,
    pub special_offers: Option<RawList>,
    pub notes: Option<RawList>,
    /// The grand total the record claims; never used as input.
    pub stored_grand_total: Option<Decimal>,
    pub pdf_url: Option<String>,
    /// Paths of values that were present but unusable, e.g. `items[1].qty`.
    pub malformed: Vec<String>,
}

const DATE_KEYS: &[&str] = &["date", "quotationDate"];
const GRAND_TOTAL_KEYS: &[&str] = &["grandTotal", "total"];
const ITEM_KEYS: &[&str] = &["items"];

impl RawQuotationRecord {
    /// Read a record from any JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut record = Self::default();
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return record,
            _ => {
                record.malformed.push("record".to_string());
                return record;
            }
        };
        let mut reader = Reader {
            map,
            path: String::new(),
            malformed: &mut record.malformed,
        };

        for field in DocumentField::ALL {
            if let Some(text) = reader.text(field.keys()) {
                record.text.insert(*field, text);
            }
        }
        record.date = reader.date(DATE_KEYS);
        record.total_flat_discount = reader.bounded(&["totalFlatDiscount"], MAX_PRICE);
        record.special_discount = reader.bounded(&["specialDiscount"], MAX_PRICE);
        record.is_igst = reader.boolean(&["isIGST"]);
        record.cgst_rate = reader.decimal(&["cgstRate"]);
        record.sgst_rate = reader.decimal(&["sgstRate"]);
        record.igst_rate = reader.decimal(&["igstRate"]);
        record.special_offers = reader.list(&["specialOffers"]);
        record.notes = reader.list(&["notes"]);
        record.stored_grand_total = reader.decimal(GRAND_TOTAL_KEYS);
        record.pdf_url = reader.text(&["pdfUrl"]);
        record.items = reader.items(ITEM_KEYS);
        record
    }

    /// Text of a scalar field, if it was present.
    #[must_use]
    pub fn text(&self, field: DocumentField) -> Option<&str> {
        self.text.get(&field).map(String::as_str)
    }
}

impl From<&Value> for RawQuotationRecord {
    fn from(value: &Value) -> Self {
        Self::from_value(value)
    }
}

impl<'de> Deserialize<'de> for RawQuotationRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

struct Reader<'a> {
    map: &'a Map<String, Value>,
    path: String,
    malformed: &'a mut Vec<String>,
}

impl<'a> Reader<'a> {
    /// First non-null value under any alias, camelCase before snake_case.
    fn find(&self, keys: &[&'static str]) -> Option<(String, &'a Value)> {
        keys.iter().find_map(|key| {
            let snake = snake_case(key);
            [key.to_string(), snake]
                .into_iter()
                .find_map(|k| self.map.get(&k).filter(|v| !v.is_null()).map(|v| (k, v)))
        })
    }

    fn read<T>(&mut self, keys: &[&'static str], parse: impl Fn(&Value) -> Field<T>) -> Option<T> {
        let (key, value) = self.find(keys)?;
        match parse(value) {
            Field::Present(parsed) => Some(parsed),
            Field::Absent => None,
            Field::Malformed => {
                self.malformed.push(format!("{}{key}", self.path));
                None
            }
        }
    }

    fn text(&mut self, keys: &[&'static str]) -> Option<String> {
        self.read(keys, parse_text)
    }

    fn decimal(&mut self, keys: &[&'static str]) -> Option<Decimal> {
        self.read(keys, parse_decimal)
    }

    /// A decimal no larger than `max`; anything larger is malformed.
    fn bounded(&mut self, keys: &[&'static str], max: Decimal) -> Option<Decimal> {
        self.read(keys, |value| match parse_decimal(value) {
            Field::Present(n) if n > max => Field::Malformed,
            other => other,
        })
    }

    fn boolean(&mut self, keys: &[&'static str]) -> Option<bool> {
        self.read(keys, parse_bool)
    }

    fn date(&mut self, keys: &[&'static str]) -> Option<NaiveDate> {
        self.read(keys, |value| match parse_text(value) {
            Field::Present(text) if text.trim().is_empty() => Field::Absent,
            Field::Present(text) => parse_date(&text).map_or(Field::Malformed, Field::Present),
            Field::Absent => Field::Absent,
            Field::Malformed => Field::Malformed,
        })
    }

    fn list(&mut self, keys: &[&'static str]) -> Option<RawList> {
        self.read(keys, |value| match value {
            Value::String(s) => Field::Present(RawList::Joined(s.clone())),
            Value::Array(entries) => entries
                .iter()
                .map(|entry| match entry {
                    Value::Null => Some(String::new()),
                    other => parse_text(other).value(),
                })
                .collect::<Option<Vec<_>>>()
                .map_or(Field::Malformed, |items| Field::Present(RawList::Items(items))),
            _ => Field::Malformed,
        })
    }

    fn items(&mut self, keys: &[&'static str]) -> Vec<RawLineItem> {
        let Some((key, value)) = self.find(keys) else {
            return Vec::new();
        };
        let decoded;
        let entries = match value {
            Value::Array(entries) => entries,
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Array(entries)) => {
                    decoded = entries;
                    &decoded
                }
                _ => {
                    self.malformed.push(format!("{}{key}", self.path));
                    return Vec::new();
                }
            },
            _ => {
                self.malformed.push(format!("{}{key}", self.path));
                return Vec::new();
            }
        };

        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let path = format!("{}{key}[{index}]", self.path);
            let Value::Object(map) = entry else {
                self.malformed.push(path);
                continue;
            };
            let mut item_reader = Reader {
                map,
                path: format!("{path}."),
                malformed: &mut *self.malformed,
            };
            items.push(item_reader.line_item());
        }
        items
    }

    fn line_item(&mut self) -> RawLineItem {
        RawLineItem {
            code: self.text(&["code"]),
            name: self.text(&["name"]),
            description: self.text(&["description"]),
            units: self.text(&["units"]),
            gst_rate: self.decimal(&["gstRate", "gst"]),
            quantity: self.bounded(&["quantity", "qty"], MAX_QUANTITY),
            rate: self.bounded(&["rate"], MAX_PRICE),
            percent_discount: self.decimal(&["percentDiscount", "discount"]),
            flat_discount_per_unit: self
                .bounded(&["flatDiscountPerUnit", "flatDiscount"], MAX_PRICE),
            stored_amount: self.decimal(&["amount"]),
        }
    }
}

/// Text from a string or number. Booleans and containers are malformed.
#[must_use]
pub fn parse_text(value: &Value) -> Field<String> {
    match value {
        Value::Null => Field::Absent,
        Value::String(s) => Field::Present(s.clone()),
        Value::Number(n) => Field::Present(n.to_string()),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => Field::Malformed,
    }
}

/// A decimal from a JSON number or numeric text.
///
/// Thousands separators are ignored and blank text counts as absent.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salesdesk_core::raw::{Field, parse_decimal};
/// use serde_json::json;
///
/// assert_eq!(parse_decimal(&json!(12.5)), Field::Present(dec!(12.5)));
/// assert_eq!(parse_decimal(&json!("1,250.00")), Field::Present(dec!(1250.00)));
/// assert_eq!(parse_decimal(&json!("  ")), Field::Absent);
/// assert_eq!(parse_decimal(&json!("twelve")), Field::Malformed);
/// ```
#[must_use]
pub fn parse_decimal(value: &Value) -> Field<Decimal> {
    let text = match value {
        Value::Null => return Field::Absent,
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            if cleaned.is_empty() {
                return Field::Absent;
            }
            cleaned
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => return Field::Malformed,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_or(Field::Malformed, Field::Present)
}

/// A flag from a boolean, `0`/`1`, or `true`/`false`/`yes`/`no` text.
#[must_use]
pub fn parse_bool(value: &Value) -> Field<bool> {
    match value {
        Value::Null => Field::Absent,
        Value::Bool(b) => Field::Present(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Field::Present(false),
            Some(1) => Field::Present(true),
            _ => Field::Malformed,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Field::Absent,
            "true" | "yes" | "1" => Field::Present(true),
            "false" | "no" | "0" => Field::Present(false),
            _ => Field::Malformed,
        },
        Value::Array(_) | Value::Object(_) => Field::Malformed,
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    let mut previous_lower = false;
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            if previous_lower {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
            previous_lower = false;
        } else {
            out.push(c);
            previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}
