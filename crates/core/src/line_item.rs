//! Quotation line items and their amount calculation.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::money::{
    HUNDRED, MAX_PRICE, MAX_QUANTITY, bounded, clamp_percent, non_negative, round_money,
};

/// Default unit of measure for new items.
pub const DEFAULT_UNITS: &str = "Nos";

/// GST rate applied to items created from a lead or catalog selection.
pub const DEFAULT_ITEM_GST_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// A single priced line on a quotation.
///
/// `amount` is derived. It is recomputed from the other fields whenever the
/// owning document changes and is never read back as input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product code, empty when unknown.
    pub code: String,
    /// Product name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// GST rate in percent, for display on the document.
    pub gst_rate: Decimal,
    /// Quantity, `0..=MAX_QUANTITY`.
    pub quantity: Decimal,
    /// Unit of measure.
    pub units: String,
    /// Price per unit, `0..=MAX_PRICE`.
    pub rate: Decimal,
    /// Percentage discount, `0..=100`.
    pub percent_discount: Decimal,
    /// Flat discount per unit, `0..=MAX_PRICE`.
    pub flat_discount_per_unit: Decimal,
    amount: Decimal,
}

impl Default for LineItem {
    fn default() -> Self {
        Self {
            code: String::new(),
            name: String::new(),
            description: String::new(),
            gst_rate: DEFAULT_ITEM_GST_RATE,
            quantity: Decimal::ZERO,
            units: DEFAULT_UNITS.to_string(),
            rate: Decimal::ZERO,
            percent_discount: Decimal::ZERO,
            flat_discount_per_unit: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }
}

impl LineItem {
    /// Create an item with a name, quantity and rate; other fields default.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        let mut item = Self {
            name: name.into(),
            quantity,
            rate,
            ..Self::default()
        };
        item.recompute();
        item
    }

    /// Set the percentage discount (builder style).
    #[must_use]
    pub fn with_percent_discount(mut self, percent: Decimal) -> Self {
        self.percent_discount = percent;
        self.recompute();
        self
    }

    /// Set the flat per-unit discount (builder style).
    #[must_use]
    pub fn with_flat_discount(mut self, per_unit: Decimal) -> Self {
        self.flat_discount_per_unit = per_unit;
        self.recompute();
        self
    }

    /// The derived amount as of the last recomputation.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.amount
    }

    /// Clamp inputs to their domains, fill a blank unit, and re-derive the
    /// amount.
    pub fn recompute(&mut self) {
        self.gst_rate = clamp_percent(self.gst_rate);
        self.quantity = bounded(self.quantity, MAX_QUANTITY);
        self.rate = bounded(self.rate, MAX_PRICE);
        self.percent_discount = clamp_percent(self.percent_discount);
        self.flat_discount_per_unit = bounded(self.flat_discount_per_unit, MAX_PRICE);
        if self.units.trim().is_empty() {
            self.units = DEFAULT_UNITS.to_string();
        }
        self.amount = compute_amount(self);
    }
}

/// The amount of a line: quantity times rate, less the percentage discount,
/// less the flat discount for every unit, floored at zero and rounded.
///
/// Inputs are clamped to their domains first, so the arithmetic cannot
/// overflow whatever the fields hold.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salesdesk_core::line_item::{LineItem, compute_amount};
///
/// let item = LineItem::new("Valve", dec!(2), dec!(100))
///     .with_percent_discount(dec!(10))
///     .with_flat_discount(dec!(5));
/// assert_eq!(compute_amount(&item), dec!(170.00));
/// ```
#[must_use]
pub fn compute_amount(item: &LineItem) -> Decimal {
    let quantity = bounded(item.quantity, MAX_QUANTITY);
    let base = quantity * bounded(item.rate, MAX_PRICE);
    let discounted = base * (Decimal::ONE - clamp_percent(item.percent_discount) / HUNDRED);
    let flat = bounded(item.flat_discount_per_unit, MAX_PRICE) * quantity;
    round_money(non_negative(discounted - flat))
}
