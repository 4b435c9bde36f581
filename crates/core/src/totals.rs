//! Document totals: subtotal, flat discount, GST and special discount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::line_item::LineItem;
use crate::money::{MAX_PRICE, bounded, clamp_percent, non_negative, percent_of, round_money};

/// Standard intra-state split used when a record carries no tax data.
pub const DEFAULT_CGST_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 0);

/// See [`DEFAULT_CGST_RATE`].
pub const DEFAULT_SGST_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 0);

/// How GST is charged on a quotation.
///
/// Intra-state supplies split the tax into central and state halves;
/// inter-state supplies carry a single integrated rate. The two are mutually
/// exclusive, so switching variants discards the rates of the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TaxMode {
    /// CGST + SGST.
    #[serde(rename_all = "camelCase")]
    Intrastate {
        /// Central GST rate in percent.
        cgst_rate: Decimal,
        /// State GST rate in percent.
        sgst_rate: Decimal,
    },
    /// IGST.
    #[serde(rename_all = "camelCase")]
    Interstate {
        /// Integrated GST rate in percent.
        igst_rate: Decimal,
    },
}

impl Default for TaxMode {
    fn default() -> Self {
        Self::Intrastate {
            cgst_rate: DEFAULT_CGST_RATE,
            sgst_rate: DEFAULT_SGST_RATE,
        }
    }
}

impl TaxMode {
    /// Intra-state mode with the given rates, each clamped to `0..=100`.
    #[must_use]
    pub fn split(cgst_rate: Decimal, sgst_rate: Decimal) -> Self {
        Self::Intrastate {
            cgst_rate: clamp_percent(cgst_rate),
            sgst_rate: clamp_percent(sgst_rate),
        }
    }

    /// Inter-state mode with the given rate, clamped to `0..=100`.
    #[must_use]
    pub fn integrated(igst_rate: Decimal) -> Self {
        Self::Interstate {
            igst_rate: clamp_percent(igst_rate),
        }
    }

    /// Whether this is the IGST variant.
    #[must_use]
    pub const fn is_igst(&self) -> bool {
        matches!(self, Self::Interstate { .. })
    }

    /// Combined rate in percent.
    #[must_use]
    pub fn combined_rate(&self) -> Decimal {
        match *self {
            Self::Intrastate {
                cgst_rate,
                sgst_rate,
            } => cgst_rate.saturating_add(sgst_rate),
            Self::Interstate { igst_rate } => igst_rate,
        }
    }

    /// Compute the tax on `taxable`.
    #[must_use]
    pub fn apply(&self, taxable: Decimal) -> TaxBreakdown {
        match *self {
            Self::Intrastate {
                cgst_rate,
                sgst_rate,
            } => TaxBreakdown::Split {
                cgst_rate,
                cgst_amount: percent_of(taxable, cgst_rate),
                sgst_rate,
                sgst_amount: percent_of(taxable, sgst_rate),
            },
            Self::Interstate { igst_rate } => TaxBreakdown::Integrated {
                igst_rate,
                igst_amount: percent_of(taxable, igst_rate),
            },
        }
    }
}

/// Tax charged on a document. Exactly one variant is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TaxBreakdown {
    /// CGST and SGST amounts.
    #[serde(rename_all = "camelCase")]
    Split {
        /// Central rate in percent.
        cgst_rate: Decimal,
        /// Central amount.
        cgst_amount: Decimal,
        /// State rate in percent.
        sgst_rate: Decimal,
        /// State amount.
        sgst_amount: Decimal,
    },
    /// IGST amount.
    #[serde(rename_all = "camelCase")]
    Integrated {
        /// Integrated rate in percent.
        igst_rate: Decimal,
        /// Integrated amount.
        igst_amount: Decimal,
    },
}

impl TaxBreakdown {
    /// Sum of every tax amount.
    #[must_use]
    pub fn total(&self) -> Decimal {
        match *self {
            Self::Split {
                cgst_amount,
                sgst_amount,
                ..
            } => cgst_amount.saturating_add(sgst_amount),
            Self::Integrated { igst_amount, .. } => igst_amount,
        }
    }
}

/// Derived figures for a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    /// Sum of item amounts.
    pub subtotal: Decimal,
    /// Document-level flat discount actually applied.
    pub total_flat_discount: Decimal,
    /// Subtotal less the flat discount, floored at zero.
    pub taxable_amount: Decimal,
    /// Tax on the taxable amount.
    pub taxes: TaxBreakdown,
    /// Special discount deducted after tax.
    pub special_discount: Decimal,
    /// Final amount payable, floored at zero.
    pub grand_total: Decimal,
}

/// Inputs to [`compute_totals`] besides the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TotalsInput {
    /// Document-level flat discount, applied before tax.
    pub total_flat_discount: Decimal,
    /// Document-level special discount, applied after tax.
    pub special_discount: Decimal,
    /// Tax mode and rates.
    pub tax_mode: TaxMode,
}

/// Aggregate line items into document totals.
///
/// Item amounts are recomputed here rather than read from the items, so the
/// result depends only on the item inputs. Sums saturate at `Decimal::MAX`
/// instead of overflowing.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salesdesk_core::line_item::LineItem;
/// use salesdesk_core::totals::{TaxMode, TotalsInput, compute_totals};
///
/// let items = [LineItem::new("Valve", dec!(2), dec!(100))
///     .with_percent_discount(dec!(10))
///     .with_flat_discount(dec!(5))];
/// let totals = compute_totals(&items, &TotalsInput {
///     total_flat_discount: dec!(0),
///     special_discount: dec!(10),
///     tax_mode: TaxMode::split(dec!(9), dec!(9)),
/// });
/// assert_eq!(totals.grand_total, dec!(190.60));
/// ```
#[must_use]
pub fn compute_totals(items: &[LineItem], input: &TotalsInput) -> Totals {
    let subtotal = round_money(
        items
            .iter()
            .map(crate::line_item::compute_amount)
            .fold(Decimal::ZERO, Decimal::saturating_add),
    );
    let total_flat_discount = bounded(input.total_flat_discount, MAX_PRICE);
    let special_discount = bounded(input.special_discount, MAX_PRICE);
    let taxable_amount = non_negative(subtotal - total_flat_discount);
    let taxes = input.tax_mode.apply(taxable_amount);
    let grand_total = non_negative(round_money(
        taxable_amount
            .saturating_add(taxes.total())
            .saturating_sub(special_discount),
    ));

    Totals {
        subtotal,
        total_flat_discount,
        taxable_amount,
        taxes,
        special_discount,
        grand_total,
    }
}
