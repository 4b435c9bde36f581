//! Monetary rounding shared by every calculator.
//!
//! All amounts are `Decimal` in the currency's standard unit (rupees, not
//! paise). Every derived figure is rounded with [`round_money`], which rounds
//! half away from zero at two decimal places. Line amounts and document totals
//! use the same rule so a stored quotation reproduces bit-for-bit.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on every derived monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Largest difference between a stored and a recomputed amount that is still
/// considered consistent.
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One hundred, the divisor for percentage rates.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Largest quantity accepted on a line.
pub const MAX_QUANTITY: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Largest unit rate, per-unit discount or document-level discount accepted.
///
/// With [`MAX_QUANTITY`] this keeps every line amount below `10^21`, far
/// inside `Decimal`'s range.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Round a monetary value to two decimals, half away from zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use salesdesk_core::money::round_money;
///
/// assert_eq!(round_money(dec!(15.305)), dec!(15.31));
/// assert_eq!(round_money(dec!(15.304)), dec!(15.30));
/// ```
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * rate / 100`, rounded. The rate is clamped to `0..=100`, so the
/// result never exceeds `amount`.
#[must_use]
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount / HUNDRED * clamp_percent(rate))
}

/// Clamp a value to zero or above.
#[must_use]
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Clamp a value to `0..=max`.
#[must_use]
pub fn bounded(value: Decimal, max: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, max)
}

/// Clamp a percentage to `0..=100`.
#[must_use]
pub fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, HUNDRED)
}

/// Whether two amounts agree within [`TOLERANCE`].
#[must_use]
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b).is_some_and(|diff| diff.abs() <= TOLERANCE)
}

/// Render an amount with exactly two decimals, e.g. `190.60`.
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", round_money(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_money(dec!(0.005)), dec!(0.01));
        assert_eq!(round_money(dec!(2.675)), dec!(2.68));
        assert_eq!(round_money(dec!(2.665)), dec!(2.67));
        assert_eq!(round_money(dec!(-0.005)), dec!(-0.01));
    }

    #[test]
    fn test_percent_of() {
        assert_eq!(percent_of(dec!(170), dec!(9)), dec!(15.30));
        assert_eq!(percent_of(dec!(33.33), dec!(18)), dec!(6.00));
        assert_eq!(percent_of(dec!(0), dec!(18)), dec!(0));
    }

    #[test]
    fn test_tolerance() {
        assert!(within_tolerance(dec!(190.60), dec!(190.61)));
        assert!(within_tolerance(dec!(190.61), dec!(190.60)));
        assert!(!within_tolerance(dec!(190.60), dec!(190.62)));
        assert!(!within_tolerance(Decimal::MIN, dec!(190.60)));
    }

    #[test]
    fn test_bounds() {
        assert_eq!(MAX_QUANTITY, dec!(1_000_000_000));
        assert_eq!(MAX_PRICE, dec!(1_000_000_000_000));
        assert_eq!(bounded(dec!(-1), MAX_PRICE), Decimal::ZERO);
        assert_eq!(bounded(Decimal::MAX, MAX_QUANTITY), MAX_QUANTITY);
        assert_eq!(bounded(dec!(12.5), MAX_QUANTITY), dec!(12.5));
    }

    #[test]
    fn test_percent_of_huge_amount() {
        let tax = percent_of(Decimal::MAX, dec!(18));
        assert!(tax > Decimal::ZERO && tax < Decimal::MAX);
        assert_eq!(percent_of(dec!(100), dec!(250)), dec!(100));
    }

    #[test]
    fn test_clamps() {
        assert_eq!(non_negative(dec!(-3)), Decimal::ZERO);
        assert_eq!(clamp_percent(dec!(120)), HUNDRED);
        assert_eq!(clamp_percent(dec!(-1)), Decimal::ZERO);
        assert_eq!(clamp_percent(dec!(12.5)), dec!(12.5));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec!(190.6)), "190.60");
        assert_eq!(format_money(dec!(0)), "0.00");
        assert_eq!(format_money(dec!(1234.567)), "1234.57");
    }
}
