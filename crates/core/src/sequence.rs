//! Human-readable sequence identifiers (`LD-001`, `DO-07`, `QN-042`).
//!
//! An identifier is a prefix, a dash and a run of decimal digits. The next
//! identifier is derived from the latest issued one by incrementing the digits
//! and re-padding them to the width configured for that prefix. Digit runs of
//! any length are supported, so a three-digit sequence rolls from `999` to
//! `1000` instead of wrapping or truncating.
//!
//! Generation is pure. Callers supply the true latest identifier and are
//! responsible for claiming the result atomically; two sessions reading the
//! same latest value will compute the same next value.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pad width used for prefixes without an explicit registration.
pub const DEFAULT_WIDTH: usize = 3;

/// Prefix for lead numbers.
pub const LEAD_PREFIX: &str = "LD";

/// Prefix for dispatch order numbers.
pub const ORDER_PREFIX: &str = "DO";

/// Default prefix for quotation numbers.
pub const QUOTATION_PREFIX: &str = "QN";

/// Errors from parsing a sequence identifier or a width table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    /// The prefix is empty or contains the separator.
    #[error("invalid sequence prefix: {0:?}")]
    InvalidPrefix(String),
    /// The identifier has no `PREFIX-` part.
    #[error("identifier {0:?} has no prefix separator")]
    MissingSeparator(String),
    /// The part after the separator is not a run of digits.
    #[error("identifier {0:?} has a non-numeric suffix")]
    NonNumericSuffix(String),
    /// A width table entry is not `PREFIX=WIDTH`.
    #[error("invalid width entry {entry:?}: {reason}")]
    InvalidWidthEntry {
        /// The offending entry.
        entry: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// A parsed identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceNumber {
    prefix: String,
    digits: String,
}

impl SequenceNumber {
    /// Parse an identifier of the form `PREFIX-<digits>`.
    ///
    /// The prefix is everything before the last `-`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no separator, the prefix is empty, or the
    /// suffix is not made of ASCII digits.
    pub fn parse(input: &str) -> Result<Self, SequenceError> {
        let (prefix, digits) = input
            .rsplit_once('-')
            .ok_or_else(|| SequenceError::MissingSeparator(input.to_string()))?;
        validate_prefix(prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SequenceError::NonNumericSuffix(input.to_string()));
        }
        Ok(Self {
            prefix: prefix.to_string(),
            digits: digits.to_string(),
        })
    }

    /// Parse an identifier and require a specific prefix.
    ///
    /// Returns `None` for anything not matching `^PREFIX-(\d+)$`.
    #[must_use]
    pub fn parse_with_prefix(input: &str, prefix: &str) -> Option<Self> {
        Self::parse(input).ok().filter(|n| n.prefix == prefix)
    }

    /// The identifier prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The numeric suffix without leading zeros (`"0"` for all zeros).
    #[must_use]
    pub fn significant_digits(&self) -> &str {
        let trimmed = self.digits.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    }

    /// The successor of this identifier, padded to `width`.
    #[must_use]
    pub fn successor(&self, width: usize) -> Self {
        Self {
            prefix: self.prefix.clone(),
            digits: pad(&increment(self.significant_digits()), width),
        }
    }

    /// The first identifier of a sequence (`1` padded to `width`).
    #[must_use]
    pub fn seed(prefix: &str, width: usize) -> Self {
        Self {
            prefix: prefix.to_string(),
            digits: pad("1", width),
        }
    }

    fn numeric_cmp(&self, other: &Self) -> std::cmp::Ordering {
        let (a, b) = (self.significant_digits(), other.significant_digits());
        a.len().cmp(&b.len()).then_with(|| a.cmp(b))
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.digits)
    }
}

impl FromStr for SequenceNumber {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Pad widths per prefix.
///
/// ```
/// use salesdesk_core::sequence::SequenceRegistry;
///
/// let registry = SequenceRegistry::default();
/// assert_eq!(registry.next("LD", None), "LD-001");
/// assert_eq!(registry.next("LD", Some("LD-999")), "LD-1000");
/// assert_eq!(registry.next("DO", Some("DO-00")), "DO-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRegistry {
    widths: BTreeMap<String, usize>,
    default_width: usize,
}

impl Default for SequenceRegistry {
    /// `LD` and quotation numbers use three digits, `DO` uses two.
    fn default() -> Self {
        Self::empty()
            .with_width(LEAD_PREFIX, 3)
            .with_width(ORDER_PREFIX, 2)
            .with_width(QUOTATION_PREFIX, 3)
    }
}

impl SequenceRegistry {
    /// A registry with no prefixes; every prefix uses [`DEFAULT_WIDTH`].
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            widths: BTreeMap::new(),
            default_width: DEFAULT_WIDTH,
        }
    }

    /// Register (or replace) the pad width for a prefix.
    #[must_use]
    pub fn with_width(mut self, prefix: &str, width: usize) -> Self {
        self.widths.insert(prefix.to_string(), width.max(1));
        self
    }

    /// Parse a width table such as `"LD=3,DO=2"` on top of the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an entry is not `PREFIX=WIDTH` with a valid prefix
    /// and a positive width.
    pub fn with_table(mut self, table: &str) -> Result<Self, SequenceError> {
        for entry in table.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let invalid = |reason: &str| SequenceError::InvalidWidthEntry {
                entry: entry.to_string(),
                reason: reason.to_string(),
            };
            let (prefix, width) = entry
                .split_once('=')
                .ok_or_else(|| invalid("expected PREFIX=WIDTH"))?;
            let prefix = prefix.trim();
            validate_prefix(prefix).map_err(|e| invalid(&e.to_string()))?;
            let width = width
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|w| *w > 0)
                .ok_or_else(|| invalid("width must be a positive integer"))?;
            self.widths.insert(prefix.to_string(), width);
        }
        Ok(self)
    }

    /// Pad width for a prefix.
    #[must_use]
    pub fn width(&self, prefix: &str) -> usize {
        self.widths
            .get(prefix)
            .copied()
            .unwrap_or(self.default_width)
    }

    /// The identifier that follows `latest` in the `prefix` sequence.
    ///
    /// Falls back to the seed (`PREFIX-001` for a three-digit prefix) when
    /// `latest` is absent or does not match `^PREFIX-(\d+)$`.
    #[must_use]
    pub fn next(&self, prefix: &str, latest: Option<&str>) -> String {
        let width = self.width(prefix);
        latest
            .and_then(|l| SequenceNumber::parse_with_prefix(l, prefix))
            .map_or_else(
                || SequenceNumber::seed(prefix, width),
                |n| n.successor(width),
            )
            .to_string()
    }
}

/// The highest well-formed identifier of `prefix` among `candidates`.
///
/// Malformed entries and other prefixes are ignored. Comparison is numeric,
/// so `LD-1000` ranks above `LD-999`.
#[must_use]
pub fn latest_of<'a, I>(prefix: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter_map(|c| SequenceNumber::parse_with_prefix(c, prefix))
        .max_by(SequenceNumber::numeric_cmp)
        .map(|n| n.to_string())
}

fn validate_prefix(prefix: &str) -> Result<(), SequenceError> {
    if prefix.is_empty() || prefix.contains('-') || prefix.chars().any(char::is_whitespace) {
        return Err(SequenceError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Add one to a run of ASCII digits of any length.
fn increment(digits: &str) -> String {
    let mut out: Vec<u8> = digits.bytes().collect();
    for byte in out.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return String::from_utf8_lossy(&out).into_owned();
        }
    }
    let mut carried = String::with_capacity(out.len() + 1);
    carried.push('1');
    carried.push_str(&String::from_utf8_lossy(&out));
    carried
}

fn pad(digits: &str, width: usize) -> String {
    format!("{digits:0>width$}")
}
