//! Composite bill identifiers.
//!
//! A composite bill identifier is a customer code immediately followed by the four digit `MMYY`
//! billing period the bill covers: `CUSTOMER1234` billed for `08/2025` becomes
//! `CUSTOMER12340825`.

use crate::{UuidError, UuidResult};
use chrono::{Datelike, Utc};
use std::{fmt, ops::RangeInclusive, str::FromStr};

/// Minimum total length of a composite bill identifier (customer code plus `MMYY`).
pub const MIN_BILL_ID_LEN: usize = 8;

/// Number of trailing digits encoding the billing period.
const PERIOD_SUFFIX_LEN: usize = 4;

const DEFAULT_YEAR_MIN: u8 = 24;
const DEFAULT_YEAR_MAX: u8 = 29;

/// Returns true if `candidate` is a composite bill identifier accepted by the default
/// [`BillYearWindow`].
///
/// Never panics: empty strings, short strings and non-numeric suffixes are all just invalid.
pub fn is_valid_composite_bill_id(candidate: &str) -> bool {
    BillYearWindow::default().accepts(candidate)
}

/// Builds a composite bill identifier from a customer code and a `MM/YYYY` billing cycle.
///
/// If `billing_cycle` does not parse (wrong separator, non-numeric parts, wrong field count or an
/// out-of-range month) the current UTC month and year are used instead. This leniency is kept on
/// purpose for existing callers; it is logged at `warn` level because it can hide a caller
/// sending a badly formatted cycle.
///
/// The result is not validated: a short customer code produces an identifier that
/// [`is_valid_composite_bill_id`] will reject.
pub fn generate_composite_bill_id(customer_code: &str, billing_cycle: &str) -> String {
    let period = BillingPeriod::from_cycle_or_current(billing_cycle);
    format!("{}{}", customer_code, period.suffix())
}

/// Range of two-digit years accepted in a composite bill identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BillYearWindow {
    min: u8,
    max: u8,
}

impl Default for BillYearWindow {
    fn default() -> Self {
        Self {
            min: DEFAULT_YEAR_MIN,
            max: DEFAULT_YEAR_MAX,
        }
    }
}

impl BillYearWindow {
    /// Creates a window accepting two-digit years `min..=max`.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] unless `min <= max <= 99`.
    pub fn new(min: u8, max: u8) -> UuidResult<Self> {
        if min > max || max > 99 {
            return Err(UuidError::InvalidInput(format!(
                "bill year window must satisfy min <= max <= 99, got {}..={}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn range(&self) -> RangeInclusive<u8> {
        self.min..=self.max
    }

    /// Returns true if the two-digit year `yy` falls inside the window.
    pub fn contains(&self, yy: u8) -> bool {
        self.range().contains(&yy)
    }

    /// Returns true if `candidate` is a composite bill identifier accepted by this window.
    pub fn accepts(&self, candidate: &str) -> bool {
        BillId::parse_with(candidate, *self).is_ok()
    }
}

/// A calendar month used as a billing period.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Creates a billing period, rejecting months outside `1..=12` and years outside
    /// `0..=9999`.
    pub fn new(month: u32, year: i32) -> UuidResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(UuidError::InvalidBillingCycle(format!(
                "month must be 01-12, got {}",
                month
            )));
        }
        if !(0..=9999).contains(&year) {
            return Err(UuidError::InvalidBillingCycle(format!(
                "year must have four digits, got {}",
                year
            )));
        }
        Ok(Self { year, month })
    }

    /// The current UTC calendar month.
    pub fn current() -> Self {
        let today = Utc::now().date_naive();
        Self {
            year: today.year(),
            month: today.month(),
        }
    }

    /// Strictly parses a `MM/YYYY` billing cycle.
    ///
    /// The month may be one or two digits (`8/2025` and `08/2025` are equivalent). The year must
    /// be exactly four digits. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidBillingCycle`] for anything else.
    pub fn parse_cycle(billing_cycle: &str) -> UuidResult<Self> {
        let invalid = || {
            UuidError::InvalidBillingCycle(format!(
                "expected MM/YYYY, got: '{}'",
                billing_cycle
            ))
        };

        let mut parts = billing_cycle.trim().split('/');
        let (Some(month), Some(year), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };

        let digits = |s: &str, len: RangeInclusive<usize>| {
            len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(month, 1..=2) || !digits(year, 4..=4) {
            return Err(invalid());
        }

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::new(month, year)
    }

    /// Parses `billing_cycle`, falling back to [`BillingPeriod::current`] if it is malformed.
    pub fn from_cycle_or_current(billing_cycle: &str) -> Self {
        match Self::parse_cycle(billing_cycle) {
            Ok(period) => period,
            Err(e) => {
                let current = Self::current();
                tracing::warn!(
                    error = %e,
                    fallback = %current.cycle(),
                    "malformed billing cycle, using current month"
                );
                current
            }
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The two-digit year.
    pub fn short_year(&self) -> u8 {
        // year is bounded to 0..=9999 so the remainder always fits
        (self.year % 100) as u8
    }

    /// The four digit `MMYY` suffix used in composite bill identifiers.
    pub fn suffix(&self) -> String {
        format!("{:02}{:02}", self.month, self.short_year())
    }

    /// The `MM/YYYY` textual form.
    pub fn cycle(&self) -> String {
        format!("{:02}/{:04}", self.month, self.year)
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cycle())
    }
}

/// A validated composite bill identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BillId {
    customer_code: String,
    month: u32,
    short_year: u8,
}

impl BillId {
    /// Validates `input` against the default [`BillYearWindow`].
    pub fn parse(input: &str) -> UuidResult<Self> {
        Self::parse_with(input, BillYearWindow::default())
    }

    /// Validates `input` against `window`.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidBillId`] naming the first rule `input` breaks.
    pub fn parse_with(input: &str, window: BillYearWindow) -> UuidResult<Self> {
        let invalid = |reason: &str| UuidError::InvalidBillId(format!("'{}': {}", input, reason));

        if input.chars().count() < MIN_BILL_ID_LEN {
            return Err(invalid("too short"));
        }

        // At least MIN_BILL_ID_LEN chars, so there are at least PERIOD_SUFFIX_LEN bytes.
        let split = input.len() - PERIOD_SUFFIX_LEN;
        let suffix = &input.as_bytes()[split..];
        if !suffix.iter().all(u8::is_ascii_digit) {
            return Err(invalid("billing period suffix must be four digits"));
        }

        // The suffix is ASCII, so `split` lies on a char boundary.
        let (customer_code, _) = input.split_at(split);
        let month = u32::from(suffix[0] - b'0') * 10 + u32::from(suffix[1] - b'0');
        let short_year = (suffix[2] - b'0') * 10 + (suffix[3] - b'0');

        if !(1..=12).contains(&month) {
            return Err(invalid("month must be 01-12"));
        }
        if !window.contains(short_year) {
            return Err(invalid(&format!(
                "year {:02} outside accepted window {:02}-{:02}",
                short_year,
                window.min(),
                window.max()
            )));
        }

        Ok(Self {
            customer_code: customer_code.to_string(),
            month,
            short_year,
        })
    }

    pub fn customer_code(&self) -> &str {
        &self.customer_code
    }

    /// The billing period, assuming the 21st century for the two-digit year.
    pub fn period(&self) -> BillingPeriod {
        BillingPeriod {
            year: 2000 + i32::from(self.short_year),
            month: self.month,
        }
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}{:02}",
            self.customer_code, self.month, self.short_year
        )
    }
}

impl FromStr for BillId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BillId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_composite_bill_id() {
        assert!(is_valid_composite_bill_id("CUSTOMER12340825"));
        assert!(is_valid_composite_bill_id("ACME0124"));
        assert!(is_valid_composite_bill_id("ACME1229"));
    }

    #[test]
    fn test_rejects_short_and_empty() {
        assert!(!is_valid_composite_bill_id(""));
        assert!(!is_valid_composite_bill_id("SHORT12"));
        assert!(!is_valid_composite_bill_id("ABC0825"));
    }

    #[test]
    fn test_min_length_boundary() {
        assert!(!is_valid_composite_bill_id("AB0825"));
        assert!(!is_valid_composite_bill_id("ABC0825"));
        assert!(is_valid_composite_bill_id("ABCD0825"));
        assert_eq!(MIN_BILL_ID_LEN, 8);
    }

    #[test]
    fn test_rejects_non_numeric_suffix() {
        assert!(!is_valid_composite_bill_id("CUSTOMER12AB"));
        assert!(!is_valid_composite_bill_id("CUSTOMER082é"));
    }

    #[test]
    fn test_rejects_out_of_range_month() {
        assert!(!is_valid_composite_bill_id("CUSTOMER123413"));
        assert!(!is_valid_composite_bill_id("CUSTOMER12341325"));
        assert!(!is_valid_composite_bill_id("CUSTOMER12340025"));
    }

    #[test]
    fn test_rejects_out_of_window_year() {
        assert!(!is_valid_composite_bill_id("CUSTOMER123422"));
        assert!(!is_valid_composite_bill_id("CUSTOMER12340822"));
        assert!(!is_valid_composite_bill_id("CUSTOMER12340823"));
        assert!(!is_valid_composite_bill_id("CUSTOMER12340830"));
    }

    #[test]
    fn test_parse_reports_reason() {
        match BillId::parse("CUSTOMER12341325") {
            Err(UuidError::InvalidBillId(msg)) => assert!(msg.contains("month")),
            _ => panic!("Expected InvalidBillId error"),
        }
        match BillId::parse("CUSTOMER12340822") {
            Err(UuidError::InvalidBillId(msg)) => assert!(msg.contains("year 22")),
            _ => panic!("Expected InvalidBillId error"),
        }
    }

    #[test]
    fn test_parse_exposes_parts() {
        let bill_id = BillId::parse("CUSTOMER12340825").unwrap();

        assert_eq!(bill_id.customer_code(), "CUSTOMER1234");
        assert_eq!(bill_id.period(), BillingPeriod::new(8, 2025).unwrap());
        assert_eq!(bill_id.to_string(), "CUSTOMER12340825");
    }

    #[test]
    fn test_custom_window() {
        let window = BillYearWindow::new(20, 22).unwrap();

        assert!(window.accepts("CUSTOMER12340822"));
        assert!(!window.accepts("CUSTOMER12340825"));
        assert!(BillYearWindow::new(30, 20).is_err());
        assert!(BillYearWindow::new(0, 100).is_err());
    }

    #[test]
    fn test_generate_from_cycle() {
        let bill_id = generate_composite_bill_id("CUSTOMER1234", "08/2025");

        assert_eq!(bill_id, "CUSTOMER12340825");
        assert!(is_valid_composite_bill_id(&bill_id));
    }

    #[test]
    fn test_generate_accepts_single_digit_month() {
        assert_eq!(
            generate_composite_bill_id("CUSTOMER1234", "8/2025"),
            "CUSTOMER12340825"
        );
    }

    #[test]
    fn test_generate_falls_back_to_current_month() {
        let expected = format!("CUSTOMER1234{}", BillingPeriod::current().suffix());

        for cycle in ["invalid_format", "08-2025", "08/25", "aa/2025", "08/2025/01", "13/2025", ""] {
            let bill_id = generate_composite_bill_id("CUSTOMER1234", cycle);
            assert_eq!(bill_id, expected, "cycle {:?}", cycle);
        }
    }

    #[test]
    fn test_generate_fallback_is_valid_in_current_window() {
        let bill_id = generate_composite_bill_id("CUSTOMER1234", "invalid_format");
        let current = BillingPeriod::current();
        let window = BillYearWindow::new(current.short_year(), current.short_year()).unwrap();

        assert!(window.accepts(&bill_id));
        if BillYearWindow::default().contains(current.short_year()) {
            assert!(is_valid_composite_bill_id(&bill_id));
        }
    }

    #[test]
    fn test_parse_cycle_strict() {
        let period = BillingPeriod::parse_cycle(" 12/2026 ").unwrap();
        assert_eq!(period.month(), 12);
        assert_eq!(period.year(), 2026);
        assert_eq!(period.cycle(), "12/2026");
        assert_eq!(period.suffix(), "1226");

        match BillingPeriod::parse_cycle("2025/08") {
            Err(UuidError::InvalidBillingCycle(msg)) => assert!(msg.contains("MM/YYYY")),
            _ => panic!("Expected InvalidBillingCycle error"),
        }
        assert!(BillingPeriod::parse_cycle("+8/2025").is_err());
        assert!(BillingPeriod::parse_cycle("00/2025").is_err());
    }
}
