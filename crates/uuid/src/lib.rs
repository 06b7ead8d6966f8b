//! Identifier utilities for billcheck records.
//!
//! Two identifier shapes live here:
//!
//! - The **generic identifier** assigned to every stored entity. Its canonical form is the
//!   hyphenated 8-4-4-4-12 grouping of 32 lowercase hex characters, for example
//!   `550e8400-e29b-41d4-a716-446655440000`. Validation is case-insensitive; generation always
//!   produces lowercase.
//! - The **composite bill identifier** which encodes a customer code followed by a four digit
//!   `MMYY` billing period, for example `CUSTOMER12340825` (customer `CUSTOMER1234`, August 2025).
//!
//! ## Composite bill identifier rules
//! - At least [`MIN_BILL_ID_LEN`] characters in total
//! - The last four characters are ASCII digits
//! - The first two of those digits are a month in `01..=12`
//! - The last two are a year accepted by the [`BillYearWindow`] (default `24..=29`)
//!
//! Generation from a `MM/YYYY` billing cycle is deliberately lenient: a cycle that does not parse
//! falls back to the current UTC month and year (see [`generate_composite_bill_id`]).

mod bill_id;
mod service;

pub use bill_id::{
    generate_composite_bill_id, is_valid_composite_bill_id, BillId, BillYearWindow,
    BillingPeriod, MIN_BILL_ID_LEN,
};
pub use service::{generate_id, is_valid_id, Identifier, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid generic identifier
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Composite bill identifier rejected by the validation rules
    #[error("Invalid bill id: {0}")]
    InvalidBillId(String),
    /// Billing cycle not in `MM/YYYY` form
    #[error("Invalid billing cycle: {0}")]
    InvalidBillingCycle(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
