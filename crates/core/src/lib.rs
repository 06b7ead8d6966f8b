//! # billcheck core
//!
//! Record handling for the billcheck service.
//!
//! This crate contains the pure document operations that sit between the HTTP layer and the
//! document store:
//! - [`DocumentNormalizer`] prepares records for writing and cleans them for responses
//! - [`validation`] checks caller-supplied identifiers and composite bill ids
//! - [`records`] builds the bill and admin-user records the service writes itself
//!
//! **No transport or storage concerns**: routing, database connections and the billing webhook
//! live in the callers of this crate.

pub mod config;
pub mod constants;
pub mod document;
pub mod error;
pub mod normalizer;
pub mod records;
pub mod validation;

pub use config::CoreConfig;
pub use document::Document;
pub use error::{CoreError, CoreResult, ValidationError};
pub use normalizer::DocumentNormalizer;

pub use billcheck_uuid::{
    generate_composite_bill_id, generate_id, is_valid_composite_bill_id, is_valid_id, BillId,
    BillYearWindow, BillingPeriod, Identifier,
};
