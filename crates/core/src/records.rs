//! Builders for the records the service writes itself.
//!
//! Both builders assemble the business fields and then run
//! [`DocumentNormalizer::prepare_document`], so the result is ready to insert.

use crate::constants::ADMIN_ROLE;
use crate::document::Document;
use crate::normalizer::DocumentNormalizer;
use crate::{CoreResult, ValidationError};
use billcheck_uuid::BillingPeriod;
use serde_json::{Map, Value};

/// Builds a bill record for `customer_code` covering `billing_cycle`.
///
/// The record gets a composite `bill_id`, the trimmed `customer_code` and a `billing_cycle`
/// holding the `MM/YYYY` period actually used. A malformed `billing_cycle` falls back to the
/// current month, exactly as [`billcheck_uuid::generate_composite_bill_id`] does, and the stored
/// cycle reflects that fallback. These three fields overwrite any of the same name in `fields`.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] for a blank customer code, or any error
/// [`DocumentNormalizer::prepare_document`] returns for `fields`.
pub fn bill_document(
    normalizer: &DocumentNormalizer,
    customer_code: &str,
    billing_cycle: &str,
    fields: Map<String, Value>,
) -> CoreResult<Document> {
    let customer_code = customer_code.trim();
    if customer_code.is_empty() {
        return Err(ValidationError::missing("customer_code").into());
    }

    let period = BillingPeriod::from_cycle_or_current(billing_cycle);
    let bill_id = format!("{}{}", customer_code, period.suffix());
    if !normalizer.is_valid_bill_id(&bill_id) {
        tracing::warn!(bill_id = %bill_id, "built bill id does not pass validation");
    }

    let doc = Document::from_map(fields)?
        .with("bill_id", bill_id)?
        .with("customer_code", customer_code)?
        .with("billing_cycle", period.cycle())?;

    normalizer.prepare_document(doc)
}

/// Builds an administrator user record.
///
/// The email is trimmed and lowercased. Credentials are not handled here.
///
/// # Errors
///
/// Returns [`ValidationError::Missing`] for a blank email or name.
pub fn admin_user_document(
    normalizer: &DocumentNormalizer,
    email: &str,
    name: &str,
) -> CoreResult<Document> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::missing("email").into());
    }

    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::missing("name").into());
    }

    let doc = Document::new()
        .with("email", email)?
        .with("name", name)?
        .with("role", ADMIN_ROLE)?
        .with("is_active", true)?;

    normalizer.prepare_document(doc)
}
