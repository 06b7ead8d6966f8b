//! Preparing documents for storage and cleaning them for API responses.
//!
//! [`DocumentNormalizer`] holds only its startup configuration, so one instance can be cloned
//! into every handler or shared behind an `Arc` without locking.
//!
//! ## Write path
//! [`DocumentNormalizer::prepare_document`] guarantees a valid `id`, sets `created_at` once,
//! refreshes `updated_at` and drops the storage identifier.
//!
//! ## Read path
//! [`DocumentNormalizer::clean_response`] drops the storage identifier and re-validates `id`.
//!
//! ### Migration shim
//! Records written before business identifiers existed carry only the storage identifier. When
//! such a record is cleaned it is given a freshly minted `id` and a warning is logged. The new
//! `id` is not written back here, so unless the caller persists it the record will get a
//! different `id` on every read. Treat this as a one-off transitional behaviour, not a stable
//! identifier.

use crate::config::CoreConfig;
use crate::constants::ID_FIELD;
use crate::document::Document;
use crate::validation;
use crate::{CoreResult, ValidationError};
use billcheck_uuid::{generate_id, is_valid_id, BillId};
use chrono::Utc;

/// Stateless document normalizer.
#[derive(Clone, Debug, Default)]
pub struct DocumentNormalizer {
    config: CoreConfig,
}

impl DocumentNormalizer {
    pub fn new(config: CoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Prepares a document for its next write.
    ///
    /// - `id` is generated when absent or empty and validated otherwise.
    /// - `created_at` is set to now only if absent, so re-preparing a stored document keeps it.
    /// - `updated_at` is always set to now. On first preparation it equals `created_at`.
    /// - The storage identifier field is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] if a caller-supplied `id` is not a valid
    /// identifier.
    pub fn prepare_document(&self, mut doc: Document) -> CoreResult<Document> {
        doc.clear_blank_id();
        if let Some(id) = doc.id() {
            if !is_valid_id(id) {
                return Err(ValidationError::malformed(ID_FIELD, id).into());
            }
        } else {
            doc.set_id(generate_id());
        }

        doc.stamp(Utc::now());
        doc.remove(self.config.storage_id_field());

        Ok(doc)
    }

    /// Cleans a document read from storage before it is returned to a caller.
    ///
    /// An empty document is returned unchanged. A document with neither `id` nor storage
    /// identifier keeps having no `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] if the stored `id` is not a valid identifier.
    pub fn clean_response(&self, mut doc: Document) -> CoreResult<Document> {
        if doc.is_empty() {
            return Ok(doc);
        }

        let storage_id = doc.remove(self.config.storage_id_field());
        doc.clear_blank_id();

        if let Some(id) = doc.id() {
            if !is_valid_id(id) {
                return Err(ValidationError::malformed(ID_FIELD, id).into());
            }
        } else if let Some(storage_id) = storage_id {
            let id = generate_id();
            tracing::warn!(
                storage_field = self.config.storage_id_field(),
                storage_id = %storage_id,
                id = %id,
                "document has no id, assigned a new one"
            );
            doc.set_id(id);
        }

        Ok(doc)
    }

    /// Cleans every document in `docs`, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first document [`clean_response`](Self::clean_response) rejects.
    pub fn clean_list_response(&self, docs: Vec<Document>) -> CoreResult<Vec<Document>> {
        docs.into_iter()
            .map(|doc| self.clean_response(doc))
            .collect()
    }

    /// See [`validation::validate_foreign_key`].
    pub fn validate_foreign_key<'a>(
        &self,
        value: &'a str,
        field_name: &str,
    ) -> Result<&'a str, ValidationError> {
        validation::validate_foreign_key(value, field_name)
    }

    /// Validates a composite bill identifier against the configured year window.
    pub fn validate_bill_id(
        &self,
        value: &str,
        field_name: &str,
    ) -> Result<BillId, ValidationError> {
        validation::validate_bill_id(value, field_name, self.config.bill_year_window())
    }

    /// Like [`is_valid_composite_bill_id`](billcheck_uuid::is_valid_composite_bill_id), but
    /// using the configured year window.
    pub fn is_valid_bill_id(&self, candidate: &str) -> bool {
        self.config.bill_year_window().accepts(candidate)
    }
}
