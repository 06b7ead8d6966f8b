//! Field names and environment variable names used throughout the core crate.

/// Business identifier field.
pub const ID_FIELD: &str = "id";

/// Creation timestamp field, set once.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Last-write timestamp field, refreshed on every write.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Fields owned by the normalizer rather than by callers.
pub const MANAGED_FIELDS: &[&str] = &[ID_FIELD, CREATED_AT_FIELD, UPDATED_AT_FIELD];

/// Default name of the identifier field assigned by the document store.
pub const DEFAULT_STORAGE_ID_FIELD: &str = "_id";

/// Environment variable overriding the storage identifier field name.
pub const STORAGE_ID_FIELD_ENV: &str = "BILLCHECK_STORAGE_ID_FIELD";

/// Environment variable overriding the lowest accepted two-digit bill year.
pub const BILL_YEAR_MIN_ENV: &str = "BILLCHECK_BILL_YEAR_MIN";

/// Environment variable overriding the highest accepted two-digit bill year.
pub const BILL_YEAR_MAX_ENV: &str = "BILLCHECK_BILL_YEAR_MAX";

/// Role assigned to seeded administrator accounts.
pub const ADMIN_ROLE: &str = "admin";
