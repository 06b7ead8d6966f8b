//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the normalizer. Nothing
//! in this crate reads process-wide environment variables while handling a document.

use crate::constants::{DEFAULT_STORAGE_ID_FIELD, MANAGED_FIELDS};
use crate::{CoreError, CoreResult};
use billcheck_uuid::BillYearWindow;

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    storage_id_field: String,
    bill_year_window: BillYearWindow,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            storage_id_field: DEFAULT_STORAGE_ID_FIELD.to_string(),
            bill_year_window: BillYearWindow::default(),
        }
    }
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// The storage identifier field must be non-empty and must not shadow one of the managed
    /// fields (`id`, `created_at`, `updated_at`).
    pub fn new(storage_id_field: String, bill_year_window: BillYearWindow) -> CoreResult<Self> {
        let storage_id_field = storage_id_field.trim().to_string();

        if storage_id_field.is_empty() {
            return Err(CoreError::InvalidConfig(
                "storage_id_field cannot be empty".into(),
            ));
        }

        if MANAGED_FIELDS.contains(&storage_id_field.as_str()) {
            return Err(CoreError::InvalidConfig(format!(
                "storage_id_field cannot be the managed field '{}'",
                storage_id_field
            )));
        }

        Ok(Self {
            storage_id_field,
            bill_year_window,
        })
    }

    /// Build a configuration from optional raw environment values.
    ///
    /// `None`, empty and whitespace-only values fall back to the defaults. A year bound that is
    /// given but not a number in `0..=99` is an error rather than silently ignored.
    pub fn from_env_values(
        storage_id_field: Option<String>,
        bill_year_min: Option<String>,
        bill_year_max: Option<String>,
    ) -> CoreResult<Self> {
        let defaults = Self::default();

        let storage_id_field =
            non_blank(storage_id_field).unwrap_or_else(|| defaults.storage_id_field.clone());

        let min = parse_year_bound("bill_year_min", bill_year_min)?
            .unwrap_or(defaults.bill_year_window.min());
        let max = parse_year_bound("bill_year_max", bill_year_max)?
            .unwrap_or(defaults.bill_year_window.max());
        let window = BillYearWindow::new(min, max)?;

        Self::new(storage_id_field, window)
    }

    /// Name of the identifier field assigned by the document store (for example `_id`).
    pub fn storage_id_field(&self) -> &str {
        &self.storage_id_field
    }

    pub fn bill_year_window(&self) -> BillYearWindow {
        self.bill_year_window
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_year_bound(name: &str, value: Option<String>) -> CoreResult<Option<u8>> {
    non_blank(value)
        .map(|v| {
            v.parse::<u8>()
                .ok()
                .filter(|yy| *yy <= 99)
                .ok_or_else(|| {
                    CoreError::InvalidConfig(format!(
                        "{} must be a two-digit year (0-99), got '{}'",
                        name, v
                    ))
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoreConfig::default();

        assert_eq!(config.storage_id_field(), "_id");
        assert_eq!(config.bill_year_window(), BillYearWindow::default());
    }

    #[test]
    fn test_from_env_values_defaults_when_unset() {
        let config = CoreConfig::from_env_values(None, Some("  ".into()), None).unwrap();

        assert_eq!(config, CoreConfig::default());
    }

    #[test]
    fn test_from_env_values_overrides() {
        let config =
            CoreConfig::from_env_values(Some(" pk ".into()), Some("20".into()), Some("35".into()))
                .unwrap();

        assert_eq!(config.storage_id_field(), "pk");
        assert_eq!(config.bill_year_window().range(), 20..=35);
    }

    #[test]
    fn test_from_env_values_rejects_bad_year() {
        let result = CoreConfig::from_env_values(None, Some("twenty".into()), None);

        match result {
            Err(CoreError::InvalidConfig(msg)) => assert!(msg.contains("bill_year_min")),
            _ => panic!("Expected InvalidConfig error"),
        }
        assert!(CoreConfig::from_env_values(None, None, Some("100".into())).is_err());
    }

    #[test]
    fn test_from_env_values_rejects_inverted_window() {
        let result = CoreConfig::from_env_values(None, Some("29".into()), Some("24".into()));

        assert!(matches!(result, Err(CoreError::Identifier(_))));
    }

    #[test]
    fn test_new_rejects_managed_field() {
        let result = CoreConfig::new("id".into(), BillYearWindow::default());

        assert!(matches!(result, Err(CoreError::InvalidConfig(_))));
        assert!(CoreConfig::new(" ".into(), BillYearWindow::default()).is_err());
    }
}
