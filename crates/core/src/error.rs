/// A caller-supplied value failed a shape check.
///
/// Every variant names the offending field so the message can be surfaced to clients as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: String },
    #[error("{field} is not a valid identifier: '{value}'")]
    Malformed { field: String, value: String },
    #[error("{field} is not a valid bill id: '{value}'")]
    InvalidBillId { field: String, value: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Malformed {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field }
            | Self::Malformed { field, .. }
            | Self::InvalidBillId { field, .. } => field,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("document must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("identifier error: {0}")]
    Identifier(#[from] billcheck_uuid::UuidError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
