//! Generic entity identifiers.
//!
//! Every stored entity carries exactly one generic identifier, assigned once at creation. This
//! module mints new identifiers and validates externally supplied ones.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Byte offsets of the hyphens in the 8-4-4-4-12 grouping.
const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Length of a hyphenated identifier.
const HYPHENATED_LEN: usize = 36;

/// Returns a newly minted identifier in canonical (lowercase, hyphenated) form.
///
/// Backed by a version 4 UUID, so the value carries 122 bits of randomness from the operating
/// system's secure random source.
pub fn generate_id() -> String {
    Identifier::new().to_string()
}

/// Returns true if `candidate` has the 8-4-4-4-12 hex grouping.
///
/// The check is purely syntactic and case-insensitive. It never panics, and an empty string is
/// simply invalid.
pub fn is_valid_id(candidate: &str) -> bool {
    Identifier::is_canonical(candidate)
}

/// A validated generic identifier.
///
/// Once constructed, the contained UUID is known to have come from either [`Identifier::new`] or
/// a string that passed [`Identifier::is_canonical`]. Display always produces the lowercase
/// hyphenated form.
///
/// # Construction
/// - [`Identifier::new`] mints a new identifier for a record being created.
/// - [`Identifier::parse`] validates an identifier supplied by a caller or read from storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Identifier(Uuid);

impl Default for Identifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Identifier {
    /// Mints a new random identifier.
    pub fn new() -> Self {
        let id = Self(Uuid::new_v4());
        tracing::debug!(id = %id, "minted identifier");
        id
    }

    /// Validates and parses a hyphenated identifier.
    ///
    /// Upper and mixed case input is accepted; the stored value is always displayed lowercase.
    /// The simple (unhyphenated), braced and URN forms that `uuid` would otherwise accept are
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` does not have the 8-4-4-4-12 hex grouping.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if !Self::is_canonical(input) {
            return Err(UuidError::InvalidInput(format!(
                "identifier must be 36 hex characters grouped 8-4-4-4-12, got: '{}'",
                input
            )));
        }

        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("'{}': {}", input, e)))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` has the 8-4-4-4-12 hex grouping (either case).
    pub fn is_canonical(input: &str) -> bool {
        input.len() == HYPHENATED_LEN
            && input.bytes().enumerate().all(|(i, b)| {
                if HYPHEN_POSITIONS.contains(&i) {
                    b == b'-'
                } else {
                    b.is_ascii_hexdigit()
                }
            })
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for Identifier {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Identifier::parse(s)
    }
}

impl From<Identifier> for String {
    fn from(value: Identifier) -> Self {
        value.to_string()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Identifier::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const SAMPLE: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn test_generate_id_is_valid() {
        let id = generate_id();

        assert_eq!(id.len(), 36);
        assert!(is_valid_id(&id));
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn test_generate_id_unique_over_sample() {
        let ids: HashSet<String> = (0..10_000).map(|_| generate_id()).collect();

        assert_eq!(ids.len(), 10_000);
    }

    #[test]
    fn test_is_valid_id_accepts_uppercase() {
        assert!(is_valid_id(SAMPLE));
        assert!(is_valid_id("550E8400-E29B-41D4-A716-446655440000"));
        assert!(is_valid_id("550e8400-E29b-41d4-A716-446655440000"));
    }

    #[test]
    fn test_is_valid_id_rejects_malformed() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-a-uuid"));

        // Simple form
        assert!(!is_valid_id("550e8400e29b41d4a716446655440000"));

        // Braced form
        assert!(!is_valid_id("{550e8400-e29b-41d4-a716-446655440000}"));

        // Misplaced hyphen
        assert!(!is_valid_id("550e840-0e29b-41d4-a716-446655440000"));

        // Non-hex character
        assert!(!is_valid_id("550e8400-e29b-41d4-a716-44665544000g"));

        // Too long
        assert!(!is_valid_id("550e8400-e29b-41d4-a716-4466554400000"));

        // Multi-byte characters must not be mistaken for hex
        assert!(!is_valid_id("550e8400-e29b-41d4-a716-4466554400é"));
    }

    #[test]
    fn test_parse_normalises_case() {
        let parsed = Identifier::parse("550E8400-E29B-41D4-A716-446655440000").unwrap();

        assert_eq!(parsed.to_string(), SAMPLE);
    }

    #[test]
    fn test_parse_rejects_simple_form() {
        let result = Identifier::parse("550e8400e29b41d4a716446655440000");

        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("8-4-4-4-12"));
            }
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_from_str_matches_parse() {
        let parsed: Identifier = SAMPLE.parse().unwrap();

        assert_eq!(parsed, Identifier::parse(SAMPLE).unwrap());
        assert_eq!(parsed.uuid().hyphenated().to_string(), SAMPLE);
    }

    #[test]
    fn test_new_identifiers_differ() {
        assert_ne!(Identifier::new(), Identifier::new());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_uses_hyphenated_string() {
        let id = Identifier::parse(SAMPLE).unwrap();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, format!("\"{}\"", SAMPLE));

        let bad: Result<Identifier, _> = serde_json::from_str("\"not-a-uuid\"");
        assert!(bad.is_err());
    }
}
