//! Table name validation
//!
//! The items table is configurable per deployment (`items`, `android`, ...)
//! and gets interpolated into SQL and PostgREST paths, so it must be a plain
//! identifier.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Postgres truncates identifiers beyond 63 bytes
const MAX_TABLE_NAME_LEN: usize = 63;

/// Unquoted identifier: letter or underscore, then letters, digits, underscores
static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex")
});

/// Validated table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Create a new table name, validating identifier format.
    ///
    /// # Example
    /// ```
    /// use itemctl_server::models::TableName;
    ///
    /// assert!(TableName::new("android").is_ok());
    /// assert!(TableName::new("items; DROP TABLE items").is_err());
    /// assert!(TableName::new("1items").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "table name" });
        }

        if s.len() > MAX_TABLE_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "table name",
                max: MAX_TABLE_NAME_LEN,
            });
        }

        if !IDENT_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "table name",
                reason: "must be letters, digits and underscores, not starting with a digit",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self("items".to_owned())
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(TableName::new("items").is_ok());
        assert!(TableName::new("android").is_ok());
        assert!(TableName::new("_staging_items").is_ok());
        assert!(TableName::new("Items2").is_ok());
    }

    #[test]
    fn default_is_items() {
        assert_eq!(TableName::default().as_str(), "items");
    }

    #[test]
    fn rejects_sql_fragments() {
        let err = TableName::new("items; DROP TABLE items").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));

        let err = TableName::new("public.items").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn rejects_digit_start() {
        let err = TableName::new("1items").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn rejects_empty() {
        let err = TableName::new("").unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn max_length() {
        assert!(TableName::new(&"a".repeat(63)).is_ok());

        let err = TableName::new(&"a".repeat(64)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 63, .. }));
    }
}
