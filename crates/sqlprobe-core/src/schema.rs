//! Schema model produced by catalog introspection

use serde::{Deserialize, Serialize};
use std::fmt;

/// A table name as reported by the backend.
///
/// Opaque: no quoting, case folding, or qualification is applied. Ordering
/// of a table listing is whatever the backend enumerated, which is not
/// guaranteed to be alphabetical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Create a table name from backend output
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw name string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TableName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A column in a table schema
///
/// The type is the backend-native type text exactly as the backend reported
/// it (`INT`, `STRING`, `DECIMAL(10,2)`, ...). It is never parsed or
/// validated here; type interpretation belongs to the query generator that
/// consumes the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Backend-native type name, unparsed
    pub type_name: String,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_name_roundtrip() {
        let table = TableName::new("test_table");
        assert_eq!(table.as_str(), "test_table");
        assert_eq!(table.to_string(), "test_table");
        assert_eq!(TableName::from("test_table"), table);
    }

    #[test]
    fn test_column_equality_is_name_and_type() {
        let a = Column::new("id", "INT");
        assert_eq!(a, Column::new("id", "INT"));
        assert_ne!(a, Column::new("id", "BIGINT"));
        assert_ne!(a, Column::new("id2", "INT"));
    }

    #[test]
    fn test_column_display() {
        let col = Column::new("value", "DOUBLE");
        assert_eq!(col.to_string(), "value (DOUBLE)");
    }
}
