//! Attribute values as they are stored in the table.
//!
//! The table only ever holds strings and numbers, so the sum type has two
//! arms. Numbers keep their decimal-string encoding until a reader parses them.

use std::collections::HashMap;

use crate::error::{GraphError, Result};

/// A single type-tagged attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    S(String),
    N(String),
}

impl AttrValue {
    pub fn string(value: impl Into<String>) -> Self {
        AttrValue::S(value.into())
    }

    pub fn number(value: u64) -> Self {
        AttrValue::N(value.to_string())
    }

    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttrValue::S(s) => Some(s),
            AttrValue::N(_) => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttrValue::N(n) => Some(n),
            AttrValue::S(_) => None,
        }
    }
}

/// One stored row: attribute name to value.
pub type Item = HashMap<String, AttrValue>;

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String> {
    item.get(key)
        .and_then(AttrValue::as_s)
        .map(str::to_string)
        .ok_or_else(|| GraphError::Deserialization(format!("Missing or invalid field: {key}")))
}

/// Get a required numeric attribute.
pub fn get_number(item: &Item, key: &str) -> Result<u64> {
    let raw = item
        .get(key)
        .and_then(AttrValue::as_n)
        .ok_or_else(|| GraphError::Deserialization(format!("Missing or invalid field: {key}")))?;
    raw.parse()
        .map_err(|e| GraphError::Deserialization(format!("Invalid number {key}={raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_string() {
        let mut item = Item::new();
        item.insert("username".to_string(), AttrValue::string("alice"));
        assert_eq!(get_string(&item, "username").unwrap(), "alice");
        assert!(get_string(&item, "missing").is_err());
    }

    #[test]
    fn test_get_number_parses_decimal_string() {
        let mut item = Item::new();
        item.insert("likesCount".to_string(), AttrValue::number(42));
        assert_eq!(item["likesCount"], AttrValue::N("42".to_string()));
        assert_eq!(get_number(&item, "likesCount").unwrap(), 42);
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        let mut item = Item::new();
        item.insert("likesCount".to_string(), AttrValue::string("42"));
        item.insert("text".to_string(), AttrValue::number(1));
        assert!(matches!(
            get_number(&item, "likesCount"),
            Err(GraphError::Deserialization(_))
        ));
        assert!(get_string(&item, "text").is_err());
    }

    #[test]
    fn test_garbage_number() {
        let mut item = Item::new();
        item.insert("likesCount".to_string(), AttrValue::N("-3".to_string()));
        assert!(get_number(&item, "likesCount").is_err());
    }
}
