//! Typed variable metadata.
//!
//! Container variables carry caller-supplied metadata as netCDF attributes.
//! [`VarMeta`] is the typed replacement for a loose string-to-anything
//! mapping: values are enumerated by [`MetaValue`] (text, integer, float) and
//! keys are validated when an entry is inserted, so a malformed mapping can
//! never reach the writer.

use thiserror::Error;

/// Error type for metadata construction.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Key is not a valid attribute name
    #[error("invalid metadata key '{key}': {reason}")]
    InvalidKey { key: String, reason: &'static str },
}

/// An attribute value: text, integer, or float.
#[derive(Clone, Debug, PartialEq)]
pub enum MetaValue {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::Text(s.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::Text(s)
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Int(i)
    }
}

impl From<i32> for MetaValue {
    fn from(i: i32) -> Self {
        MetaValue::Int(i as i64)
    }
}

impl From<f64> for MetaValue {
    fn from(f: f64) -> Self {
        MetaValue::Float(f)
    }
}

/// Metadata attached to one container variable.
///
/// Entries keep insertion order and are written verbatim as variable
/// attributes.
///
/// # Example
///
/// ```
/// use res_rs::types::VarMeta;
///
/// let mut meta = VarMeta::new();
/// meta.insert("name", "Power output of each wind turbine").unwrap();
/// meta.insert("units", "kWh").unwrap();
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VarMeta {
    entries: Vec<(String, MetaValue)>,
}

impl VarMeta {
    /// Create an empty metadata set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, validating the key.
    ///
    /// A later insert under the same key replaces the earlier value.
    ///
    /// # Errors
    /// [`MetadataError::InvalidKey`] if the key is not a valid attribute name.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetaValue>,
    ) -> Result<(), MetadataError> {
        let key = key.into();
        validate_name(&key).map_err(|reason| MetadataError::InvalidKey {
            key: key.clone(),
            reason,
        })?;
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        Ok(())
    }

    /// Look up an entry by key.
    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Validate a netCDF variable or attribute name.
///
/// Names must be non-empty, start with an ASCII letter or underscore, and
/// continue with ASCII alphanumerics, underscores, or dashes.
pub(crate) fn validate_name(name: &str) -> Result<(), &'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("name is empty"),
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        Some(_) => return Err("name must start with a letter or underscore"),
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        Ok(())
    } else {
        Err("name may only contain letters, digits, underscores, and dashes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut meta = VarMeta::new();
        meta.insert("units", "kWh").unwrap();
        meta.insert("scale", 1.5).unwrap();
        meta.insert("count", 42i64).unwrap();

        assert_eq!(meta.len(), 3);
        assert_eq!(meta.get("units"), Some(&MetaValue::Text("kWh".into())));
        assert_eq!(meta.get("scale"), Some(&MetaValue::Float(1.5)));
        assert_eq!(meta.get("count"), Some(&MetaValue::Int(42)));
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut meta = VarMeta::new();
        meta.insert("units", "kWh").unwrap();
        meta.insert("units", "MWh").unwrap();

        assert_eq!(meta.len(), 1);
        assert_eq!(meta.get("units"), Some(&MetaValue::Text("MWh".into())));
    }

    #[test]
    fn test_rejects_empty_key() {
        let mut meta = VarMeta::new();
        let result = meta.insert("", "value");
        assert!(matches!(result, Err(MetadataError::InvalidKey { .. })));
        assert!(meta.is_empty());
    }

    #[test]
    fn test_rejects_key_with_whitespace() {
        let mut meta = VarMeta::new();
        let result = meta.insert("bad key", "value");
        assert!(matches!(result, Err(MetadataError::InvalidKey { .. })));
        assert!(meta.is_empty());
    }

    #[test]
    fn test_rejects_key_starting_with_digit() {
        let mut meta = VarMeta::new();
        let result = meta.insert("2fast", "value");
        assert!(matches!(result, Err(MetadataError::InvalidKey { .. })));
    }

    #[test]
    fn test_underscore_and_dash_keys_allowed() {
        let mut meta = VarMeta::new();
        meta.insert("_internal", 1i64).unwrap();
        meta.insert("long-name", "x").unwrap();
        assert_eq!(meta.len(), 2);
    }

    #[test]
    fn test_iteration_preserves_order() {
        let mut meta = VarMeta::new();
        meta.insert("b", 1i64).unwrap();
        meta.insert("a", 2i64).unwrap();
        let keys: Vec<&str> = meta.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
