//! Ordered broker properties documents.
//!
//! A [`PropertiesDocument`] is an association list: entries keep the order in
//! which they were inserted, and rendering reproduces that order exactly. The
//! rendered text of a document is what ends up in the broker ConfigMap, so two
//! equal documents always render to identical bytes.
//!
//! Parsing accepts the subset of the Java properties format that broker
//! configuration uses in practice: one `key=value` (or `key: value`) pair per
//! line, `#` and `!` comment lines, blank lines. Line continuations and
//! unicode escapes are not supported.

use std::fmt;
use thiserror::Error;

/// Errors produced while parsing properties text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertiesError {
    /// A non-comment line has no separator or an empty key.
    #[error("line {line_number}: expected `key=value`, found `{line}`")]
    Malformed {
        /// 1-based line number.
        line_number: usize,
        /// The offending line, trimmed.
        line: String,
    },
}

/// An ordered list of broker configuration properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesDocument {
    entries: Vec<(String, String)>,
}

impl PropertiesDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse properties text.
    pub fn parse(text: &str) -> Result<Self, PropertiesError> {
        let mut doc = Self::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let malformed = || PropertiesError::Malformed {
                line_number: idx + 1,
                line: line.to_string(),
            };

            let split_at = line.find(['=', ':']).ok_or_else(malformed)?;
            let key = line[..split_at].trim();
            if key.is_empty() {
                return Err(malformed());
            }
            let value = line[split_at + 1..].trim();

            doc.insert(key, value);
        }

        Ok(doc)
    }

    /// Set a property. An existing key keeps its position and gets the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Look up a property value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the document contains `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append every entry of `other` whose key is not already present.
    ///
    /// Returns the keys of `other` that were skipped.
    pub fn merge_missing(&mut self, other: &PropertiesDocument) -> Vec<String> {
        let mut skipped = Vec::new();
        for (key, value) in other.iter() {
            if self.contains_key(key) {
                skipped.push(key.to_string());
            } else {
                self.entries.push((key.to_string(), value.to_string()));
            }
        }
        skipped
    }
}

impl fmt::Display for PropertiesDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for PropertiesDocument
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Self::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}
