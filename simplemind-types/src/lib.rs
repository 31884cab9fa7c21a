//! Shared types for simplemind
//!
//! This crate provides the request-scoped values passed between the
//! resolver, the locator and the rendering pipeline: identifiers, resolved
//! store paths and the ordered metadata map.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Caller-facing content identifier, e.g. `article/rust-notes`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `/`-separated segments, empty ones skipped
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Identifier(id.to_string())
    }
}

/// Returns true if `c` may appear in a store path segment
pub fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Canonical store-relative path.
///
/// Every segment is non-empty and made of `[A-Za-z0-9_-]` only, so a
/// resolved path never contains `.` and cannot climb out of the content
/// root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ResolvedPath {
    segments: Vec<String>,
}

impl ResolvedPath {
    /// Build from already sanitized segments; `None` if any segment breaks
    /// the charset rule or the list is empty.
    pub fn from_segments(segments: Vec<String>) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        let valid = segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(is_segment_char));
        valid.then_some(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The pluralized model segment
    pub fn model(&self) -> &str {
        &self.segments[0]
    }

    /// The last segment, used as the file stem for exact matches
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    pub fn as_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Lookup mode for the content locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Single article: exact match, else recursive search
    Article,
    /// Directory listing of categories
    Section,
    /// Flattened, date-partitioned feed
    Journal,
}

impl LookupMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "article" => Some(LookupMode::Article),
            "section" => Some(LookupMode::Section),
            "journal" => Some(LookupMode::Journal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LookupMode::Article => "article",
            LookupMode::Section => "section",
            LookupMode::Journal => "journal",
        }
    }
}

/// Kind of entry produced by the locator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Well-known metadata keys, with everything else kept verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKey {
    Title,
    Date,
    Author,
    Category,
    Tags,
    Description,
    Other(String),
}

impl MetadataKey {
    pub fn as_str(&self) -> &str {
        match self {
            MetadataKey::Title => "title",
            MetadataKey::Date => "date",
            MetadataKey::Author => "author",
            MetadataKey::Category => "category",
            MetadataKey::Tags => "tags",
            MetadataKey::Description => "description",
            MetadataKey::Other(key) => key,
        }
    }
}

impl From<&str> for MetadataKey {
    fn from(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "title" => MetadataKey::Title,
            "date" => MetadataKey::Date,
            "author" => MetadataKey::Author,
            "category" => MetadataKey::Category,
            "tags" => MetadataKey::Tags,
            "description" => MetadataKey::Description,
            other => MetadataKey::Other(other.to_string()),
        }
    }
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered metadata map.
///
/// Keys are stored lower-cased. Insertion order is kept; inserting an
/// existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<String>) {
        let key = key.as_ref().to_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn field(&self, key: &MetadataKey) -> Option<&str> {
        self.get(key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Merge `other` over `self`; values from `other` win on conflict
    pub fn merge(&mut self, other: Metadata) {
        for (key, value) in other.entries {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in their symbolic form
    pub fn keys(&self) -> impl Iterator<Item = MetadataKey> + '_ {
        self.entries.iter().map(|(k, _)| MetadataKey::from(k.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_overwrites_in_place() {
        let mut md = Metadata::new();
        md.insert("Title", "First");
        md.insert("date", "2024-01-01");
        md.insert("TITLE", "Second");

        let entries: Vec<_> = md.iter().collect();
        assert_eq!(entries, vec![("title", "Second"), ("date", "2024-01-01")]);
    }

    #[test]
    fn test_metadata_merge_prefers_incoming() {
        let mut base: Metadata = [("title", "Base"), ("author", "me")].into_iter().collect();
        let extracted: Metadata = [("title", "Header")].into_iter().collect();
        base.merge(extracted);

        assert_eq!(base.get("title"), Some("Header"));
        assert_eq!(base.get("author"), Some("me"));
    }

    #[test]
    fn test_metadata_keys_are_symbolic() {
        let md: Metadata = [("title", "x"), ("mood", "calm")].into_iter().collect();
        let keys: Vec<_> = md.keys().collect();
        assert_eq!(
            keys,
            vec![MetadataKey::Title, MetadataKey::Other("mood".to_string())]
        );
        assert_eq!(md.field(&MetadataKey::Title), Some("x"));
    }

    #[test]
    fn test_metadata_serializes_in_order() {
        let md: Metadata = [("b", "2"), ("a", "1")].into_iter().collect();
        let json = serde_json::to_string(&md).unwrap();
        assert_eq!(json, r#"{"b":"2","a":"1"}"#);
    }

    #[test]
    fn test_resolved_path_rejects_dots() {
        assert!(ResolvedPath::from_segments(vec!["articles".into(), "..".into()]).is_none());
        assert!(ResolvedPath::from_segments(vec![]).is_none());
        assert!(ResolvedPath::from_segments(vec!["a".into(), "".into()]).is_none());

        let path = ResolvedPath::from_segments(vec!["articles".into(), "rust".into()]).unwrap();
        assert_eq!(path.to_string(), "articles/rust");
        assert_eq!(path.model(), "articles");
        assert_eq!(path.name(), "rust");
    }

    #[test]
    fn test_lookup_mode_from_str() {
        assert_eq!(LookupMode::parse("Journal"), Some(LookupMode::Journal));
        assert_eq!(LookupMode::parse("blog"), None);
        assert_eq!(LookupMode::Section.as_str(), "section");
    }
}
