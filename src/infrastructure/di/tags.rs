//! Tag registry: named, ordered groups of service names

use std::collections::BTreeMap;

/// Mapping of tag name to the services carrying that tag.
///
/// Services keep the order they were tagged in. Tagging the same service
/// twice records it twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagRegistry {
    tags: BTreeMap<String, Vec<String>>,
}

impl TagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `service` to `tag`, creating the tag on first use.
    pub fn push(&mut self, tag: impl Into<String>, service: impl Into<String>) {
        self.tags.entry(tag.into()).or_default().push(service.into());
    }

    /// Services tagged with `tag`, in tagging order. Empty for unknown tags.
    pub fn services(&self, tag: &str) -> &[String] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tags.iter().map(|(tag, services)| (tag.as_str(), services.as_slice()))
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
