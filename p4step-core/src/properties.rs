//! Build-property store boundary.
//!
//! The step reads deferred configuration values from the store and writes
//! back exactly one property, the synced revision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Property carrying the build's base directory; the workspace root is
/// `<builddir>/<workdir>`.
pub const BUILDDIR_PROPERTY: &str = "builddir";

/// Property the synced revision is published under.
pub const GOT_REVISION_PROPERTY: &str = "got_revision";

/// Read/write access to build properties.
pub trait PropertyStore {
    fn get(&self, key: &str) -> Option<&str>;

    /// Set `key`, recording which step produced it.
    fn set(&mut self, key: &str, value: String, source: &str);
}

/// A single property value and the step that set it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub value: String,
    pub source: String,
}

/// In-memory property store. Ordered so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, Property>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mainly for tests and CLI `--property` flags.
    pub fn with(mut self, key: &str, value: impl Into<String>, source: &str) -> Self {
        self.set(key, value.into(), source);
        self
    }

    pub fn get_property(&self, key: &str) -> Option<&Property> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Property)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PropertyStore for Properties {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|p| p.value.as_str())
    }

    fn set(&mut self, key: &str, value: String, source: &str) {
        self.entries.insert(
            key.to_string(),
            Property {
                value,
                source: source.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_and_records_source() {
        let mut props = Properties::new().with("got_revision", "99", "Git");
        props.set("got_revision", "100".to_string(), "P4");
        assert_eq!(props.get("got_revision"), Some("100"));
        assert_eq!(props.get_property("got_revision").unwrap().source, "P4");
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn missing_key_is_none() {
        assert!(Properties::new().get("builddir").is_none());
    }
}
