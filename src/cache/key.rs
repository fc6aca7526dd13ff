//! Cache keys.
//!
//! A key is an ordered tuple whose first part names the resource. Later parts
//! narrow it down (an id, a parent id, a parameter map). Invalidation works on
//! prefixes, so `['banners']` covers every `['banners', {...}]` entry.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Text(String),
    Id(i64),
    /// Sorted so equal parameter sets always produce equal keys.
    Params(BTreeMap<String, String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<KeyPart>);

impl QueryKey {
    /// A key naming just the resource; also the prefix for all its entries.
    #[must_use]
    pub fn new(resource: &str) -> Self {
        Self(vec![KeyPart::Text(resource.to_owned())])
    }

    #[must_use]
    pub fn id(mut self, id: i64) -> Self {
        self.0.push(KeyPart::Id(id));
        self
    }

    #[must_use]
    pub fn params(mut self, params: BTreeMap<String, String>) -> Self {
        self.0.push(KeyPart::Params(params));
        self
    }

    /// Resource name (the first part).
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        match self.0.first() {
            Some(KeyPart::Text(name)) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Id(id) => write!(f, "{id}"),
            Self::Params(params) => {
                f.write_str("{")?;
                for (i, (k, v)) in params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
#[path = "key_test.rs"]
mod tests;
