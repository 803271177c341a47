//! Feature schema registry
//!
//! The ordered list of feature names the trained classifier expects.
//! Loaded once at start and never mutated afterwards, so it can be shared
//! freely between request workers.

use crate::{Error, Result};
use ahash::AHashMap;
use std::path::Path;

/// Ordered, unique feature names with a name -> column lookup
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    names: Vec<String>,
    index: AHashMap<String, usize>,
}

impl PartialEq for FeatureSchema {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl FeatureSchema {
    /// Build a schema from feature names, rejecting empty or duplicated lists
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::SchemaLoad("feature schema is empty".to_string()));
        }

        let mut index = AHashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(Error::SchemaLoad(format!(
                    "feature at column {} has an empty name",
                    position
                )));
            }
            if index.insert(name.clone(), position).is_some() {
                return Err(Error::SchemaLoad(format!("duplicate feature name '{}'", name)));
            }
        }

        Ok(Self { names, index })
    }

    /// Load a schema from a JSON array of feature names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read(path).map_err(|e| {
            Error::SchemaLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let names: Vec<String> = serde_json::from_slice(&raw).map_err(|e| {
            Error::SchemaLoad(format!("malformed feature list in {}: {}", path.display(), e))
        })?;
        Self::from_names(names)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column position of a feature
    #[inline]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Feature names in column order
    #[inline]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
