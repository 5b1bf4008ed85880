//! Per-user registry of recognized tag types and their arity constraints.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::tag::validate_type_name;
use crate::error::{CatalogError, CatalogResult};

/// How many tags of one type a single photo may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arity {
    /// At most this many values (1 = single-valued)
    Limited(u32),
    /// Multi-valued, no limit
    Unbounded,
}

impl Arity {
    pub const SINGLE: Arity = Arity::Limited(1);

    /// Whether a photo already carrying `count` tags of a type may take one more
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Arity::Limited(limit) => count < *limit as usize,
            Arity::Unbounded => true,
        }
    }

    fn is_valid(&self) -> bool {
        !matches!(self, Arity::Limited(0))
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Limited(limit) => write!(f, "{}", limit),
            Arity::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Mapping from tag-type name to its arity.
///
/// Types that are not registered are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTypes {
    types: BTreeMap<String, Arity>,
}

impl Default for TagTypes {
    /// `location` is single-valued, `person` is multi-valued
    fn default() -> Self {
        let mut types = BTreeMap::new();
        types.insert("location".to_string(), Arity::SINGLE);
        types.insert("person".to_string(), Arity::Unbounded);
        Self { types }
    }
}

impl TagTypes {
    /// An empty registry, without the default types
    pub fn empty() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register or overwrite the arity of a tag type
    pub fn insert(&mut self, type_name: &str, arity: Arity) -> CatalogResult<()> {
        validate_type_name(type_name)?;
        if !arity.is_valid() {
            return Err(CatalogError::InvalidArity(type_name.to_string()));
        }
        self.types.insert(type_name.to_string(), arity);
        Ok(())
    }

    pub fn arity(&self, type_name: &str) -> Option<Arity> {
        self.types.get(type_name).copied()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Arity)> {
        self.types.iter().map(|(name, arity)| (name.as_str(), *arity))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Validate a registry decoded from storage
    pub(crate) fn validate(&self) -> CatalogResult<()> {
        for (name, arity) in &self.types {
            validate_type_name(name)?;
            if !arity.is_valid() {
                return Err(CatalogError::InvalidArity(name.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let types = TagTypes::default();
        assert_eq!(types.arity("location"), Some(Arity::SINGLE));
        assert_eq!(types.arity("person"), Some(Arity::Unbounded));
        assert_eq!(types.arity("event"), None);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut types = TagTypes::default();
        types.insert("location", Arity::Limited(2)).unwrap();
        assert_eq!(types.arity("location"), Some(Arity::Limited(2)));
        assert_eq!(types.len(), 2);
    }

    #[test]
    fn test_zero_arity_rejected() {
        let mut types = TagTypes::empty();
        let err = types.insert("event", Arity::Limited(0)).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidArity(name) if name == "event"));
        assert!(types.is_empty());
    }

    #[test]
    fn test_admits() {
        assert!(Arity::SINGLE.admits(0));
        assert!(!Arity::SINGLE.admits(1));
        assert!(Arity::Unbounded.admits(10_000));
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&TagTypes::default()).unwrap();
        assert_eq!(json, r#"{"location":{"limited":1},"person":"unbounded"}"#);
        let restored: TagTypes = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, TagTypes::default());
    }
}
