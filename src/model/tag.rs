//! Tag entity
//!
//! A typed key/value label attached to a photo, e.g. `location: Paris`.

use std::fmt;

use crate::error::{CatalogError, CatalogResult};

/// A typed label. Equality and hashing are structural (type + value).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    type_name: String,
    value: String,
}

impl Tag {
    /// Create a tag. Fails if the type name is empty.
    pub fn new(type_name: impl Into<String>, value: impl Into<String>) -> CatalogResult<Self> {
        let type_name = type_name.into();
        validate_type_name(&type_name)?;
        Ok(Self {
            type_name,
            value: value.into(),
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Rename the tag type in place
    pub fn set_tag_name(&mut self, type_name: impl Into<String>) -> CatalogResult<()> {
        let type_name = type_name.into();
        validate_type_name(&type_name)?;
        self.type_name = type_name;
        Ok(())
    }

    pub fn set_tag_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.value)
    }
}

pub(crate) fn validate_type_name(type_name: &str) -> CatalogResult<()> {
    if type_name.trim().is_empty() {
        return Err(CatalogError::InvalidTag(
            "tag type name must not be empty".to_string(),
        ));
    }
    Ok(())
}
