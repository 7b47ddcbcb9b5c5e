//! Directory operation types
//!
//! Typed lookup results, entries to add, and attribute modifications.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute names used by member entries.
pub mod attr {
    pub const OBJECT_CLASS: &str = "objectClass";
    pub const CN: &str = "cn";
    pub const UID: &str = "uid";
    pub const DISPLAY_NAME: &str = "displayName";
    pub const DESCRIPTION: &str = "description";
    pub const MAIL: &str = "mail";
    pub const SN: &str = "sn";
    pub const GIVEN_NAME: &str = "givenName";
    pub const HOME_DIRECTORY: &str = "homeDirectory";
    pub const UID_NUMBER: &str = "uidNumber";
    pub const GID_NUMBER: &str = "gidNumber";
    pub const USER_PASSWORD: &str = "userPassword";
}

/// An entry as returned by a lookup.
///
/// Multi-valued attributes are kept as lists, single-valued ones as options.
/// Attributes that were not requested, or that the entry lacks, are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub dn: String,
    pub cn: Option<String>,
    /// Tag list; may contain `membre`.
    pub description: Vec<String>,
    pub mail: Option<String>,
    pub sn: Option<String>,
    pub given_name: Option<String>,
}

impl DirectoryEntry {
    /// Build a typed entry from raw attribute values.
    ///
    /// Attribute names are matched case-insensitively (RFC 4512).
    pub fn from_attributes(dn: impl Into<String>, attrs: &HashMap<String, Vec<String>>) -> Self {
        let values = |name: &str| -> Vec<String> {
            attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        let first = |name: &str| values(name).into_iter().next();

        Self {
            dn: dn.into(),
            cn: first(attr::CN),
            description: values(attr::DESCRIPTION),
            mail: first(attr::MAIL),
            sn: first(attr::SN),
            given_name: first(attr::GIVEN_NAME),
        }
    }

    /// Check whether the `description` tag list contains `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.description.iter().any(|t| t == tag)
    }

    /// Check whether the entry carries a `mail` attribute.
    #[must_use]
    pub fn has_mail(&self) -> bool {
        self.mail.is_some()
    }
}

/// A new entry to be added to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    dn: String,
    attributes: Vec<(String, Vec<String>)>,
}

impl NewEntry {
    /// Start a new entry at `dn`.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: Vec::new(),
        }
    }

    /// Add a single-valued attribute using builder pattern.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), vec![value.into()]));
        self
    }

    /// Add a multi-valued attribute using builder pattern.
    pub fn with_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Get the DN.
    pub fn dn(&self) -> &str {
        &self.dn
    }

    /// Get all attributes in insertion order.
    pub fn attributes(&self) -> &[(String, Vec<String>)] {
        &self.attributes
    }

    /// Get the values of one attribute (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }

    /// Get the first value of one attribute.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Split into DN and attributes.
    pub fn into_parts(self) -> (String, Vec<(String, Vec<String>)>) {
        (self.dn, self.attributes)
    }
}

/// A change to apply to an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modification {
    /// Add values to an attribute (LDAP modify-add).
    Add(String, Vec<String>),
    /// Remove values from an attribute (LDAP modify-delete).
    Delete(String, Vec<String>),
    /// Replace all values of an attribute (LDAP modify-replace).
    Replace(String, Vec<String>),
}

impl Modification {
    /// Add a single value.
    pub fn add(name: impl Into<String>, value: impl Into<String>) -> Self {
        Modification::Add(name.into(), vec![value.into()])
    }

    /// Delete a single value.
    pub fn delete(name: impl Into<String>, value: impl Into<String>) -> Self {
        Modification::Delete(name.into(), vec![value.into()])
    }

    /// Replace with a single value.
    pub fn replace(name: impl Into<String>, value: impl Into<String>) -> Self {
        Modification::Replace(name.into(), vec![value.into()])
    }

    /// The attribute this modification targets.
    pub fn attribute(&self) -> &str {
        match self {
            Modification::Add(name, _)
            | Modification::Delete(name, _)
            | Modification::Replace(name, _) => name,
        }
    }

    /// The values carried by this modification.
    pub fn values(&self) -> &[String] {
        match self {
            Modification::Add(_, values)
            | Modification::Delete(_, values)
            | Modification::Replace(_, values) => values,
        }
    }
}
