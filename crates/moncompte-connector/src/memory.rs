//! In-memory directory
//!
//! A `Directory` backed by a map, following LDAP add/modify semantics closely
//! enough for tests and dry runs. Calls are counted and write failures can be
//! injected.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{DirectoryError, DirectoryResult};
use crate::operation::{DirectoryEntry, Modification, NewEntry};
use crate::traits::Directory;

/// LDAP result code: noSuchAttribute.
const RC_NO_SUCH_ATTRIBUTE: u32 = 16;
/// LDAP result code: attributeOrValueExists.
const RC_VALUE_EXISTS: u32 = 20;

type Attributes = Vec<(String, Vec<String>)>;

#[derive(Debug, Clone)]
struct StoredEntry {
    dn: String,
    attributes: Attributes,
}

impl StoredEntry {
    fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    fn values(&self, name: &str) -> Vec<String> {
        self.position(name)
            .map(|i| self.attributes[i].1.clone())
            .unwrap_or_default()
    }

    fn apply(&mut self, change: &Modification) -> DirectoryResult<()> {
        match change {
            Modification::Add(name, values) => {
                let idx = match self.position(name) {
                    Some(i) => i,
                    None => {
                        self.attributes.push((name.clone(), Vec::new()));
                        self.attributes.len() - 1
                    }
                };
                let current = &mut self.attributes[idx].1;
                for value in values {
                    if current.contains(value) {
                        return Err(DirectoryError::operation_failed(
                            RC_VALUE_EXISTS,
                            format!("Type or value exists: {name}"),
                        ));
                    }
                    current.push(value.clone());
                }
            }
            Modification::Delete(name, values) => {
                let idx = self.position(name).ok_or_else(|| {
                    DirectoryError::operation_failed(
                        RC_NO_SUCH_ATTRIBUTE,
                        format!("No such attribute: {name}"),
                    )
                })?;
                if values.is_empty() {
                    self.attributes.remove(idx);
                } else {
                    let current = &mut self.attributes[idx].1;
                    for value in values {
                        let pos = current.iter().position(|v| v == value).ok_or_else(|| {
                            DirectoryError::operation_failed(
                                RC_NO_SUCH_ATTRIBUTE,
                                format!("No such attribute value: {name}={value}"),
                            )
                        })?;
                        current.remove(pos);
                    }
                    if current.is_empty() {
                        self.attributes.remove(idx);
                    }
                }
            }
            Modification::Replace(name, values) => match (self.position(name), values.is_empty()) {
                (Some(i), true) => {
                    self.attributes.remove(i);
                }
                (Some(i), false) => self.attributes[i].1 = values.clone(),
                (None, true) => {}
                (None, false) => self.attributes.push((name.clone(), values.clone())),
            },
        }
        Ok(())
    }
}

/// Counts of calls made against an [`InMemoryDirectory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub lookups: usize,
    pub adds: usize,
    pub modifies: usize,
}

impl CallCounts {
    /// Total number of calls of any kind.
    #[must_use]
    pub fn total(&self) -> usize {
        self.lookups + self.adds + self.modifies
    }

    /// Number of write calls (add + modify).
    #[must_use]
    pub fn writes(&self) -> usize {
        self.adds + self.modifies
    }
}

/// Map-backed directory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    // Key: lowercased DN
    entries: RwLock<HashMap<String, StoredEntry>>,
    lookups: AtomicUsize,
    adds: AtomicUsize,
    modifies: AtomicUsize,
    write_failure: RwLock<Option<(u32, String)>>,
    modify_failure_for: RwLock<Option<String>>,
}

impl InMemoryDirectory {
    /// Create a new empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without counting it as a call.
    pub fn insert(&self, entry: NewEntry) {
        let (dn, attributes) = entry.into_parts();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dn.to_lowercase(), StoredEntry { dn, attributes });
    }

    /// Check whether an entry exists.
    pub fn contains(&self, dn: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&dn.to_lowercase())
    }

    /// Get all values of an attribute on an entry (empty if absent).
    pub fn values(&self, dn: &str, attribute: &str) -> Vec<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&dn.to_lowercase())
            .map(|e| e.values(attribute))
            .unwrap_or_default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls made so far.
    pub fn calls(&self) -> CallCounts {
        CallCounts {
            lookups: self.lookups.load(Ordering::SeqCst),
            adds: self.adds.load(Ordering::SeqCst),
            modifies: self.modifies.load(Ordering::SeqCst),
        }
    }

    /// Make every add and modify fail with the given result code.
    pub fn fail_writes_with(&self, code: u32, message: impl Into<String>) {
        *self
            .write_failure
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some((code, message.into()));
    }

    /// Make modifications touching `attribute` fail with result code 50.
    pub fn fail_modify_of(&self, attribute: impl Into<String>) {
        *self
            .modify_failure_for
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(attribute.into());
    }

    fn injected_write_failure(&self) -> Option<DirectoryError> {
        self.write_failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|(code, message)| DirectoryError::operation_failed(*code, message.clone()))
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    fn display_name(&self) -> &str {
        "in-memory"
    }

    async fn test_connection(&self) -> DirectoryResult<()> {
        Ok(())
    }

    async fn lookup(
        &self,
        dn: &str,
        attributes: &[&str],
    ) -> DirectoryResult<Option<DirectoryEntry>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = entries.get(&dn.to_lowercase()) else {
            return Ok(None);
        };

        let wants_all = attributes.is_empty() || attributes.contains(&"*");
        let raw: HashMap<String, Vec<String>> = stored
            .attributes
            .iter()
            .filter(|(name, _)| wants_all || attributes.iter().any(|a| a.eq_ignore_ascii_case(name)))
            .cloned()
            .collect();

        Ok(Some(DirectoryEntry::from_attributes(stored.dn.clone(), &raw)))
    }

    async fn add(&self, entry: NewEntry) -> DirectoryResult<()> {
        self.adds.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.injected_write_failure() {
            return Err(err);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let key = entry.dn().to_lowercase();
        if entries.contains_key(&key) {
            return Err(DirectoryError::ObjectAlreadyExists {
                dn: entry.dn().to_string(),
            });
        }

        debug!(dn = %entry.dn(), "Adding in-memory entry");
        let (dn, attributes) = entry.into_parts();
        entries.insert(key, StoredEntry { dn, attributes });
        Ok(())
    }

    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> DirectoryResult<()> {
        self.modifies.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.injected_write_failure() {
            return Err(err);
        }

        let failing = self
            .modify_failure_for
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(attribute) = failing {
            if changes
                .iter()
                .any(|c| c.attribute().eq_ignore_ascii_case(&attribute))
            {
                return Err(DirectoryError::operation_failed(
                    50,
                    "Insufficient access",
                ));
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let stored = entries
            .get_mut(&dn.to_lowercase())
            .ok_or_else(|| DirectoryError::ObjectNotFound { dn: dn.to_string() })?;

        // Apply on a copy so a failing change leaves the entry untouched.
        let mut updated = stored.clone();
        for change in &changes {
            updated.apply(change)?;
        }
        *stored = updated;
        Ok(())
    }
}
