//! Directory traits
//!
//! The seam between the sync logic and a concrete directory backend.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DirectoryResult;
use crate::operation::{DirectoryEntry, Modification, NewEntry};

/// A directory the sync can read from and write to.
///
/// Implementations hold one authenticated session. Calls are issued
/// sequentially by the sync adapter.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Get the display name for this directory instance.
    fn display_name(&self) -> &str;

    /// Verify that the directory is reachable and the session is usable.
    async fn test_connection(&self) -> DirectoryResult<()>;

    /// Read a single entry by DN.
    ///
    /// Returns `Ok(None)` when no entry exists at `dn`.
    async fn lookup(&self, dn: &str, attributes: &[&str])
        -> DirectoryResult<Option<DirectoryEntry>>;

    /// Add a new entry.
    async fn add(&self, entry: NewEntry) -> DirectoryResult<()>;

    /// Apply modifications to an existing entry, atomically.
    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> DirectoryResult<()>;

    /// Release the session.
    async fn dispose(&self) -> DirectoryResult<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: Directory + ?Sized> Directory for Box<T> {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    async fn test_connection(&self) -> DirectoryResult<()> {
        (**self).test_connection().await
    }

    async fn lookup(
        &self,
        dn: &str,
        attributes: &[&str],
    ) -> DirectoryResult<Option<DirectoryEntry>> {
        (**self).lookup(dn, attributes).await
    }

    async fn add(&self, entry: NewEntry) -> DirectoryResult<()> {
        (**self).add(entry).await
    }

    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> DirectoryResult<()> {
        (**self).modify(dn, changes).await
    }

    async fn dispose(&self) -> DirectoryResult<()> {
        (**self).dispose().await
    }
}

#[async_trait]
impl<T: Directory + ?Sized> Directory for Arc<T> {
    fn display_name(&self) -> &str {
        (**self).display_name()
    }

    async fn test_connection(&self) -> DirectoryResult<()> {
        (**self).test_connection().await
    }

    async fn lookup(
        &self,
        dn: &str,
        attributes: &[&str],
    ) -> DirectoryResult<Option<DirectoryEntry>> {
        (**self).lookup(dn, attributes).await
    }

    async fn add(&self, entry: NewEntry) -> DirectoryResult<()> {
        (**self).add(entry).await
    }

    async fn modify(&self, dn: &str, changes: Vec<Modification>) -> DirectoryResult<()> {
        (**self).modify(dn, changes).await
    }

    async fn dispose(&self) -> DirectoryResult<()> {
        (**self).dispose().await
    }
}
