//! # Directory Connector
//!
//! Core abstractions for writing MonCompte member records into a directory.
//!
//! - [`Directory`] - the trait every backend implements
//! - [`DirectoryEntry`] - typed lookup result
//! - [`NewEntry`], [`Modification`] - add and modify requests
//! - [`DirectoryError`] - error taxonomy with transient/permanent classification
//! - [`InMemoryDirectory`] - map-backed backend for tests and dry runs
//!
//! ## Example
//!
//! ```
//! use moncompte_connector::prelude::*;
//!
//! # async fn run() -> DirectoryResult<()> {
//! let directory = InMemoryDirectory::new();
//! directory
//!     .add(NewEntry::new("cn=1,dc=example,dc=org").with("cn", "1"))
//!     .await?;
//! let entry = directory.lookup("cn=1,dc=example,dc=org", &["cn"]).await?;
//! assert!(entry.is_some());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod operation;
pub mod traits;

pub use error::{DirectoryError, DirectoryResult};
pub use memory::{CallCounts, InMemoryDirectory};
pub use operation::{attr, DirectoryEntry, Modification, NewEntry};
pub use traits::Directory;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::memory::InMemoryDirectory;
    pub use crate::operation::{DirectoryEntry, Modification, NewEntry};
    pub use crate::traits::Directory;
}

// Re-export async_trait for directory implementors
pub use async_trait::async_trait;
