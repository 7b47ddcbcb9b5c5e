//! # LDAP Connector
//!
//! LDAP backend for the MonCompte membership sync.
//!
//! Opens one bound LDAPv3 session and exposes it through the
//! [`Directory`](moncompte_connector::Directory) trait: base-scope lookups by
//! DN, entry creation, and attribute modifications.
//!
//! ## Example
//!
//! ```ignore
//! use moncompte_connector_ldap::{LdapConfig, LdapDirectory};
//! use moncompte_connector::prelude::*;
//!
//! let config = LdapConfig::new(
//!     "ldap.example.org",
//!     "ou=membres,dc=example,dc=org",
//!     "cn=admin,dc=example,dc=org",
//! )
//! .with_password("secret");
//!
//! let directory = LdapDirectory::connect(config).await?;
//! directory.test_connection().await?;
//! ```

pub mod config;
pub mod connector;
pub mod dn;

// Re-exports
pub use config::LdapConfig;
pub use connector::LdapDirectory;
pub use dn::{escape_dn_value, member_dn};
