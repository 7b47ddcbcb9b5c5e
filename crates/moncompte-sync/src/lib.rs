//! # MonCompte Directory Sync
//!
//! One-way reconciliation of MonCompte members into the LDAP directory.
//!
//! [`DirectorySyncAdapter`] exposes three operations:
//!
//! - [`create_member_if_absent`](DirectorySyncAdapter::create_member_if_absent)
//!   creates the member's entry with the `admissible` tag.
//! - [`reconcile_membership_status`](DirectorySyncAdapter::reconcile_membership_status)
//!   adds or removes the `membre` tag according to the subscription expiry.
//! - [`upsert_profile`](DirectorySyncAdapter::upsert_profile) refreshes
//!   `mail`, `sn` and `givenName`, creating the entry if needed.
//!
//! When the configuration sets `"disabled": true` every operation returns
//! [`SyncOutcome::Disabled`] without touching the directory.
//!
//! ## Example
//!
//! ```ignore
//! use moncompte_sync::{DirectorySyncAdapter, Member, MemberId, SyncConfig};
//!
//! let config = SyncConfig::load("config/local_ldap.json")?;
//! let adapter = DirectorySyncAdapter::open(&config).await;
//!
//! let member = Member::new(MemberId::new(1234)?, "Dupont", "Jean");
//! adapter.create_member_if_absent(&member).await?;
//! adapter.reconcile_membership_status(member.id, 1_893_456_000).await?;
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod member;
pub mod password;

pub use adapter::{
    ConnectionStatus, DirectorySyncAdapter, MemberSyncReport, SyncOutcome, ADMISSIBLE_TAG,
    MEMBERSHIP_TAG,
};
pub use config::{ConfigError, SyncConfig, DEFAULT_CONFIG_PATH};
pub use error::{SyncError, SyncResult};
pub use member::{InvalidMemberId, Member, MemberId, ProfileData};
