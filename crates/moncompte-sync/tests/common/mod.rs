//! Shared helpers for moncompte-sync integration tests.

use std::sync::{Arc, Once};

use moncompte_connector::memory::InMemoryDirectory;
use moncompte_connector::operation::NewEntry;
use moncompte_sync::{DirectorySyncAdapter, MemberId, SyncConfig};

static INIT: Once = Once::new();

pub const BASE_DN: &str = "ou=membres,dc=example,dc=org";
pub const DEFAULT_EMAIL: &str = "noreply@example.org";

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

pub fn config() -> SyncConfig {
    SyncConfig::new(
        "ldap.example.org",
        "cn=admin,dc=example,dc=org",
        BASE_DN,
        DEFAULT_EMAIL,
    )
}

pub fn id(n: u64) -> MemberId {
    MemberId::new(n).unwrap()
}

pub fn dn(n: u64) -> String {
    format!("cn={n},{BASE_DN}")
}

/// An adapter over a shared in-memory directory the test can inspect.
pub fn adapter() -> (DirectorySyncAdapter<Arc<InMemoryDirectory>>, Arc<InMemoryDirectory>) {
    init_test_logging();
    let directory = Arc::new(InMemoryDirectory::new());
    let adapter = DirectorySyncAdapter::connected(&config(), Arc::clone(&directory));
    (adapter, directory)
}

/// Seed an existing member entry.
pub fn seed_member(directory: &InMemoryDirectory, n: u64, tags: &[&str], mail: Option<&str>) {
    let mut entry = NewEntry::new(dn(n))
        .with("cn", n.to_string())
        .with("uid", n.to_string())
        .with("sn", "Ancien")
        .with("givenName", "Nom")
        .with_values("description", tags.iter().copied());
    if let Some(mail) = mail {
        entry = entry.with("mail", mail);
    }
    directory.insert(entry);
}
