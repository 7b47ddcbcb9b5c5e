//! Initial password generation for new entries.

use uuid::Uuid;

/// Generate a random initial password (UUID v4 text).
#[must_use]
pub fn generate_password() -> String {
    Uuid::new_v4().to_string()
}
