//! Sync error types

use thiserror::Error;

use moncompte_connector::error::DirectoryError;

use crate::member::MemberId;

/// Error returned by the sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The adapter never obtained a directory session.
    #[error("not connected to the LDAP directory: {reason}")]
    NotConnected { reason: String },

    /// No entry exists for the member.
    #[error("Member not found in LDAP directory: #{id}")]
    MemberNotFound { id: MemberId },

    /// The membership tag could not be updated.
    #[error("LDAP error while updating member #{id} status: {source}")]
    StatusUpdate {
        id: MemberId,
        #[source]
        source: DirectoryError,
    },

    /// Any other directory failure, carrying the server's message.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl SyncError {
    /// The underlying directory error, if any.
    pub fn directory_error(&self) -> Option<&DirectoryError> {
        match self {
            SyncError::StatusUpdate { source, .. } => Some(source),
            SyncError::Directory(source) => Some(source),
            SyncError::NotConnected { .. } | SyncError::MemberNotFound { .. } => None,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
