//! ObjectStore port - where input artifacts live.
//!
//! A session is opened per job with the credentials the orchestrator issued
//! for that job (`StoreConnector::connect`), then used to fetch the archive.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{ArtifactCredentials, EncryptionKey, ErrorKind, ObjectLocation};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("object {0} not found")]
    NotFound(ObjectLocation),

    #[error("access to {location} denied: {message}")]
    AccessDenied {
        location: ObjectLocation,
        message: String,
    },

    #[error("object store session could not be opened: {0}")]
    Session(String),

    #[error("object store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("object store unreachable: {0}")]
    Transport(String),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::Timeout(_) | StorageError::Transport(_) => ErrorKind::Transient,
            StorageError::NotFound(_)
            | StorageError::AccessDenied { .. }
            | StorageError::Session(_) => ErrorKind::Terminal,
        }
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the whole object, decrypting with `encryption` if given.
    async fn get_object(
        &self,
        location: &ObjectLocation,
        encryption: Option<&EncryptionKey>,
    ) -> Result<Vec<u8>, StorageError>;
}

/// Opens an object-store session for one job.
pub trait StoreConnector: Send + Sync {
    fn connect(
        &self,
        credentials: Option<&ArtifactCredentials>,
    ) -> Result<Arc<dyn ObjectStore>, StorageError>;
}
