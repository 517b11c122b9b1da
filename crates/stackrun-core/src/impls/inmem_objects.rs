//! In-memory object store and a connector that always hands it out.

use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::{ArtifactCredentials, EncryptionKey, ObjectLocation};
use crate::ports::{ObjectStore, StorageError, StoreConnector};

#[derive(Default)]
struct State {
    objects: HashMap<ObjectLocation, Vec<u8>>,

    /// Errors returned, in order, by the next reads.
    failures: VecDeque<StorageError>,
}

#[derive(Clone, Default)]
pub struct InMemoryObjectStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, location: ObjectLocation, bytes: Vec<u8>) {
        self.state.lock().await.objects.insert(location, bytes);
    }

    /// Make the next read fail with `error`.
    pub async fn fail_next(&self, error: StorageError) {
        self.state.lock().await.failures.push_back(error);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get_object(
        &self,
        location: &ObjectLocation,
        _encryption: Option<&EncryptionKey>,
    ) -> Result<Vec<u8>, StorageError> {
        let mut state = self.state.lock().await;
        if let Some(e) = state.failures.pop_front() {
            return Err(e);
        }
        state
            .objects
            .get(location)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(location.clone()))
    }
}

/// Hands out the same store for every job.
pub struct StaticStoreConnector {
    store: Arc<dyn ObjectStore>,
    require_credentials: bool,
}

impl StaticStoreConnector {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            require_credentials: false,
        }
    }

    /// Refuse to connect when the job carries no artifact credentials.
    pub fn requiring_credentials(mut self) -> Self {
        self.require_credentials = true;
        self
    }
}

impl StoreConnector for StaticStoreConnector {
    fn connect(
        &self,
        credentials: Option<&ArtifactCredentials>,
    ) -> Result<Arc<dyn ObjectStore>, StorageError> {
        if self.require_credentials && credentials.is_none() {
            return Err(StorageError::Session(
                "job carries no artifact credentials".to_string(),
            ));
        }
        Ok(self.store.clone())
    }
}

/// Build a deflated zip archive from `(path, contents)` pairs.
pub fn zip_archive<B: AsRef<[u8]>>(entries: &[(&str, B)]) -> Result<Vec<u8>, ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (path, contents) in entries {
        writer.start_file(*path, options)?;
        writer.write_all(contents.as_ref())?;
    }
    Ok(writer.finish()?.into_inner())
}
