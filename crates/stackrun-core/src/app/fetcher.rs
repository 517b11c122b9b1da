//! TemplateFetcher - pull the template out of the artifact archive.
//!
//! # Flow
//! 1. `ObjectStore::get_object()` for the artifact's bucket/key (bounded)
//! 2. open the bytes as a zip archive
//! 3. read the entry at the relative path
//! 4. parse it (`Template::parse`)

use std::io::{Cursor, Read};
use std::time::Duration;

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::timeout::bounded;
use crate::domain::{ArtifactRef, EncryptionKey, Template};
use crate::error::HandlerError;
use crate::ports::{ObjectStore, StorageError};

/// Largest template entry we decompress. The service's own ceiling for a
/// template is 1 MiB; anything bigger is rejected before it reaches memory.
pub const MAX_TEMPLATE_BYTES: u64 = 1024 * 1024;

pub struct TemplateFetcher {
    timeout: Duration,
}

impl TemplateFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn fetch(
        &self,
        store: &dyn ObjectStore,
        artifact: &ArtifactRef,
        encryption: Option<&EncryptionKey>,
        path: &str,
    ) -> Result<Template, HandlerError> {
        let location = &artifact.location.s3;
        let archive = bounded(
            self.timeout,
            store.get_object(location, encryption),
            StorageError::Timeout,
        )
        .await?;
        debug!(%location, bytes = archive.len(), "fetched artifact archive");

        let body = read_entry(&archive, path)?;
        let template = Template::parse(path, body).map_err(|reason| HandlerError::TemplateParse {
            path: path.to_string(),
            reason,
        })?;
        debug!(path, resources = template.resource_count(), "parsed template");
        Ok(template)
    }
}

/// Read one entry of a zip archive as UTF-8 text.
fn read_entry(archive: &[u8], path: &str) -> Result<String, HandlerError> {
    let mut zip =
        ZipArchive::new(Cursor::new(archive)).map_err(|e| HandlerError::Archive(e.to_string()))?;

    let name = path.trim_start_matches("./").trim_start_matches('/');
    let mut entry = match zip.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(HandlerError::TemplateNotFound(path.to_string()));
        }
        Err(e) => return Err(HandlerError::Archive(e.to_string())),
    };

    let mut raw = Vec::new();
    entry
        .by_ref()
        .take(MAX_TEMPLATE_BYTES + 1)
        .read_to_end(&mut raw)
        .map_err(|e| HandlerError::Archive(e.to_string()))?;
    if raw.len() as u64 > MAX_TEMPLATE_BYTES {
        return Err(HandlerError::TemplateParse {
            path: path.to_string(),
            reason: format!("template is larger than {MAX_TEMPLATE_BYTES} bytes"),
        });
    }

    String::from_utf8(raw).map_err(|e| HandlerError::TemplateParse {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
