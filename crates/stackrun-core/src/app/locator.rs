//! Artifact lookup by name.

use crate::domain::ArtifactRef;
use crate::error::HandlerError;

/// Location type of artifacts kept in the object store.
pub const OBJECT_STORE_LOCATION: &str = "S3";

/// Return the first input artifact named `name`.
///
/// The artifact must live in the object store; a missing location type is
/// taken to mean it does.
pub fn find_artifact<'a>(
    artifacts: &'a [ArtifactRef],
    name: &str,
) -> Result<&'a ArtifactRef, HandlerError> {
    let artifact = artifacts
        .iter()
        .find(|artifact| artifact.name == name)
        .ok_or_else(|| HandlerError::ArtifactNotFound(name.to_string()))?;

    match artifact.location.kind.as_deref() {
        None | Some(OBJECT_STORE_LOCATION) => Ok(artifact),
        Some(other) => Err(HandlerError::UnsupportedArtifactLocation {
            artifact: name.to_string(),
            kind: other.to_string(),
        }),
    }
}
