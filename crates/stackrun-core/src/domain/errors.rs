//! Errors - operational classification shared by every layer.
//!
//! Concrete error enums live next to the code that raises them
//! (`ports::ProviderError`, `ports::StorageError`, `crate::error::HandlerError`).
//! Each of them answers `kind()` with one of the values below, and the
//! handler's retry decision only ever looks at that answer.

use serde::{Deserialize, Serialize};

/// ErrorKind classifies an error for retry purposes.
///
/// - `Transient`: throttling, timeouts, transport failures. The job stays
///   pending and the orchestrator re-invokes us.
/// - `Terminal`: retrying cannot help. The job is failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transient,
    Terminal,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        matches!(self, ErrorKind::Transient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_is_transient() {
        assert!(ErrorKind::Transient.is_transient());
        assert!(!ErrorKind::Terminal.is_transient());
    }
}
