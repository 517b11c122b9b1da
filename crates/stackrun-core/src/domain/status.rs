//! Stack status model.
//!
//! The provisioning service reports stack status as an enumerated string.
//! We parse it into a closed enum once, at the boundary, so the reconciliation
//! logic matches on variants instead of comparing strings. A string we do not
//! know is an explicit error (`UnmappedStatus`) rather than a silent fallthrough.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Every documented stack status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StackStatus {
    CreateInProgress,
    CreateFailed,
    CreateComplete,
    RollbackInProgress,
    RollbackFailed,
    RollbackComplete,
    DeleteInProgress,
    DeleteFailed,
    DeleteComplete,
    UpdateInProgress,
    UpdateCompleteCleanupInProgress,
    UpdateComplete,
    UpdateFailed,
    UpdateRollbackInProgress,
    UpdateRollbackFailed,
    UpdateRollbackCompleteCleanupInProgress,
    UpdateRollbackComplete,
    ReviewInProgress,
    ImportInProgress,
    ImportComplete,
    ImportRollbackInProgress,
    ImportRollbackFailed,
    ImportRollbackComplete,
}

/// Status families, which is all the poller cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFamily {
    /// An operation is still running.
    InProgress,

    /// A create/update/import finished successfully.
    Complete,

    /// The operation failed or was rolled back.
    Failed,

    /// The stack is being (or has been) deleted.
    Deleted,
}

/// Error returned when the provisioning service reports a status we have no variant for.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unmapped stack status: {0}")]
pub struct UnmappedStatus(pub String);

impl StackStatus {
    pub const ALL: [StackStatus; 23] = [
        StackStatus::CreateInProgress,
        StackStatus::CreateFailed,
        StackStatus::CreateComplete,
        StackStatus::RollbackInProgress,
        StackStatus::RollbackFailed,
        StackStatus::RollbackComplete,
        StackStatus::DeleteInProgress,
        StackStatus::DeleteFailed,
        StackStatus::DeleteComplete,
        StackStatus::UpdateInProgress,
        StackStatus::UpdateCompleteCleanupInProgress,
        StackStatus::UpdateComplete,
        StackStatus::UpdateFailed,
        StackStatus::UpdateRollbackInProgress,
        StackStatus::UpdateRollbackFailed,
        StackStatus::UpdateRollbackCompleteCleanupInProgress,
        StackStatus::UpdateRollbackComplete,
        StackStatus::ReviewInProgress,
        StackStatus::ImportInProgress,
        StackStatus::ImportComplete,
        StackStatus::ImportRollbackInProgress,
        StackStatus::ImportRollbackFailed,
        StackStatus::ImportRollbackComplete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StackStatus::CreateInProgress => "CREATE_IN_PROGRESS",
            StackStatus::CreateFailed => "CREATE_FAILED",
            StackStatus::CreateComplete => "CREATE_COMPLETE",
            StackStatus::RollbackInProgress => "ROLLBACK_IN_PROGRESS",
            StackStatus::RollbackFailed => "ROLLBACK_FAILED",
            StackStatus::RollbackComplete => "ROLLBACK_COMPLETE",
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteFailed => "DELETE_FAILED",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::UpdateInProgress => "UPDATE_IN_PROGRESS",
            StackStatus::UpdateCompleteCleanupInProgress => "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS",
            StackStatus::UpdateComplete => "UPDATE_COMPLETE",
            StackStatus::UpdateFailed => "UPDATE_FAILED",
            StackStatus::UpdateRollbackInProgress => "UPDATE_ROLLBACK_IN_PROGRESS",
            StackStatus::UpdateRollbackFailed => "UPDATE_ROLLBACK_FAILED",
            StackStatus::UpdateRollbackCompleteCleanupInProgress => {
                "UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS"
            }
            StackStatus::UpdateRollbackComplete => "UPDATE_ROLLBACK_COMPLETE",
            StackStatus::ReviewInProgress => "REVIEW_IN_PROGRESS",
            StackStatus::ImportInProgress => "IMPORT_IN_PROGRESS",
            StackStatus::ImportComplete => "IMPORT_COMPLETE",
            StackStatus::ImportRollbackInProgress => "IMPORT_ROLLBACK_IN_PROGRESS",
            StackStatus::ImportRollbackFailed => "IMPORT_ROLLBACK_FAILED",
            StackStatus::ImportRollbackComplete => "IMPORT_ROLLBACK_COMPLETE",
        }
    }

    pub fn family(self) -> StatusFamily {
        use StackStatus::*;
        match self {
            CreateInProgress
            | UpdateInProgress
            | UpdateCompleteCleanupInProgress
            | RollbackInProgress
            | UpdateRollbackInProgress
            | UpdateRollbackCompleteCleanupInProgress
            | ReviewInProgress
            | ImportInProgress
            | ImportRollbackInProgress => StatusFamily::InProgress,

            CreateComplete | UpdateComplete | ImportComplete => StatusFamily::Complete,

            CreateFailed
            | RollbackFailed
            | RollbackComplete
            | UpdateFailed
            | UpdateRollbackFailed
            | UpdateRollbackComplete
            | ImportRollbackFailed
            | ImportRollbackComplete => StatusFamily::Failed,

            DeleteInProgress | DeleteFailed | DeleteComplete => StatusFamily::Deleted,
        }
    }

    /// Whether a new update may be issued against a stack in this status.
    ///
    /// A stack that rolled back its *creation* (`ROLLBACK_COMPLETE`) cannot be
    /// updated; it has to be deleted first.
    pub fn is_updatable(self) -> bool {
        matches!(
            self,
            StackStatus::CreateComplete
                | StackStatus::UpdateComplete
                | StackStatus::UpdateRollbackComplete
                | StackStatus::ImportComplete
                | StackStatus::ImportRollbackComplete
        )
    }

    pub fn is_in_progress(self) -> bool {
        self.family() == StatusFamily::InProgress
    }
}

impl FromStr for StackStatus {
    type Err = UnmappedStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StackStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnmappedStatus(s.to_string()))
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn every_status_roundtrips_through_its_wire_name() {
        for status in StackStatus::ALL {
            assert_eq!(status.as_str().parse::<StackStatus>(), Ok(status));
        }
    }

    #[test]
    fn serde_uses_wire_names() {
        let s = serde_json::to_string(&StackStatus::UpdateRollbackCompleteCleanupInProgress).unwrap();
        assert_eq!(s, "\"UPDATE_ROLLBACK_COMPLETE_CLEANUP_IN_PROGRESS\"");
    }

    #[test]
    fn unknown_status_is_an_explicit_error() {
        let err = "UPDATE_SOMEHOW_PENDING".parse::<StackStatus>().unwrap_err();
        assert_eq!(err, UnmappedStatus("UPDATE_SOMEHOW_PENDING".to_string()));
        assert!(err.to_string().contains("UPDATE_SOMEHOW_PENDING"));
    }

    #[rstest]
    #[case::create_in_progress(StackStatus::CreateInProgress, StatusFamily::InProgress)]
    #[case::update_in_progress(StackStatus::UpdateInProgress, StatusFamily::InProgress)]
    #[case::update_cleanup(StackStatus::UpdateCompleteCleanupInProgress, StatusFamily::InProgress)]
    #[case::rollback_in_progress(StackStatus::RollbackInProgress, StatusFamily::InProgress)]
    #[case::update_rollback_in_progress(StackStatus::UpdateRollbackInProgress, StatusFamily::InProgress)]
    #[case::review(StackStatus::ReviewInProgress, StatusFamily::InProgress)]
    #[case::create_complete(StackStatus::CreateComplete, StatusFamily::Complete)]
    #[case::update_complete(StackStatus::UpdateComplete, StatusFamily::Complete)]
    #[case::import_complete(StackStatus::ImportComplete, StatusFamily::Complete)]
    #[case::create_failed(StackStatus::CreateFailed, StatusFamily::Failed)]
    #[case::update_failed(StackStatus::UpdateFailed, StatusFamily::Failed)]
    #[case::rollback_complete(StackStatus::RollbackComplete, StatusFamily::Failed)]
    #[case::update_rollback_complete(StackStatus::UpdateRollbackComplete, StatusFamily::Failed)]
    #[case::rollback_failed(StackStatus::RollbackFailed, StatusFamily::Failed)]
    #[case::delete_in_progress(StackStatus::DeleteInProgress, StatusFamily::Deleted)]
    #[case::delete_complete(StackStatus::DeleteComplete, StatusFamily::Deleted)]
    fn status_families(#[case] status: StackStatus, #[case] family: StatusFamily) {
        assert_eq!(status.family(), family);
    }

    #[rstest]
    #[case::create_complete(StackStatus::CreateComplete, true)]
    #[case::update_complete(StackStatus::UpdateComplete, true)]
    #[case::update_rolled_back(StackStatus::UpdateRollbackComplete, true)]
    #[case::create_rolled_back(StackStatus::RollbackComplete, false)]
    #[case::in_progress(StackStatus::UpdateInProgress, false)]
    #[case::failed(StackStatus::UpdateRollbackFailed, false)]
    fn updatable_statuses(#[case] status: StackStatus, #[case] updatable: bool) {
        assert_eq!(status.is_updatable(), updatable);
    }

    #[test]
    fn every_in_progress_wire_name_is_in_progress_family() {
        for status in StackStatus::ALL {
            if status.as_str().ends_with("_IN_PROGRESS") && !status.as_str().starts_with("DELETE") {
                assert!(status.is_in_progress(), "{status} should be in progress");
            }
        }
    }
}
