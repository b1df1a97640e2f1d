//! Error kinds surfaced by the workflow controller.
//!
//! Collaborators report failures as [`anyhow::Error`]; the controller wraps
//! them in a [`WorkflowError`] so callers can tell a bad query from a failed
//! search, a timeout, or a rejected concurrent request.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use querywise_core::models::UploadReport;

/// Collaborator call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Retrieve,
    Generate,
    ListDocuments,
    Upload,
}

impl Operation {
    /// Capitalized label for notification titles.
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Retrieve => "Search",
            Operation::Generate => "Generation",
            Operation::ListDocuments => "Document list",
            Operation::Upload => "Upload",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Retrieve => "retrieval",
            Operation::Generate => "generation",
            Operation::ListDocuments => "document list",
            Operation::Upload => "upload",
        })
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The query was empty or whitespace-only. No collaborator was called.
    #[error("query must not be empty")]
    Validation { operation: Operation },

    #[error("retrieval failed")]
    Retrieval {
        #[source]
        source: anyhow::Error,
    },

    #[error("generation failed")]
    Generation {
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to fetch document list")]
    ListDocuments {
        #[source]
        source: anyhow::Error,
    },

    /// At least one file failed. Files that uploaded stay uploaded.
    #[error("{} of {} file(s) failed to upload", .report.failed.len(), .report.total())]
    Upload { report: UploadReport },

    /// A generation is already in flight.
    #[error("a response is already being generated")]
    Busy,

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: Operation,
        after: Duration,
    },

    /// A newer request of the same kind was issued; this response was dropped.
    #[error("{operation} response discarded: a newer request was issued")]
    Superseded { operation: Operation },
}

impl WorkflowError {
    /// The operation this error came from.
    pub fn operation(&self) -> Operation {
        match self {
            WorkflowError::Retrieval { .. } => Operation::Retrieve,
            WorkflowError::Generation { .. } | WorkflowError::Busy => Operation::Generate,
            WorkflowError::ListDocuments { .. } => Operation::ListDocuments,
            WorkflowError::Upload { .. } => Operation::Upload,
            WorkflowError::Validation { operation }
            | WorkflowError::Timeout { operation, .. }
            | WorkflowError::Superseded { operation } => *operation,
        }
    }
}
