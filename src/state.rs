//! Workflow state owned by the controller.
//!
//! Consumers never hold a reference into the live state; they read owned
//! snapshots via [`QueryController::snapshot`](crate::controller::QueryController::snapshot).

use serde::Serialize;

use querywise_core::catalog::ModelChoice;
use querywise_core::models::{Answer, GenerationOptions, Query, Snippet};

/// Independent in-flight indicators, one per kind of collaborator call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BusyFlags {
    pub retrieving: bool,
    pub generating: bool,
    pub refreshing_documents: bool,
    pub uploading: bool,
}

impl BusyFlags {
    pub fn any(&self) -> bool {
        self.retrieving || self.generating || self.refreshing_documents || self.uploading
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkflowState {
    /// Most recently submitted query.
    pub query: Option<Query>,
    /// `None` until a retrieval has succeeded in this session.
    pub snippets: Option<Vec<Snippet>>,
    pub answer: Option<Answer>,
    pub model: ModelChoice,
    pub options: GenerationOptions,
    /// Cached document names; replaced on refresh.
    pub documents: Vec<String>,
    pub busy: BusyFlags,
}

impl WorkflowState {
    pub fn new(model: ModelChoice, options: GenerationOptions) -> Self {
        Self {
            model,
            options,
            ..Self::default()
        }
    }

    /// Current snippets, empty if none were ever fetched.
    pub fn snippets(&self) -> &[Snippet] {
        self.snippets.as_deref().unwrap_or_default()
    }

    pub fn has_fetched_snippets(&self) -> bool {
        self.snippets.is_some()
    }

    /// Record a successful upload ahead of the next refresh.
    pub(crate) fn note_uploaded(&mut self, name: &str) {
        if !self.documents.iter().any(|d| d == name) {
            self.documents.push(name.to_string());
        }
    }
}
