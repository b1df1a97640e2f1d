//! Collaborator abstraction for QueryWise.
//!
//! The workflow controller never talks to a retrieval engine, a model, or a
//! document store directly. It depends on the three traits below, so the
//! transport (HTTP, RPC, in-process) is the implementor's choice.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.
//!
//! # Operations
//!
//! | Trait | Method | Purpose |
//! |-------|--------|---------|
//! | [`Retriever`] | [`retrieve`](Retriever::retrieve) | Find snippets relevant to a query |
//! | [`Generator`] | [`generate`](Generator::generate) | Produce an answer from snippets |
//! | [`DocumentStore`] | [`list_documents`](DocumentStore::list_documents) | List uploaded document names |
//! | [`DocumentStore`] | [`upload`](DocumentStore::upload) | Upload one file |

pub mod canned;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{
    DocumentList, GenerateResponse, GenerationOptions, SearchResponse, Snippet, UploadFile,
    UploadReceipt,
};

/// Snippet retrieval backend.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return snippets for `query`. Result order is significant and must
    /// be preserved by callers.
    async fn retrieve(&self, query: &str) -> Result<SearchResponse>;
}

/// Answer generation backend.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an answer for `query` grounded on `snippets`.
    ///
    /// `model` is a free-form identifier. Unknown identifiers are expected
    /// to fall back to a default response rather than fail.
    async fn generate(
        &self,
        query: &str,
        snippets: &[Snippet],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateResponse>;
}

/// Document store holding uploaded files.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List the names of all stored documents.
    async fn list_documents(&self) -> Result<DocumentList>;

    /// Upload a single file. Fails per file.
    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt>;
}

/// The set of collaborators a controller is wired to.
#[derive(Clone)]
pub struct Collaborators {
    pub retriever: Arc<dyn Retriever>,
    pub generator: Arc<dyn Generator>,
    pub documents: Arc<dyn DocumentStore>,
}

impl Collaborators {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn Generator>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            retriever,
            generator,
            documents,
        }
    }

    /// Wire all three roles to one implementation.
    pub fn from_shared<T>(services: Arc<T>) -> Self
    where
        T: Retriever + Generator + DocumentStore + 'static,
    {
        Self {
            retriever: services.clone(),
            generator: services.clone(),
            documents: services,
        }
    }
}
