//! Canned, immediately-ready collaborators for tests and offline use.
//!
//! Retrieval always returns the same three snippets regardless of the query.
//! Generation answers from the per-model base text in [`crate::catalog`]
//! composed with the requested options. The document list starts with five
//! names and grows as files are uploaded; upload never fails.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::catalog::ModelChoice;
use crate::compose::compose_answer;
use crate::models::{
    DocumentList, GenerateResponse, GenerationOptions, SearchResponse, Snippet, UploadFile,
    UploadReceipt,
};

use super::{DocumentStore, Generator, Retriever};

/// Snippets returned by every canned retrieval, in display order.
pub fn canned_snippets() -> Vec<Snippet> {
    vec![
        Snippet::new(
            "financial_report_2024.pdf",
            1,
            "The company's revenue increased by 15% in Q1 2024, with the largest growth coming from the SaaS division which saw a 22% increase in subscriptions.",
        ),
        Snippet::new(
            "financial_report_2024.pdf",
            3,
            "Operating expenses were reduced by 8% due to strategic automation and efficiency improvements in the customer service department.",
        ),
        Snippet::new(
            "product_roadmap.pdf",
            2,
            "The new AI-powered features are planned for release in Q3 2024, with early beta testing scheduled for select customers in July.",
        ),
    ]
}

/// Document names the canned store starts with.
pub fn canned_documents() -> Vec<String> {
    [
        "financial_report_2024.pdf",
        "product_roadmap.pdf",
        "customer_survey_results.pdf",
        "competitive_analysis.pdf",
        "technical_specifications.pdf",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Pure generation: base text for `model`, composed with `options`.
pub fn canned_generate(model: &str, options: &GenerationOptions) -> GenerateResponse {
    let choice = ModelChoice::parse(model);
    GenerateResponse {
        response: compose_answer(choice.base_text(), options),
        model: choice.reported_name(),
    }
}

/// In-memory collaborator set backed by canned data.
pub struct CannedServices {
    documents: RwLock<Vec<String>>,
}

impl CannedServices {
    pub fn new() -> Self {
        Self::with_documents(canned_documents())
    }

    pub fn with_documents(documents: Vec<String>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }
}

impl Default for CannedServices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for CannedServices {
    async fn retrieve(&self, _query: &str) -> Result<SearchResponse> {
        Ok(SearchResponse {
            results: canned_snippets(),
        })
    }
}

#[async_trait]
impl Generator for CannedServices {
    async fn generate(
        &self,
        _query: &str,
        _snippets: &[Snippet],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateResponse> {
        Ok(canned_generate(model, options))
    }
}

#[async_trait]
impl DocumentStore for CannedServices {
    async fn list_documents(&self) -> Result<DocumentList> {
        let names = self
            .documents
            .read()
            .map_err(|_| anyhow::anyhow!("document list lock poisoned"))?
            .clone();
        Ok(DocumentList { names })
    }

    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt> {
        let mut docs = self
            .documents
            .write()
            .map_err(|_| anyhow::anyhow!("document list lock poisoned"))?;
        if !docs.iter().any(|name| name == &file.name) {
            docs.push(file.name.clone());
        }
        Ok(UploadReceipt {
            success: true,
            filename: file.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AUTO_SELECTED_LABEL;
    use crate::compose::{DETAILED_PREAMBLE, EXTERNAL_KNOWLEDGE_ADDENDUM, WEB_SEARCH_ADDENDUM};

    #[tokio::test]
    async fn retrieve_ignores_query() {
        let svc = CannedServices::new();
        let a = svc.retrieve("revenue").await.unwrap();
        let b = svc.retrieve("something else").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.results.len(), 3);
        assert_eq!(a.results[0].document, "financial_report_2024.pdf");
        assert_eq!(a.results[2].chunk_index, 2);
    }

    #[tokio::test]
    async fn generate_auto_reports_selected_model() {
        let svc = CannedServices::new();
        let resp = svc
            .generate("q", &canned_snippets(), "Auto", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(resp.model, AUTO_SELECTED_LABEL);
        assert_eq!(resp.response, ModelChoice::Auto.base_text());
    }

    #[tokio::test]
    async fn generate_all_options_for_every_model() {
        let svc = CannedServices::new();
        for model in ModelChoice::KNOWN {
            let resp = svc
                .generate("q", &[], model.id(), &GenerationOptions::all())
                .await
                .unwrap();
            let expected = format!(
                "{}{}{}{}",
                DETAILED_PREAMBLE,
                model.base_text(),
                WEB_SEARCH_ADDENDUM,
                EXTERNAL_KNOWLEDGE_ADDENDUM
            );
            assert_eq!(resp.response, expected);
        }
    }

    #[tokio::test]
    async fn upload_adds_to_listing_once() {
        let svc = CannedServices::new();
        let file = UploadFile::new("notes.pdf", b"%PDF".to_vec());
        let receipt = svc.upload(&file).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.filename, "notes.pdf");
        svc.upload(&file).await.unwrap();

        let list = svc.list_documents().await.unwrap();
        assert_eq!(list.names.len(), 6);
        assert_eq!(list.names.last().map(String::as_str), Some("notes.pdf"));
    }
}
