//! Core data models used throughout QueryWise.
//!
//! These types represent the queries, snippets, answers, and upload records
//! that flow between the workflow controller and its collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User query text known to contain at least one non-whitespace character.
///
/// The text is kept verbatim; trimming is only used for validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Query(String);

impl Query {
    /// Returns `None` when `text` is empty or whitespace-only.
    pub fn parse(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// An excerpt of an uploaded document returned by retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Name of the source document (e.g. `financial_report_2024.pdf`).
    pub document: String,
    /// Ordinal position of the excerpt within its document.
    pub chunk_index: u32,
    /// Excerpt text.
    pub text: String,
}

impl Snippet {
    pub fn new(document: impl Into<String>, chunk_index: u32, text: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            chunk_index,
            text: text.into(),
        }
    }
}

/// Independent toggles that shape a generated answer.
///
/// Each toggle contributes one fixed segment; see [`crate::compose`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    /// Let the model draw on pre-trained knowledge beyond the snippets.
    pub use_external_knowledge: bool,
    /// Append live web-derived context.
    pub use_web_search: bool,
    /// Ask for step-by-step reasoning before the answer.
    pub use_detailed_explanation: bool,
}

impl GenerationOptions {
    /// All three toggles enabled.
    pub fn all() -> Self {
        Self {
            use_external_knowledge: true,
            use_web_search: true,
            use_detailed_explanation: true,
        }
    }
}

/// A generated answer and the model label reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    /// Model label as reported by the generator. May differ from the
    /// requested identifier (e.g. `Auto` reports which model it picked).
    pub model: String,
}

/// Retrieval collaborator response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<Snippet>,
}

/// Generation collaborator response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    pub model: String,
}

impl From<GenerateResponse> for Answer {
    fn from(resp: GenerateResponse) -> Self {
        Self {
            text: resp.response,
            model: resp.model,
        }
    }
}

/// Document-list collaborator response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList {
    pub names: Vec<String>,
}

/// A file handed to the upload collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Upload collaborator response for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub success: bool,
    pub filename: String,
}

/// A file that did not upload, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpload {
    pub name: String,
    pub reason: String,
}

/// Outcome of a multi-file upload, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<String>,
    pub failed: Vec<FailedUpload>,
}

impl UploadReport {
    /// True when no file failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.uploaded.len() + self.failed.len()
    }

    /// Comma-separated names of the files that uploaded.
    pub fn summary(&self) -> String {
        self.uploaded.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_rejects_blank_text() {
        assert!(Query::parse("").is_none());
        assert!(Query::parse("   ").is_none());
        assert!(Query::parse("\t\n ").is_none());
    }

    #[test]
    fn query_keeps_text_verbatim() {
        let q = Query::parse("  revenue growth ").unwrap();
        assert_eq!(q.as_str(), "  revenue growth ");
    }

    #[test]
    fn options_deserialize_with_missing_fields() {
        let opts: GenerationOptions =
            serde_json::from_str(r#"{"use_web_search": true}"#).unwrap();
        assert!(opts.use_web_search);
        assert!(!opts.use_external_knowledge);
        assert!(!opts.use_detailed_explanation);
    }

    #[test]
    fn upload_report_summary() {
        let report = UploadReport {
            uploaded: vec!["a.pdf".into(), "c.pdf".into()],
            failed: vec![FailedUpload {
                name: "b.pdf".into(),
                reason: "disk full".into(),
            }],
        };
        assert!(!report.is_complete());
        assert_eq!(report.total(), 3);
        assert_eq!(report.summary(), "a.pdf, c.pdf");
    }
}
