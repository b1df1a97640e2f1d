//! User-visible notifications.
//!
//! Every controller outcome worth telling the user about (a finished search,
//! a failed upload, a rejected request) is published as a [`Notification`]
//! on a broadcast channel. Presentation layers subscribe and render them;
//! the `qw` CLI prints them to stderr.

use serde::Serialize;
use std::fmt;
use tokio::sync::broadcast;

use crate::error::{Operation, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: Variant::Destructive,
        }
    }

    pub fn search_completed(found: usize) -> Self {
        Self::info("Search completed", format!("Found {} relevant chunks", found))
    }

    pub fn response_generated(model: &str) -> Self {
        Self::info("Response generated", format!("Using {}", model))
    }

    pub fn upload_successful(count: usize) -> Self {
        Self::info(
            "Upload successful",
            format!("{} file(s) uploaded & processed", count),
        )
    }

    /// Notification for a failed operation. `None` for errors that are not
    /// shown to the user (superseded responses).
    pub fn for_error(err: &WorkflowError) -> Option<Self> {
        let n = match err {
            WorkflowError::Validation {
                operation: Operation::Generate,
            } => Self::destructive("Query required", "Please enter a query first"),
            WorkflowError::Validation { .. } => Self::destructive(
                "Query required",
                "Please enter a query to search documents",
            ),
            WorkflowError::Retrieval { .. } => Self::destructive(
                "Search failed",
                "An error occurred while searching documents",
            ),
            WorkflowError::Generation { .. } => Self::destructive(
                "Generation failed",
                "An error occurred while generating the response",
            ),
            WorkflowError::ListDocuments { .. } => {
                Self::destructive("Error", "Failed to fetch document list")
            }
            WorkflowError::Upload { .. } => {
                Self::destructive("Upload failed", "One or more files failed to upload")
            }
            WorkflowError::Busy => Self::destructive(
                "Generation in progress",
                "Wait for the current response to finish",
            ),
            WorkflowError::Timeout { operation, after } => Self::destructive(
                format!("{} timed out", operation.title()),
                format!("No response after {} s", after.as_secs()),
            ),
            WorkflowError::Superseded { .. } => return None,
        };
        Some(n)
    }

    pub fn is_error(&self) -> bool {
        self.variant == Variant::Destructive
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.title, self.description)
    }
}

/// Fan-out of notifications to any number of subscribers.
///
/// Publishing with no subscribers is not an error; slow subscribers may
/// observe `Lagged` once `capacity` notifications are buffered.
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn publish(&self, notification: Notification) {
        tracing::debug!(
            title = %notification.title,
            description = %notification.description,
            "notification"
        );
        let _ = self.tx.send(notification);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn every_user_facing_error_has_a_notification() {
        let errors = [
            WorkflowError::Validation {
                operation: Operation::Retrieve,
            },
            WorkflowError::Retrieval {
                source: anyhow::anyhow!("x"),
            },
            WorkflowError::Generation {
                source: anyhow::anyhow!("x"),
            },
            WorkflowError::ListDocuments {
                source: anyhow::anyhow!("x"),
            },
            WorkflowError::Upload {
                report: Default::default(),
            },
            WorkflowError::Busy,
            WorkflowError::Timeout {
                operation: Operation::Retrieve,
                after: Duration::from_secs(3),
            },
        ];
        for err in &errors {
            let n = Notification::for_error(err).expect("notification");
            assert!(n.is_error(), "{} should be destructive", err);
        }
    }

    #[test]
    fn validation_text_depends_on_operation() {
        let search = Notification::for_error(&WorkflowError::Validation {
            operation: Operation::Retrieve,
        })
        .unwrap();
        let generate = Notification::for_error(&WorkflowError::Validation {
            operation: Operation::Generate,
        })
        .unwrap();
        assert_eq!(search.title, "Query required");
        assert_eq!(search.description, "Please enter a query to search documents");
        assert_eq!(generate.description, "Please enter a query first");
    }

    #[test]
    fn superseded_is_silent() {
        let err = WorkflowError::Superseded {
            operation: Operation::Retrieve,
        };
        assert!(Notification::for_error(&err).is_none());
    }

    #[test]
    fn timeout_notification_text() {
        let n = Notification::for_error(&WorkflowError::Timeout {
            operation: Operation::Retrieve,
            after: Duration::from_secs(3),
        })
        .unwrap();
        assert_eq!(n.to_string(), "[Search timed out] No response after 3 s");
    }

    #[test]
    fn success_texts() {
        assert_eq!(
            Notification::search_completed(3).description,
            "Found 3 relevant chunks"
        );
        assert_eq!(
            Notification::response_generated("Claude").description,
            "Using Claude"
        );
        assert_eq!(
            Notification::upload_successful(2).description,
            "2 file(s) uploaded & processed"
        );
    }

    #[test]
    fn publish_reaches_subscribers() {
        let notifier = Notifier::default();
        let mut rx = notifier.subscribe();
        notifier.publish(Notification::search_completed(1));
        assert_eq!(rx.try_recv().unwrap(), Notification::search_completed(1));
    }

    #[test]
    fn publish_without_subscribers_is_ok() {
        let notifier = Notifier::new(1);
        notifier.publish(Notification::search_completed(1));
    }
}
