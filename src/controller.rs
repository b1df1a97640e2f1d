//! Query workflow controller.
//!
//! Sequences snippet retrieval and answer generation against the
//! collaborators in [`querywise_core::services`], keeps busy flags and
//! results consistent on success and failure, and publishes a
//! [`Notification`] for every user-visible outcome.
//!
//! # Concurrency
//!
//! ```text
//!   retrieve_snippets ──┐ shared lane   ┌── refresh_document_list
//!   retrieve_snippets ──┤               │   upload_files
//!                       ▼               │   (independent of the lane)
//!   generate_answer ── exclusive lane ──┘
//! ```
//!
//! - Retrievals may overlap each other; each carries a sequence number and
//!   only the most recently *started* one may replace the snippet set.
//! - A generation (including the retrieval it may trigger) holds the lane
//!   exclusively, so snippets never change underneath it.
//! - Only one generation may be in flight; a second is rejected with
//!   [`WorkflowError::Busy`].
//! - Every collaborator call is bounded by the configured timeout.
//!
//! Workflow state lives behind a `std::sync::Mutex` that is never held
//! across an `.await`.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use querywise_core::catalog::ModelChoice;
use querywise_core::models::{
    Answer, FailedUpload, GenerationOptions, Query, Snippet, UploadFile, UploadReport,
};
use querywise_core::services::Collaborators;

use crate::config::Config;
use crate::error::{Operation, WorkflowError};
use crate::notify::{Notification, Notifier};
use crate::progress::{NoProgress, UploadProgressEvent, UploadProgressReporter};
use crate::state::{BusyFlags, WorkflowState};

/// Construction parameters for a [`QueryController`].
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Upper bound on each collaborator call.
    pub timeout: Duration,
    pub model: ModelChoice,
    pub options: GenerationOptions,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            model: ModelChoice::default(),
            options: GenerationOptions::default(),
        }
    }
}

impl From<&Config> for ControllerSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            timeout: cfg.controller.timeout(),
            model: cfg.controller.default_model.clone(),
            options: cfg.generation,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Activity {
    Retrieving,
    Generating,
    Refreshing,
    Uploading,
}

struct Inner {
    state: WorkflowState,
    in_flight: [usize; 4],
    latest_retrieval: u64,
    latest_refresh: u64,
}

impl Inner {
    fn in_flight(&self, activity: Activity) -> usize {
        self.in_flight[activity as usize]
    }

    fn begin(&mut self, activity: Activity) {
        self.in_flight[activity as usize] += 1;
        self.sync_flag(activity);
    }

    fn finish(&mut self, activity: Activity) {
        let count = &mut self.in_flight[activity as usize];
        *count = count.saturating_sub(1);
        self.sync_flag(activity);
    }

    fn sync_flag(&mut self, activity: Activity) {
        let busy = self.in_flight(activity) > 0;
        let flags = &mut self.state.busy;
        match activity {
            Activity::Retrieving => flags.retrieving = busy,
            Activity::Generating => flags.generating = busy,
            Activity::Refreshing => flags.refreshing_documents = busy,
            Activity::Uploading => flags.uploading = busy,
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears its activity's busy flag when dropped, including when the
/// owning future is cancelled mid-call.
struct ActivityGuard<'a> {
    inner: &'a Mutex<Inner>,
    activity: Activity,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        lock(self.inner).finish(self.activity);
    }
}

/// Owns the workflow state for one user session.
///
/// Share it behind an `Arc` to drive operations from several tasks.
pub struct QueryController {
    services: Collaborators,
    inner: Mutex<Inner>,
    lane: RwLock<()>,
    notifier: Notifier,
    timeout: Duration,
}

impl QueryController {
    pub fn new(services: Collaborators, settings: ControllerSettings) -> Self {
        Self {
            services,
            inner: Mutex::new(Inner {
                state: WorkflowState::new(settings.model, settings.options),
                in_flight: [0; 4],
                latest_retrieval: 0,
                latest_refresh: 0,
            }),
            lane: RwLock::new(()),
            notifier: Notifier::default(),
            timeout: settings.timeout,
        }
    }

    pub fn from_config(cfg: &Config, services: Collaborators) -> Self {
        Self::new(services, ControllerSettings::from(cfg))
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Owned copy of the current workflow state.
    pub fn snapshot(&self) -> WorkflowState {
        lock(&self.inner).state.clone()
    }

    pub fn busy(&self) -> BusyFlags {
        lock(&self.inner).state.busy
    }

    pub fn is_retrieving(&self) -> bool {
        self.busy().retrieving
    }

    pub fn is_generating(&self) -> bool {
        self.busy().generating
    }

    pub fn is_refreshing_documents(&self) -> bool {
        self.busy().refreshing_documents
    }

    pub fn is_uploading(&self) -> bool {
        self.busy().uploading
    }

    /// Current snippets, empty if none were ever fetched.
    pub fn snippets(&self) -> Vec<Snippet> {
        lock(&self.inner).state.snippets().to_vec()
    }

    pub fn answer(&self) -> Option<Answer> {
        lock(&self.inner).state.answer.clone()
    }

    pub fn documents(&self) -> Vec<String> {
        lock(&self.inner).state.documents.clone()
    }

    pub fn selected_model(&self) -> ModelChoice {
        lock(&self.inner).state.model.clone()
    }

    pub fn options(&self) -> GenerationOptions {
        lock(&self.inner).state.options
    }

    /// Receive every notification published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ── Selections ──────────────────────────────────────────────────

    pub fn select_model(&self, model: ModelChoice) {
        lock(&self.inner).state.model = model;
    }

    pub fn set_options(&self, options: GenerationOptions) {
        lock(&self.inner).state.options = options;
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Validate `text`, record it as the current query, and retrieve
    /// snippets for it exactly once.
    pub async fn submit_query(&self, text: &str) -> Result<Vec<Snippet>, WorkflowError> {
        let query = self.validate(text, Operation::Retrieve)?;
        lock(&self.inner).state.query = Some(query.clone());
        self.retrieve_snippets(&query).await
    }

    /// Replace the snippet set with the retriever's results for `query`.
    ///
    /// On failure the previous snippet set is kept.
    pub async fn retrieve_snippets(&self, query: &Query) -> Result<Vec<Snippet>, WorkflowError> {
        let _lane = self.lane.read().await;
        self.retrieve_in_lane(query).await
    }

    /// Generate an answer for `text` with `model` and `options`.
    ///
    /// Retrieves snippets first if none were ever fetched. Rejected with
    /// [`WorkflowError::Busy`] while another generation is in flight.
    pub async fn generate_answer(
        &self,
        text: &str,
        model: ModelChoice,
        options: GenerationOptions,
    ) -> Result<Answer, WorkflowError> {
        let query = self.validate(text, Operation::Generate)?;

        let slot = {
            let mut inner = lock(&self.inner);
            if inner.in_flight(Activity::Generating) > 0 {
                drop(inner);
                debug!(model = %model, "generation rejected, another is in flight");
                return self.settle(Err(WorkflowError::Busy), |_: &Answer| None);
            }
            inner.begin(Activity::Generating);
            inner.state.query = Some(query.clone());
            inner.state.model = model.clone();
            inner.state.options = options;
            ActivityGuard {
                inner: &self.inner,
                activity: Activity::Generating,
            }
        };

        let lane = self.lane.write().await;

        let existing = {
            let inner = lock(&self.inner);
            inner
                .state
                .has_fetched_snippets()
                .then(|| inner.state.snippets().to_vec())
        };
        let snippets = match existing {
            Some(snippets) => snippets,
            None => {
                debug!("no snippets fetched yet, retrieving before generation");
                self.retrieve_in_lane(&query).await?
            }
        };

        info!(model = %model, snippets = snippets.len(), "generating answer");
        let outcome = self
            .bounded(
                Operation::Generate,
                self.services
                    .generator
                    .generate(query.as_str(), &snippets, model.id(), &options),
            )
            .await;

        let result = match outcome {
            Ok(Ok(response)) => {
                let answer = Answer::from(response);
                lock(&self.inner).state.answer = Some(answer.clone());
                Ok(answer)
            }
            Ok(Err(source)) => Err(WorkflowError::Generation { source }),
            Err(timeout) => Err(timeout),
        };

        drop(lane);
        drop(slot);
        self.settle(result, |answer| {
            Some(Notification::response_generated(&answer.model))
        })
    }

    /// Generate with the currently selected model and options.
    pub async fn generate_with_selection(&self, text: &str) -> Result<Answer, WorkflowError> {
        let (model, options) = {
            let inner = lock(&self.inner);
            (inner.state.model.clone(), inner.state.options)
        };
        self.generate_answer(text, model, options).await
    }

    /// Replace the cached document list with the store's listing.
    pub async fn refresh_document_list(&self) -> Result<Vec<String>, WorkflowError> {
        let (request_id, guard) = {
            let mut inner = lock(&self.inner);
            inner.begin(Activity::Refreshing);
            inner.latest_refresh += 1;
            (
                inner.latest_refresh,
                ActivityGuard {
                    inner: &self.inner,
                    activity: Activity::Refreshing,
                },
            )
        };
        debug!(request_id, "refreshing document list");

        let outcome = self
            .bounded(
                Operation::ListDocuments,
                self.services.documents.list_documents(),
            )
            .await;

        let result = {
            let mut inner = lock(&self.inner);
            // A newer refresh owns the list, whatever this one returned.
            if request_id != inner.latest_refresh {
                Err(WorkflowError::Superseded {
                    operation: Operation::ListDocuments,
                })
            } else {
                match outcome {
                    Ok(Ok(list)) => {
                        inner.state.documents = list.names.clone();
                        Ok(list.names)
                    }
                    Ok(Err(source)) => Err(WorkflowError::ListDocuments { source }),
                    Err(timeout) => Err(timeout),
                }
            }
        };

        drop(guard);
        self.settle(result, |_| None)
    }

    /// Upload `files` one after another, in order.
    pub async fn upload_files(&self, files: Vec<UploadFile>) -> Result<UploadReport, WorkflowError> {
        self.upload_files_with_progress(files, &NoProgress).await
    }

    /// Like [`upload_files`](Self::upload_files), reporting each step.
    ///
    /// A failing file does not stop the loop and nothing is rolled back.
    /// If any file uploaded, the document list is refreshed afterwards.
    pub async fn upload_files_with_progress(
        &self,
        files: Vec<UploadFile>,
        progress: &dyn UploadProgressReporter,
    ) -> Result<UploadReport, WorkflowError> {
        if files.is_empty() {
            return Ok(UploadReport::default());
        }

        let total = files.len() as u64;
        let mut report = UploadReport::default();
        {
            let _busy = {
                let mut inner = lock(&self.inner);
                inner.begin(Activity::Uploading);
                ActivityGuard {
                    inner: &self.inner,
                    activity: Activity::Uploading,
                }
            };

            for (i, file) in files.iter().enumerate() {
                progress.report(UploadProgressEvent::Uploading {
                    name: file.name.clone(),
                    n: i as u64 + 1,
                    total,
                });
                let outcome = self
                    .bounded(Operation::Upload, self.services.documents.upload(file))
                    .await;
                match outcome {
                    Ok(Ok(receipt)) if receipt.success => {
                        debug!(file = %receipt.filename, "uploaded");
                        lock(&self.inner).state.note_uploaded(&receipt.filename);
                        report.uploaded.push(receipt.filename);
                    }
                    Ok(Ok(_)) => report.failed.push(FailedUpload {
                        name: file.name.clone(),
                        reason: "rejected by document store".to_string(),
                    }),
                    Ok(Err(e)) => report.failed.push(FailedUpload {
                        name: file.name.clone(),
                        reason: format!("{:#}", e),
                    }),
                    Err(timeout) => report.failed.push(FailedUpload {
                        name: file.name.clone(),
                        reason: timeout.to_string(),
                    }),
                }
            }
        }

        progress.report(UploadProgressEvent::Finished {
            uploaded: report.uploaded.len() as u64,
            failed: report.failed.len() as u64,
        });
        info!(
            uploaded = report.uploaded.len(),
            failed = report.failed.len(),
            "upload finished"
        );

        if !report.uploaded.is_empty() {
            // A failed refresh is reported on its own; the upload outcome stands.
            let _ = self.refresh_document_list().await;
        }

        let result = if report.is_complete() {
            Ok(report)
        } else {
            Err(WorkflowError::Upload { report })
        };
        self.settle(result, |r| Some(Notification::upload_successful(r.uploaded.len())))
    }

    // ── Internals ───────────────────────────────────────────────────

    fn validate(&self, text: &str, operation: Operation) -> Result<Query, WorkflowError> {
        match Query::parse(text) {
            Some(query) => Ok(query),
            None => self.settle(Err(WorkflowError::Validation { operation }), |_: &Query| {
                None
            }),
        }
    }

    /// Retrieval body. Caller must hold the lane (shared or exclusive).
    async fn retrieve_in_lane(&self, query: &Query) -> Result<Vec<Snippet>, WorkflowError> {
        let (request_id, guard) = {
            let mut inner = lock(&self.inner);
            inner.begin(Activity::Retrieving);
            inner.latest_retrieval += 1;
            (
                inner.latest_retrieval,
                ActivityGuard {
                    inner: &self.inner,
                    activity: Activity::Retrieving,
                },
            )
        };
        debug!(request_id, query = %query, "retrieving snippets");

        let outcome = self
            .bounded(
                Operation::Retrieve,
                self.services.retriever.retrieve(query.as_str()),
            )
            .await;

        let result = {
            let mut inner = lock(&self.inner);
            if request_id != inner.latest_retrieval {
                Err(WorkflowError::Superseded {
                    operation: Operation::Retrieve,
                })
            } else {
                match outcome {
                    Ok(Ok(response)) => {
                        inner.state.snippets = Some(response.results.clone());
                        Ok(response.results)
                    }
                    Ok(Err(source)) => Err(WorkflowError::Retrieval { source }),
                    Err(timeout) => Err(timeout),
                }
            }
        };

        drop(guard);
        self.settle(result, |snippets| {
            Some(Notification::search_completed(snippets.len()))
        })
    }

    /// Run a collaborator call under the configured timeout.
    async fn bounded<T, F>(
        &self,
        operation: Operation,
        call: F,
    ) -> Result<anyhow::Result<T>, WorkflowError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| WorkflowError::Timeout {
                operation,
                after: self.timeout,
            })
    }

    /// Log and publish the outcome of an operation, then hand it back.
    fn settle<T>(
        &self,
        result: Result<T, WorkflowError>,
        on_success: impl FnOnce(&T) -> Option<Notification>,
    ) -> Result<T, WorkflowError> {
        match &result {
            Ok(value) => {
                if let Some(n) = on_success(value) {
                    self.notifier.publish(n);
                }
            }
            Err(err @ WorkflowError::Superseded { .. }) => {
                debug!(error = %err, "discarding stale response");
            }
            Err(err) => {
                warn!(error = %err, operation = ?err.operation(), "workflow operation failed");
                if let Some(n) = Notification::for_error(err) {
                    self.notifier.publish(n);
                }
            }
        }
        result
    }
}
