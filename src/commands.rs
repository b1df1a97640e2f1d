//! CLI command implementations.
//!
//! Each `run_*` function drives one controller operation, prints results to
//! stdout, and prints the notifications it produced to stderr. Errors are
//! returned so the binary exits non-zero.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

use querywise_core::catalog::ModelChoice;
use querywise_core::models::{Answer, GenerationOptions, Snippet, UploadFile, UploadReport};
use querywise_core::services::Collaborators;

use crate::config::Config;
use crate::controller::QueryController;
use crate::error::WorkflowError;
use crate::mock::MockServices;
use crate::notify::Notification;
use crate::progress::ProgressMode;

/// A controller wired to the mock collaborators, plus a notification feed.
pub struct Session {
    pub controller: QueryController,
    notifications: broadcast::Receiver<Notification>,
}

impl Session {
    pub fn new(controller: QueryController) -> Self {
        let notifications = controller.subscribe();
        Self {
            controller,
            notifications,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        let services = Arc::new(MockServices::from_config(&cfg.mock));
        Self::new(QueryController::from_config(
            cfg,
            Collaborators::from_shared(services),
        ))
    }

    /// Print and clear pending notifications.
    pub fn flush_notifications(&mut self) {
        for n in self.drain_notifications() {
            eprintln!("{}", n);
        }
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        let mut out = Vec::new();
        loop {
            match self.notifications.try_recv() {
                Ok(n) => out.push(n),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notifications dropped");
                }
                Err(_) => break,
            }
        }
        out
    }
}

/// Options override for `qw ask`. A flag that is set turns the toggle on;
/// an unset flag keeps the configured default.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionFlags {
    pub knowledge: bool,
    pub web: bool,
    pub detailed: bool,
}

impl OptionFlags {
    pub fn apply(&self, base: GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            use_external_knowledge: base.use_external_knowledge || self.knowledge,
            use_web_search: base.use_web_search || self.web,
            use_detailed_explanation: base.use_detailed_explanation || self.detailed,
        }
    }
}

pub async fn run_ask(
    session: &mut Session,
    query: &str,
    model: Option<ModelChoice>,
    flags: OptionFlags,
    show_snippets: bool,
) -> Result<()> {
    let controller = &session.controller;
    let model = model.unwrap_or_else(|| controller.selected_model());
    let options = flags.apply(controller.options());

    let result = controller.generate_answer(query, model, options).await;
    session.flush_notifications();
    let answer = result?;

    if show_snippets {
        print_snippets(&session.controller.snippets());
        println!();
    }
    print_answer(&answer);
    Ok(())
}

pub async fn run_search(session: &mut Session, query: &str) -> Result<()> {
    let result = session.controller.submit_query(query).await;
    session.flush_notifications();
    print_snippets(&result?);
    Ok(())
}

pub async fn run_docs(session: &mut Session) -> Result<()> {
    let result = session.controller.refresh_document_list().await;
    session.flush_notifications();
    let names = result?;

    if names.is_empty() {
        println!("No documents.");
        return Ok(());
    }
    for name in &names {
        println!("{}", name);
    }
    Ok(())
}

pub async fn run_upload(
    session: &mut Session,
    paths: &[PathBuf],
    progress: ProgressMode,
) -> Result<()> {
    let files = paths
        .iter()
        .map(|p| read_upload(p))
        .collect::<Result<Vec<_>>>()?;

    let reporter = progress.reporter();
    let result = session
        .controller
        .upload_files_with_progress(files, reporter.as_ref())
        .await;
    session.flush_notifications();

    match result {
        Ok(report) => {
            print_upload_report(&report);
            print_document_count(&session.controller.documents());
            Ok(())
        }
        Err(WorkflowError::Upload { report }) => {
            print_upload_report(&report);
            print_document_count(&session.controller.documents());
            Err(WorkflowError::Upload { report }.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub fn run_models() -> Result<()> {
    for model in ModelChoice::KNOWN {
        println!("{:<14} {:<14} {}", model.id(), model.display_name(), model.description());
    }
    Ok(())
}

fn read_upload(path: &Path) -> Result<UploadFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read upload file: {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("Upload path has no file name: {}", path.display()))?;
    Ok(UploadFile { name, bytes })
}

fn print_snippets(snippets: &[Snippet]) {
    if snippets.is_empty() {
        println!("No search results.");
        return;
    }
    for (i, snippet) in snippets.iter().enumerate() {
        println!("{}. {}  chunk {}", i + 1, snippet.document, snippet.chunk_index);
        println!("    \"{}\"", snippet.text.replace('\n', " ").trim());
    }
}

fn print_answer(answer: &Answer) {
    println!("model: {}", answer.model);
    println!();
    println!("{}", answer.text);
}

fn print_upload_report(report: &UploadReport) {
    if !report.uploaded.is_empty() {
        println!("uploaded  {}", report.summary());
    }
    for failed in &report.failed {
        println!("failed    {}  ({})", failed.name, failed.reason);
    }
}

fn print_document_count(documents: &[String]) {
    println!("documents: {}", documents.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use querywise_core::services::canned::CannedServices;
    use crate::controller::ControllerSettings;

    #[test]
    fn flags_only_turn_options_on() {
        let base = GenerationOptions {
            use_web_search: true,
            ..Default::default()
        };
        let flags = OptionFlags {
            detailed: true,
            ..Default::default()
        };
        let opts = flags.apply(base);
        assert!(opts.use_web_search);
        assert!(opts.use_detailed_explanation);
        assert!(!opts.use_external_knowledge);
    }

    #[tokio::test]
    async fn session_drains_notifications_in_order() {
        let controller = QueryController::new(
            Collaborators::from_shared(Arc::new(CannedServices::new())),
            ControllerSettings::default(),
        );
        let mut session = Session::new(controller);
        let _ = session.controller.submit_query("  ").await;
        session.controller.submit_query("revenue").await.unwrap();

        let titles: Vec<String> = session
            .drain_notifications()
            .into_iter()
            .map(|n| n.title)
            .collect();
        assert_eq!(titles, vec!["Query required", "Search completed"]);
        assert!(session.drain_notifications().is_empty());
    }

    #[test]
    fn read_upload_uses_file_name() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();
        let file = read_upload(&path).unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.bytes, b"%PDF-1.7");
    }

    #[test]
    fn read_upload_missing_file() {
        let err = read_upload(Path::new("/nonexistent/qw/file.pdf")).unwrap_err();
        assert!(err.to_string().contains("Failed to read upload file"));
    }
}
