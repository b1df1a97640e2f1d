//! Latency-simulating mock collaborators.
//!
//! [`MockServices`] behaves like the canned collaborators from
//! `querywise-core`, but each call first sleeps for a configured duration
//! and may be told to fail. This is what the `qw` binary runs against.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use querywise_core::models::{
    DocumentList, GenerateResponse, GenerationOptions, SearchResponse, Snippet, UploadFile,
    UploadReceipt,
};
use querywise_core::services::canned::CannedServices;
use querywise_core::services::{DocumentStore, Generator, Retriever};

use crate::config::MockConfig;

/// Per-operation simulated latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    pub search: Duration,
    pub generate: Duration,
    pub list: Duration,
    pub upload: Duration,
}

impl Latency {
    pub fn none() -> Self {
        Self {
            search: Duration::ZERO,
            generate: Duration::ZERO,
            list: Duration::ZERO,
            upload: Duration::ZERO,
        }
    }
}

/// Which calls should fail.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailurePlan {
    pub search: bool,
    pub generate: bool,
    pub list: bool,
    pub uploads: HashSet<String>,
}

pub struct MockServices {
    canned: CannedServices,
    latency: Latency,
    failures: FailurePlan,
}

impl MockServices {
    pub fn new(latency: Latency, failures: FailurePlan) -> Self {
        Self {
            canned: CannedServices::new(),
            latency,
            failures,
        }
    }

    pub fn from_config(cfg: &MockConfig) -> Self {
        Self::new(
            Latency {
                search: Duration::from_millis(cfg.search_latency_ms),
                generate: Duration::from_millis(cfg.generate_latency_ms),
                list: Duration::from_millis(cfg.list_latency_ms),
                upload: Duration::from_millis(cfg.upload_latency_ms),
            },
            FailurePlan {
                search: cfg.fail_search,
                generate: cfg.fail_generate,
                list: cfg.fail_list,
                uploads: cfg.fail_uploads.iter().cloned().collect(),
            },
        )
    }
}

async fn simulate(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}

#[async_trait]
impl Retriever for MockServices {
    async fn retrieve(&self, query: &str) -> Result<SearchResponse> {
        simulate(self.latency.search).await;
        if self.failures.search {
            bail!("search backend unavailable");
        }
        self.canned.retrieve(query).await
    }
}

#[async_trait]
impl Generator for MockServices {
    async fn generate(
        &self,
        query: &str,
        snippets: &[Snippet],
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerateResponse> {
        simulate(self.latency.generate).await;
        if self.failures.generate {
            bail!("model endpoint returned an error");
        }
        self.canned.generate(query, snippets, model, options).await
    }
}

#[async_trait]
impl DocumentStore for MockServices {
    async fn list_documents(&self) -> Result<DocumentList> {
        simulate(self.latency.list).await;
        if self.failures.list {
            bail!("document store unavailable");
        }
        self.canned.list_documents().await
    }

    async fn upload(&self, file: &UploadFile) -> Result<UploadReceipt> {
        simulate(self.latency.upload).await;
        if self.failures.uploads.contains(&file.name) {
            bail!("upload of '{}' rejected", file.name);
        }
        self.canned.upload(file).await
    }
}
