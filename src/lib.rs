//! # QueryWise
//!
//! **Document question answering over pluggable retrieval and generation
//! collaborators.**
//!
//! Users upload files, ask natural-language questions, inspect the snippets
//! retrieved for them, and read a generated answer. The retrieval engine,
//! the model, and the document store are external collaborators; this crate
//! ships latency-simulating mocks of all three.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────┐   ┌──────────────┐
//! │ Collaborators│◀──│ QueryController │──▶│ Notifications│
//! │ retrieve/gen │   │ state + flags   │   │ (broadcast)  │
//! │ list/upload  │   └────────┬────────┘   └──────┬───────┘
//! └──────────────┘            │                   │
//!                             ▼                   ▼
//!                        ┌──────────────────────────┐
//!                        │        CLI (qw)          │
//!                        └──────────────────────────┘
//! ```
//!
//! ## Workflow
//!
//! 1. A query is validated ([`models::Query`]); blank input never reaches a
//!    collaborator.
//! 2. Retrieval replaces the snippet set in returned order.
//! 3. Generation runs against the current snippets, retrieving first if none
//!    were ever fetched, and replaces the answer.
//! 4. Every outcome is published as a [`notify::Notification`].
//!
//! ## Quick Start
//!
//! ```bash
//! qw models                                  # list supported models
//! qw search "revenue growth"                 # retrieve snippets
//! qw ask "How did revenue change?" --model Auto --web
//! qw docs                                    # list uploaded documents
//! qw upload report.pdf notes.pdf             # upload files
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`controller`] | Query workflow controller |
//! | [`state`] | Workflow state and busy flags |
//! | [`error`] | Workflow error kinds |
//! | [`notify`] | User-visible notifications |
//! | [`mock`] | Latency-simulating mock collaborators |
//! | [`progress`] | Upload progress reporting |
//! | [`commands`] | CLI command implementations |
//! | [`models`], [`catalog`], [`compose`], [`services`] | Re-exported from `querywise-core` |

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod mock;
pub mod notify;
pub mod progress;
pub mod state;

pub use querywise_core::{catalog, compose, models, services};

pub use controller::{ControllerSettings, QueryController};
pub use error::{Operation, WorkflowError};
pub use notify::Notification;
pub use state::{BusyFlags, WorkflowState};
