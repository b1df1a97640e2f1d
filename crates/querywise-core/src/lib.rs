//! # QueryWise Core
//!
//! Runtime-free logic for QueryWise: the data model, the closed model
//! catalog, answer composition, the collaborator traits the workflow
//! controller depends on, and a canned in-memory implementation of them.
//!
//! This crate contains no tokio or filesystem I/O. Latency simulation,
//! timeouts, and the controller itself live in the `querywise` app crate.

pub mod catalog;
pub mod compose;
pub mod models;
pub mod services;
