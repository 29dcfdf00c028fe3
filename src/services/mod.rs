//! External service interactions
//!
//! This module contains services for interacting with external systems:
//! - Document store access (HTTP client + error envelope parsing)
//! - Schema introspection and row fetching
//! - Background job execution
//! - File export encoders

pub mod client;
pub mod error;
pub mod export;
pub mod fetcher;
pub mod job_runner;
pub mod schema;

pub use client::{ApiCredentials, DocumentStore, HttpDocumentStore, UnconfiguredStore};
pub use error::{ApiError, ExportError};
pub use job_runner::{JobKind, JobMessage, JobOutcome, JobRunner};
