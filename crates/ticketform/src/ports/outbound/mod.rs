//! Outbound ports
//!
//! Hexagonal architecture: these are the interfaces that infrastructure must implement.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::aggregates::form::FormData;
use crate::domain::value_objects::{FileMeta, PreviewRef};

/// Source of the current time; every deadline in the crate is measured against it
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Key/value draft storage (the browser's local storage)
pub trait DraftStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Allocates transient preview references for tracked files
pub trait PreviewUrlAllocator: Send + Sync {
    fn allocate(&self, file: &FileMeta) -> PreviewRef;

    /// Release a reference; releasing twice is harmless
    fn release(&self, preview: &PreviewRef);
}

/// Where a validated ticket goes
#[async_trait]
pub trait TicketSubmitter: Send + Sync {
    async fn submit(&self, submission: &Submission) -> Result<SubmissionReceipt, SubmitError>;
}

/// System clipboard
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Blocking yes/no prompt (`window.confirm`)
pub trait Confirmer {
    fn confirm(&self, message: &str) -> bool;
}

/// Payload handed to the submitter
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub form_id: String,
    pub data: FormData,
    pub files: Vec<FileMeta>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub ticket_id: String,
    pub submitted_at: DateTime<Utc>,
}

/// Storage errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage quota exceeded: need {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("draft serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e.to_string())
    }
}

/// Submission errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("submission rejected: {0}")]
    Rejected(String),

    #[error("submission transport failed: {0}")]
    Transport(String),
}

/// Clipboard errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("clipboard not available")]
    Unavailable,

    #[error("clipboard write denied: {0}")]
    Denied(String),
}
