//! Domain Events
//!
//! Events raised by the form components. Observers receive them wrapped in an
//! [`EventEnvelope`] naming the component instance that raised them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::validation::ErrorMap;
use crate::domain::value_objects::{ComponentRef, FileId, FileMeta};
use crate::ports::outbound::SubmissionReceipt;

/// All domain events of the ticket form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "component", content = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    Validation(ValidationEvent),
    Upload(UploadEvent),
    Step(StepEvent),
    Form(FormEvent),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationEvent {
    Passed,
    Failed { errors: ErrorMap },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    /// Files accepted from one batch, in admission order
    FilesAdded { files: Vec<FileMeta> },
    FileRemoved { id: FileId, file: FileMeta },
    FilesCleared { count: usize },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepEvent {
    Changed { from: u32, to: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormEvent {
    Submitted { receipt: SubmissionReceipt },
    DraftRestored { step: u32 },
    DraftCleared,
    Reset,
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation(ValidationEvent::Passed) => "validation:passed",
            Self::Validation(ValidationEvent::Failed { .. }) => "validation:failed",
            Self::Upload(UploadEvent::FilesAdded { .. }) => "files:added",
            Self::Upload(UploadEvent::FileRemoved { .. }) => "file:removed",
            Self::Upload(UploadEvent::FilesCleared { .. }) => "files:cleared",
            Self::Step(StepEvent::Changed { .. }) => "step:changed",
            Self::Form(FormEvent::Submitted { .. }) => "form:submitted",
            Self::Form(FormEvent::DraftRestored { .. }) => "draft:restored",
            Self::Form(FormEvent::DraftCleared) => "draft:cleared",
            Self::Form(FormEvent::Reset) => "form:reset",
        }
    }
}

/// An event together with its emitting component
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub source: ComponentRef,
    pub event: DomainEvent,
    pub occurred_at: DateTime<Utc>,
}

impl EventEnvelope {
    pub fn new(source: ComponentRef, event: DomainEvent, occurred_at: DateTime<Utc>) -> Self {
        Self { source, event, occurred_at }
    }
}
