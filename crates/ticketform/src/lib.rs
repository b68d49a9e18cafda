//! Ticket Form
//!
//! Headless model of a multi-step support-ticket form and the page
//! enhancements around it, following Domain-Driven Design with a hexagonal
//! split between domain, ports and infrastructure.
//!
//! ## Architecture
//!
//! - **Domain Layer**: form aggregate, validation engine, upload tracker,
//!   step navigator, draft snapshot, domain events, preview rendering
//! - **Application Layer**: `TicketFormApp`, draft persistence, event bus
//! - **Ports Layer**: clock, draft storage, preview URLs, submitter,
//!   clipboard and confirmation interfaces
//! - **Infrastructure Layer**: in-memory and file-backed stores, clocks,
//!   simulated submitter
//! - **Enhancements**: alerts, confirmations, table filters, dropdowns,
//!   clipboard buttons, submit guards, character counters
//!
//! Timers are deadlines measured against an injected [`ports::Clock`] and
//! fired by `tick`, so every time-dependent behavior is testable without
//! waiting.

pub mod application;
pub mod config;
pub mod domain;
pub mod enhancements;
pub mod error;
pub mod infrastructure;
pub mod ports;

// Re-exports for convenience
pub use application::{AppServices, EventBus, PersistenceHelper, SubmitOutcome, SubmitState, TicketFormApp};
pub use config::{FieldConfig, FormConfig};
pub use domain::aggregates::{
    AdmissionReport, DraftSnapshot, Field, FileUploadTracker, Form, FormData, FormValue,
    StepNavigator, StepTransition, UploadPolicy, ValidationEngine,
};
pub use domain::events::{DomainEvent, EventEnvelope};
pub use domain::services::{PreviewData, PreviewRenderer};
pub use domain::value_objects::{FieldKind, FileCandidate, FileMeta, Rule, RuleRegistry, UnknownRulePolicy};
pub use enhancements::PageEnhancements;
pub use error::{FormError, Result};
