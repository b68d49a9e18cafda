//! Aggregates module

pub mod draft;
pub mod form;
pub mod steps;
pub mod upload;
pub mod validation;

pub use draft::DraftSnapshot;
pub use form::{Field, Form, FormData, FormValue};
pub use steps::{NavControls, NavigatorError, ProgressView, StepNavigator, StepState, StepTransition};
pub use upload::{
    AdmissionReport, FileRecord, FileUploadTracker, Rejection, RejectionReason, UploadPolicy,
};
pub use validation::{field_errors, ErrorMap, ValidationEngine};
