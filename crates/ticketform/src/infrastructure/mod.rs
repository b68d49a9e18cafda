//! Infrastructure layer
//!
//! Concrete adapters for the outbound ports.

pub mod clock;
pub mod persistence;
pub mod preview_urls;
pub mod submission;

pub use clock::{ManualClock, SystemClock};
pub use persistence::{FileDraftStore, InMemoryDraftStore};
pub use preview_urls::ObjectUrlRegistry;
pub use submission::SimulatedSubmitter;
