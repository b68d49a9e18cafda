//! Application layer
//!
//! Orchestrates the form components and coordinates domain objects.

pub mod app;
pub mod events;
pub mod persistence;

pub use app::{AppServices, SubmitOutcome, SubmitState, TicketFormApp};
pub use events::{EventBus, SubscriptionId};
pub use persistence::PersistenceHelper;
