//! Domain module
//!
//! Form state, the components that act on it, and the events they raise.

pub mod aggregates;
pub mod value_objects;
pub mod events;
pub mod services;

pub use aggregates::*;
pub use value_objects::*;
pub use events::*;
