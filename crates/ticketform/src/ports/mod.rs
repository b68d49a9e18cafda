//! Ports module (Hexagonal Architecture)
//!
//! Interfaces to everything outside the form: time, storage, preview URLs,
//! the submission endpoint and browser affordances.

pub mod outbound;

pub use outbound::*;
