//! Site-wide page enhancements
//!
//! Small interaction helpers that work on any page: confirmations, alerts,
//! table filtering, dropdowns, clipboard buttons, double-submit guards and
//! character counters. [`PageEnhancements`] wires them to elements by
//! attribute.

pub mod alerts;
pub mod animation;
pub mod clipboard;
pub mod confirm;
pub mod counter;
pub mod dropdown;
pub mod listeners;
pub mod modal;
pub mod page;
pub mod submit_guard;
pub mod table_filter;

pub use alerts::{Alert, AlertCenter, AlertId, AlertKind, AlertOptions};
pub use animation::FadeAnimation;
pub use clipboard::CopyButton;
pub use confirm::ConfirmGate;
pub use counter::{CharacterCounter, CounterLevel, CounterView};
pub use dropdown::DropdownGroup;
pub use listeners::{ElementId, ListenerRegistry};
pub use modal::PreviewModal;
pub use page::{PageElement, PageEnhancements, PageEvent, PageOutcome};
pub use submit_guard::SubmitGuard;
pub use table_filter::TableFilter;
