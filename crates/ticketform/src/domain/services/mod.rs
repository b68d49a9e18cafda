//! Domain services module

pub mod html;
pub mod preview;

pub use html::{escape_attr, escape_html, escape_multiline};
pub use preview::{PreviewData, PreviewRenderer, PreviewSection, PreviewValue, NOT_PROVIDED};
