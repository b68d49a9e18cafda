//! Value Objects module
//!
//! Immutable domain primitives shared by the form components.

pub mod field;
pub mod file;
pub mod rule;

pub use field::{Annotation, FieldKind, FieldValue, SelectOption};
pub use file::{
    file_icon, format_file_size, FileCandidate, FileHandle, FileMeta, PreviewRef, BYTES_PER_MB,
};
pub use rule::{
    CustomRule, FieldInput, FnRule, Rule, RuleParseError, RuleRegistry, UnknownRulePolicy,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Name of a form control, as it appears in submitted form data
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldName(String);

impl FieldName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for FieldName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Identifier of a tracked file
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(String);

impl FileId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one component instance on a page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which component emitted an event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Validator,
    Uploader,
    Navigator,
    Persistence,
    Form,
}

/// Reference to the emitting component instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    pub kind: ComponentKind,
    pub instance: InstanceId,
}

impl ComponentRef {
    pub fn new(kind: ComponentKind, instance: InstanceId) -> Self {
        Self { kind, instance }
    }
}

/// Ticket priority as selected in the form
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    /// Parse the select value (`low`, `normal`, `high`, `urgent`)
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            "urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Low => "🟢",
            Self::Normal => "🟡",
            Self::High => "🟠",
            Self::Urgent => "🔴",
        }
    }

    /// Indicator label, e.g. `High Priority`
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => format!("{}{} Priority", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "This will be addressed when time permits.",
            Self::Normal => "Standard response time applies.",
            Self::High => "This will be prioritized over normal issues.",
            Self::Urgent => "This requires immediate attention.",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
