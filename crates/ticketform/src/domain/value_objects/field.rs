//! Field value objects: control kinds, values and accessibility annotations

use serde::{Deserialize, Serialize};

use super::file::FileMeta;

/// Option of a select control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Kind of form control
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    #[default]
    Text,
    TextArea,
    Email,
    Tel,
    Select {
        options: Vec<SelectOption>,
    },
    Checkbox {
        #[serde(default = "default_checkbox_value")]
        value: String,
    },
    File,
}

fn default_checkbox_value() -> String {
    "on".to_string()
}

impl FieldKind {
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Initial value for a control of this kind
    pub fn empty_value(&self) -> FieldValue {
        match self {
            Self::Checkbox { .. } => FieldValue::Checked(false),
            Self::File => FieldValue::Files(Vec::new()),
            _ => FieldValue::Text(String::new()),
        }
    }
}

/// Current value of a control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Checked(bool),
    Files(Vec<FileMeta>),
}

impl FieldValue {
    pub fn files(&self) -> Option<&[FileMeta]> {
        match self {
            Self::Files(files) => Some(files),
            _ => None,
        }
    }
}

/// Assistive-technology state attached to a field after validation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// `aria-invalid`
    pub invalid: bool,
    /// `aria-describedby`, pointing at the inline error container
    pub described_by: Option<String>,
    /// Inline error text, one entry per failing rule
    pub messages: Vec<String>,
}

impl Annotation {
    pub fn invalid(field_name: &str, messages: Vec<String>) -> Self {
        Self {
            invalid: true,
            described_by: Some(format!("error-{}", field_name)),
            messages,
        }
    }

    pub fn is_clear(&self) -> bool {
        !self.invalid && self.described_by.is_none() && self.messages.is_empty()
    }
}
