//! Form configuration
//!
//! Declarative description of a form: its fields and their rule lists, the
//! upload admission policy, step count, draft persistence and submission
//! timing. Loaded from TOML or JSON.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::domain::aggregates::upload::UploadPolicy;
use crate::domain::value_objects::{FieldKind, SelectOption, UnknownRulePolicy};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot write TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One form control
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    /// Rule list, e.g. `required,minLength:5`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<String>,
    /// Character budget shown by the counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// 1-based step the field belongs to
    #[serde(default = "default_section")]
    pub section: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

fn default_section() -> u32 {
    1
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind,
            required: false,
            validate: None,
            max_length: None,
            section: 1,
            default: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validate(mut self, rules: impl Into<String>) -> Self {
        self.validate = Some(rules.into());
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn section(mut self, section: u32) -> Self {
        self.section = section;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepsConfig {
    pub total: u32,
}

impl Default for StepsConfig {
    fn default() -> Self {
        Self { total: 3 }
    }
}

/// Draft persistence settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub storage_key: String,
    pub debounce_ms: u64,
    pub freshness_hours: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            storage_key: "ticket-form-draft".to_string(),
            debounce_ms: 1000,
            freshness_hours: 24,
        }
    }
}

impl PersistenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::milliseconds(self.debounce_ms as i64)
    }

    pub fn freshness(&self) -> Duration {
        Duration::hours(self.freshness_hours as i64)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub simulated_delay_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { simulated_delay_ms: 2000 }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub unknown: UnknownRulePolicy,
}

/// Complete form configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    pub form_id: String,
    #[serde(default)]
    pub steps: StepsConfig,
    #[serde(default)]
    pub upload: UploadPolicy,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

impl FormConfig {
    /// The built-in support ticket form
    pub fn ticket_form() -> Self {
        let categories = vec![
            SelectOption::new("", "Select a category"),
            SelectOption::new("suggestion", "Suggestion"),
            SelectOption::new("problem", "Problem"),
            SelectOption::new("bug", "Bug Report"),
            SelectOption::new("feature_request", "Feature Request"),
            SelectOption::new("general", "General Inquiry"),
        ];
        let priorities = vec![
            SelectOption::new("low", "Low"),
            SelectOption::new("normal", "Normal"),
            SelectOption::new("high", "High"),
            SelectOption::new("urgent", "Urgent"),
        ];
        let upload = UploadPolicy::default();
        let attachment_rules = format!(
            "fileType:{},fileSize:{}",
            upload.allowed_types.join("|"),
            upload.max_file_size_mb()
        );

        Self {
            form_id: "ticket-form".to_string(),
            steps: StepsConfig::default(),
            persistence: PersistenceConfig::default(),
            submission: SubmissionConfig::default(),
            rules: RulesConfig::default(),
            fields: vec![
                FieldConfig::new("title", FieldKind::Text)
                    .label("Title")
                    .required()
                    .validate("required,minLength:5,maxLength:200")
                    .max_length(200),
                FieldConfig::new("category", FieldKind::Select { options: categories })
                    .label("Category")
                    .required()
                    .validate("required"),
                FieldConfig::new("priority", FieldKind::Select { options: priorities })
                    .label("Priority")
                    .default_value("normal"),
                FieldConfig::new("description", FieldKind::TextArea)
                    .label("Description")
                    .required()
                    .validate("required,minLength:10,maxLength:2000")
                    .max_length(2000)
                    .section(2),
                FieldConfig::new("email", FieldKind::Email)
                    .label("Email")
                    .required()
                    .validate("required,email")
                    .section(2),
                FieldConfig::new("phone", FieldKind::Tel)
                    .label("Phone")
                    .validate("pattern:^[0-9+() -]+$")
                    .section(2),
                FieldConfig::new("attachments", FieldKind::File)
                    .label("Attachments")
                    .validate(attachment_rules)
                    .section(3),
            ],
            upload,
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as TOML
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.total == 0 {
            return Err(ConfigError::Invalid("steps.total must be at least 1".into()));
        }
        if self.upload.max_files == 0 {
            return Err(ConfigError::Invalid("upload.max_files must be at least 1".into()));
        }
        if self.persistence.storage_key.trim().is_empty() {
            return Err(ConfigError::Invalid("persistence.storage_key is empty".into()));
        }
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ConfigError::Invalid("field without a name".into()));
            }
            if field.section == 0 || field.section > self.steps.total {
                return Err(ConfigError::Invalid(format!(
                    "field '{}' is in section {} but the form has {} steps",
                    field.name, field.section, self.steps.total
                )));
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self::ticket_form()
    }
}
