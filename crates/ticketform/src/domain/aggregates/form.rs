//! Form Aggregate
//!
//! In-memory model of one form: ordered fields with their current values,
//! rule lists, step section and accessibility annotations. It is the state
//! every other component reads and annotates; there is exactly one per page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{FieldConfig, FormConfig};
use crate::domain::value_objects::{
    Annotation, FieldInput, FieldKind, FieldName, FieldValue, FileMeta, Rule, RuleParseError,
    RuleRegistry, UnknownRulePolicy,
};
use crate::error::{FormError, Result};

/// One serialized form value; repeated names collapse into a list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FormValue {
    pub fn first(&self) -> &str {
        match self {
            Self::Single(value) => value,
            Self::Multiple(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn contains(&self, candidate: &str) -> bool {
        match self {
            Self::Single(value) => value == candidate,
            Self::Multiple(values) => values.iter().any(|v| v == candidate),
        }
    }
}

/// Serialized form state keyed by field name
pub type FormData = BTreeMap<String, FormValue>;

/// A single form control
#[derive(Clone, Debug)]
pub struct Field {
    name: FieldName,
    label: Option<String>,
    kind: FieldKind,
    value: FieldValue,
    default: FieldValue,
    rules: Vec<Rule>,
    required: bool,
    section: u32,
    max_length: Option<usize>,
    annotation: Annotation,
}

impl Field {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let value = kind.empty_value();
        Self {
            name: FieldName::new(name),
            label: None,
            default: value.clone(),
            value,
            kind,
            rules: Vec::new(),
            required: false,
            section: 1,
            max_length: None,
            annotation: Annotation::default(),
        }
    }

    /// Build a field from its declarative configuration
    pub fn from_config(
        config: &FieldConfig,
        registry: &RuleRegistry,
        policy: UnknownRulePolicy,
    ) -> std::result::Result<Self, RuleParseError> {
        let mut field = Self::new(config.name.clone(), config.kind.clone()).in_section(config.section);
        if let Some(label) = &config.label {
            field = field.with_label(label.clone());
        }
        if config.required {
            field = field.required();
        }
        if let Some(spec) = &config.validate {
            field.rules = registry.parse(spec, policy)?;
        }
        if let Some(max) = config.max_length {
            field.max_length = Some(max);
        }
        if let Some(default) = &config.default {
            field.set_text(default.clone());
            field.default = field.value.clone();
        }
        Ok(field)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn in_section(mut self, section: u32) -> Self {
        self.section = section.max(1);
        self
    }

    // =========================================================================
    // Getters
    // =========================================================================

    pub fn name(&self) -> &FieldName { &self.name }
    pub fn kind(&self) -> &FieldKind { &self.kind }
    pub fn value(&self) -> &FieldValue { &self.value }
    pub fn rules(&self) -> &[Rule] { &self.rules }
    pub fn is_required(&self) -> bool { self.required }
    pub fn section(&self) -> u32 { self.section }
    pub fn max_length(&self) -> Option<usize> { self.max_length }
    pub fn annotation(&self) -> &Annotation { &self.annotation }
    pub fn is_file(&self) -> bool { self.kind.is_file() }

    /// Display label used in messages; falls back to the control name
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(self.name.as_str())
    }

    /// Value as the control reports it
    pub fn text_value(&self) -> &str {
        match (&self.value, &self.kind) {
            (FieldValue::Text(text), _) => text.as_str(),
            (FieldValue::Checked(true), FieldKind::Checkbox { value }) => value.as_str(),
            (FieldValue::Checked(_), _) => "",
            (FieldValue::Files(files), _) => files.first().map(|f| f.name.as_str()).unwrap_or(""),
        }
    }

    /// Human-facing value: the option label for selects
    pub fn display_value(&self) -> &str {
        let text = self.text_value();
        if let FieldKind::Select { options } = &self.kind {
            if let Some(option) = options.iter().find(|o| o.value == text) {
                return option.label.as_str();
            }
        }
        text
    }

    pub fn files(&self) -> &[FileMeta] {
        self.value.files().unwrap_or(&[])
    }

    pub fn input(&self) -> FieldInput<'_> {
        match &self.value {
            FieldValue::Files(files) => FieldInput::files(files),
            _ => FieldInput::text(self.text_value()),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Set the value from text, interpreting it according to the control kind
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.value = match &self.kind {
            FieldKind::Checkbox { value } => FieldValue::Checked(*value == text),
            FieldKind::Select { options } => {
                if options.iter().any(|o| o.value == text) {
                    FieldValue::Text(text)
                } else {
                    FieldValue::Text(String::new())
                }
            }
            FieldKind::File => return,
            _ => FieldValue::Text(text),
        };
    }

    pub fn set_checked(&mut self, checked: bool) {
        if matches!(self.kind, FieldKind::Checkbox { .. }) {
            self.value = FieldValue::Checked(checked);
        }
    }

    pub fn set_files(&mut self, files: Vec<FileMeta>) {
        if self.is_file() {
            self.value = FieldValue::Files(files);
        }
    }

    pub fn annotate(&mut self, messages: Vec<String>) {
        self.annotation = Annotation::invalid(self.name.as_str(), messages);
    }

    pub fn clear_annotation(&mut self) {
        self.annotation = Annotation::default();
    }

    fn reset(&mut self) {
        self.value = self.default.clone();
        self.clear_annotation();
    }
}

/// Form aggregate root
#[derive(Clone, Debug, Default)]
pub struct Form {
    id: String,
    fields: Vec<Field>,
}

impl Form {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), fields: Vec::new() }
    }

    /// Build the form described by a configuration
    pub fn from_config(config: &FormConfig, registry: &RuleRegistry) -> Result<Self> {
        let mut form = Self::new(config.form_id.clone());
        for field_config in &config.fields {
            form.add_field(Field::from_config(field_config, registry, config.rules.unknown)?);
        }
        Ok(form)
    }

    pub fn id(&self) -> &str { &self.id }
    pub fn fields(&self) -> &[Field] { &self.fields }

    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name.as_str() == name)
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.iter_mut()
    }

    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let field = self
            .field_mut(name)
            .ok_or_else(|| FormError::FieldNotFound(name.to_string()))?;
        field.set_text(value);
        Ok(())
    }

    /// Fields belonging to a step section
    pub fn fields_in_section(&self, section: u32) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.section == section)
    }

    /// First field in form order currently marked invalid (the focus target)
    pub fn first_invalid_field(&self) -> Option<&FieldName> {
        self.fields
            .iter()
            .find(|f| f.annotation.invalid)
            .map(|f| &f.name)
    }

    /// First file input, if any
    pub fn file_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.is_file())
    }

    /// Serialize to name/value pairs the way a browser builds form data.
    /// Unchecked checkboxes and file inputs are omitted.
    pub fn serialize(&self) -> FormData {
        let mut data = FormData::new();
        for field in &self.fields {
            let value = match (&field.value, &field.kind) {
                (FieldValue::Files(_), _) => continue,
                (FieldValue::Checked(false), _) => continue,
                _ => field.text_value().to_string(),
            };

            match data.remove(field.name.as_str()) {
                None => {
                    data.insert(field.name.to_string(), FormValue::Single(value));
                }
                Some(FormValue::Single(existing)) => {
                    data.insert(field.name.to_string(), FormValue::Multiple(vec![existing, value]));
                }
                Some(FormValue::Multiple(mut values)) => {
                    values.push(value);
                    data.insert(field.name.to_string(), FormValue::Multiple(values));
                }
            }
        }
        data
    }

    /// Whether the current state differs from a saved serialization
    pub fn has_changes(&self, saved: &FormData) -> bool {
        &self.serialize() != saved
    }

    /// Restore defaults, drop selected files and annotations
    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.reset();
        }
    }
}
