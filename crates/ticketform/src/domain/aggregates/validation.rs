//! Validation Engine
//!
//! Evaluates each field's rule list against its current value, annotates the
//! field, and keeps the error map of the last pass.

use std::collections::BTreeMap;

use crate::domain::aggregates::form::{Field, Form};
use crate::domain::events::{DomainEvent, ValidationEvent};
use crate::domain::value_objects::{ComponentKind, ComponentRef, InstanceId};
use crate::error::{FormError, Result};

/// Field name to failing-rule messages, in rule order
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Messages for every failing rule of a field; all rules run
pub fn field_errors(field: &Field) -> Vec<String> {
    let input = field.input();
    field
        .rules()
        .iter()
        .filter(|rule| !rule.check(&input))
        .map(|rule| rule.message(field.label()))
        .collect()
}

#[derive(Debug, Default)]
pub struct ValidationEngine {
    instance: InstanceId,
    errors: ErrorMap,
    events: Vec<DomainEvent>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn component(&self) -> ComponentRef {
        ComponentRef::new(ComponentKind::Validator, self.instance)
    }

    /// Validate one field, annotating it and updating its entry in the error map
    pub fn validate_field(&mut self, form: &mut Form, name: &str) -> Result<bool> {
        let field = form
            .field_mut(name)
            .ok_or_else(|| FormError::FieldNotFound(name.to_string()))?;
        Ok(self.apply(field))
    }

    /// Clear all error state, then validate every rule-bearing field
    pub fn validate_form(&mut self, form: &mut Form) -> bool {
        self.errors.clear();
        for field in form.fields_mut() {
            field.clear_annotation();
        }

        let mut valid = true;
        for field in form.fields_mut().filter(|f| !f.rules().is_empty()) {
            valid &= self.apply(field);
        }

        let event = if valid {
            ValidationEvent::Passed
        } else {
            ValidationEvent::Failed { errors: self.errors.clone() }
        };
        self.events.push(DomainEvent::Validation(event));
        valid
    }

    /// Whether the whole form currently passes
    pub fn is_valid(&mut self, form: &mut Form) -> bool {
        self.validate_form(form)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn clear_errors(&mut self, form: &mut Form) {
        self.errors.clear();
        for field in form.fields_mut() {
            field.clear_annotation();
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn apply(&mut self, field: &mut Field) -> bool {
        let messages = field_errors(field);
        let key = field.name().to_string();

        if messages.is_empty() {
            field.clear_annotation();
            self.errors.remove(&key);
            true
        } else {
            field.annotate(messages.clone());
            self.errors.insert(key, messages);
            false
        }
    }
}
