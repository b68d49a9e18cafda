//! Confirmation prompts for destructive actions

use crate::ports::outbound::Confirmer;

pub const DEFAULT_CONFIRM_MESSAGE: &str = "Are you sure?";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmGate {
    message: String,
}

impl ConfirmGate {
    /// Gate from a `data-confirm` value; empty means the default prompt
    pub fn from_attribute(value: Option<&str>) -> Self {
        let message = match value.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => DEFAULT_CONFIRM_MESSAGE.to_string(),
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the action may proceed
    pub fn allow(&self, confirmer: &dyn Confirmer) -> bool {
        confirmer.confirm(&self.message)
    }
}
