//! Remaining-characters counter for length-limited text areas

use serde::Serialize;

const WARNING_BELOW: i64 = 50;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterLevel {
    Normal,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CounterView {
    pub remaining: i64,
    pub text: String,
    pub level: CounterLevel,
}

impl CounterView {
    /// CSS classes on the counter; over the limit carries both
    pub fn classes(&self) -> Vec<&'static str> {
        match self.level {
            CounterLevel::Normal => vec![],
            CounterLevel::Warning => vec!["warning"],
            CounterLevel::Error => vec!["warning", "error"],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CharacterCounter {
    max_length: usize,
}

impl CharacterCounter {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn view(&self, text: &str) -> CounterView {
        let remaining = self.max_length as i64 - text.chars().count() as i64;
        let level = if remaining < 0 {
            CounterLevel::Error
        } else if remaining < WARNING_BELOW {
            CounterLevel::Warning
        } else {
            CounterLevel::Normal
        };
        CounterView {
            remaining,
            text: format!("{} characters remaining", remaining),
            level,
        }
    }
}
