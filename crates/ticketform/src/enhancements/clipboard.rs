//! Copy-to-clipboard buttons

use chrono::{DateTime, Duration, Utc};
use tracing::error;

use crate::ports::outbound::Clipboard;

pub const COPIED_LABEL: &str = "✓ Copied!";
pub const SUCCESS_CLASS: &str = "btn--success";
const FEEDBACK_MS: i64 = 2000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyButton {
    text: String,
    label: String,
    copied_until: Option<DateTime<Utc>>,
}

impl CopyButton {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
            copied_until: None,
        }
    }

    /// Copy the button's text; on failure the label is left as it was
    pub fn click(&mut self, now: DateTime<Utc>, clipboard: &dyn Clipboard) -> bool {
        match clipboard.write_text(&self.text) {
            Ok(()) => {
                self.copied_until = Some(now + Duration::milliseconds(FEEDBACK_MS));
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to copy");
                false
            }
        }
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        if matches!(self.copied_until, Some(until) if now >= until) {
            self.copied_until = None;
        }
    }

    pub fn is_showing_success(&self) -> bool {
        self.copied_until.is_some()
    }

    pub fn label(&self) -> &str {
        if self.is_showing_success() { COPIED_LABEL } else { &self.label }
    }

    pub fn classes(&self) -> Vec<&'static str> {
        if self.is_showing_success() { vec![SUCCESS_CLASS] } else { vec![] }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.copied_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::ClipboardError;
    use chrono::TimeZone;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct FakeClipboard {
        contents: Mutex<Option<String>>,
        fail: bool,
    }

    impl Clipboard for FakeClipboard {
        fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
            if self.fail {
                return Err(ClipboardError::Denied("not focused".into()));
            }
            *self.contents.lock() = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_copy_feedback() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clipboard = FakeClipboard::default();
        let mut button = CopyButton::new("TKT-1234", "Copy ID");

        assert!(button.click(t0, &clipboard));
        assert_eq!(clipboard.contents.lock().as_deref(), Some("TKT-1234"));
        assert_eq!(button.label(), "✓ Copied!");
        assert_eq!(button.classes(), vec!["btn--success"]);

        button.tick(t0 + Duration::milliseconds(1999));
        assert!(button.is_showing_success());
        button.tick(t0 + Duration::milliseconds(2000));
        assert_eq!(button.label(), "Copy ID");
        assert!(button.classes().is_empty());
    }

    #[test]
    fn test_copy_failure_keeps_label() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clipboard = FakeClipboard { fail: true, ..FakeClipboard::default() };
        let mut button = CopyButton::new("x", "Copy");
        assert!(!button.click(t0, &clipboard));
        assert_eq!(button.label(), "Copy");
    }
}
