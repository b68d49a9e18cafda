//! Double-submit protection for plain forms

use chrono::{DateTime, Duration, Utc};

pub const PROCESSING_LABEL: &str = "Processing...";
const REENABLE_AFTER_SECS: i64 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitGuard {
    label: String,
    disabled_until: Option<DateTime<Utc>>,
}

impl SubmitGuard {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), disabled_until: None }
    }

    /// Disable on submit; a disabled button ignores further submits
    pub fn on_submit(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_disabled() {
            return false;
        }
        self.disabled_until = Some(now + Duration::seconds(REENABLE_AFTER_SECS));
        true
    }

    /// Re-enable once the fallback delay has passed
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if matches!(self.disabled_until, Some(until) if now >= until) {
            self.disabled_until = None;
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled_until.is_some()
    }

    pub fn label(&self) -> &str {
        if self.is_disabled() { PROCESSING_LABEL } else { &self.label }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.disabled_until
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_guard() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut guard = SubmitGuard::new("Save");
        assert!(guard.on_submit(t0));
        assert!(!guard.on_submit(t0 + Duration::seconds(1)));
        assert_eq!(guard.label(), "Processing...");

        guard.tick(t0 + Duration::seconds(9));
        assert!(guard.is_disabled());
        guard.tick(t0 + Duration::seconds(10));
        assert!(!guard.is_disabled());
        assert_eq!(guard.label(), "Save");
    }
}
