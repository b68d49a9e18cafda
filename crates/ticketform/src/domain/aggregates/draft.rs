//! Draft snapshot
//!
//! Persisted copy of in-progress form state plus the step it was on. Stored
//! as `{"formData": {...}, "step": n, "timestamp": <ms since epoch>}`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::aggregates::form::FormData;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub form_data: FormData,
    pub step: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl DraftSnapshot {
    pub fn new(form_data: FormData, step: u32, timestamp: DateTime<Utc>) -> Self {
        Self { form_data, step, timestamp }
    }

    /// Fresh while strictly younger than the window
    pub fn is_fresh(&self, now: DateTime<Utc>, window: Duration) -> bool {
        now - self.timestamp < window
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::form::FormValue;
    use chrono::TimeZone;

    fn snapshot_at(ts: DateTime<Utc>) -> DraftSnapshot {
        let mut data = FormData::new();
        data.insert("title".into(), FormValue::Single("Printer".into()));
        DraftSnapshot::new(data, 2, ts)
    }

    #[test]
    fn test_freshness_window() {
        let saved = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let snapshot = snapshot_at(saved);
        let day = Duration::hours(24);

        assert!(snapshot.is_fresh(saved + Duration::hours(23) + Duration::minutes(59), day));
        assert!(!snapshot.is_fresh(saved + Duration::hours(24), day));
        assert!(!snapshot.is_fresh(saved + Duration::hours(24) + Duration::minutes(1), day));
    }

    #[test]
    fn test_wire_format() {
        let saved = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let json = snapshot_at(saved).to_json().unwrap();
        assert_eq!(
            json,
            r#"{"formData":{"title":"Printer"},"step":2,"timestamp":1700000000123}"#
        );
        assert_eq!(DraftSnapshot::from_json(&json).unwrap(), snapshot_at(saved));
    }

    #[test]
    fn test_corrupt_json() {
        assert!(DraftSnapshot::from_json("{not json").is_err());
        assert!(DraftSnapshot::from_json(r#"{"step":1}"#).is_err());
    }
}
