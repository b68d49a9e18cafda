//! Alerts
//!
//! Flash messages, transient error alerts and notices. Closing fades an alert
//! out before it is removed; timed alerts hide themselves. Deadlines are
//! polled with [`AlertCenter::tick`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::animation::FadeAnimation;
use crate::domain::services::html::escape_html;

pub const DISMISS_FADE_MS: i64 = 200;
pub const AUTO_HIDE_DEFAULT_MS: i64 = 5000;
pub const AUTO_HIDE_FADE_MS: i64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AlertId(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            Self::Error => "exclamation-triangle",
            _ => "info-circle",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertOptions {
    pub kind: AlertKind,
    pub dismissible: bool,
    /// Hide automatically after this long
    pub auto_hide: Option<Duration>,
    /// Fade used when auto-hiding
    pub hide_fade: Duration,
}

impl Default for AlertOptions {
    fn default() -> Self {
        Self {
            kind: AlertKind::Info,
            dismissible: true,
            auto_hide: None,
            hide_fade: Duration::milliseconds(AUTO_HIDE_FADE_MS),
        }
    }
}

impl AlertOptions {
    /// Flash message with a `data-auto-hide` value; unparsable or zero means 5 s
    pub fn flash(kind: AlertKind, auto_hide: Option<&str>) -> Self {
        let delay = auto_hide
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(AUTO_HIDE_DEFAULT_MS);
        Self {
            kind,
            auto_hide: Some(Duration::milliseconds(delay)),
            ..Self::default()
        }
    }

    /// Error alert removed after 5 s without a fade
    pub fn transient_error() -> Self {
        Self {
            kind: AlertKind::Error,
            dismissible: true,
            auto_hide: Some(Duration::milliseconds(AUTO_HIDE_DEFAULT_MS)),
            hide_fade: Duration::zero(),
        }
    }

    /// Informational notice that hides after `after`
    pub fn notice(after: Duration) -> Self {
        Self {
            auto_hide: Some(after),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AlertState {
    Visible { hide_at: Option<DateTime<Utc>> },
    Fading { started: DateTime<Utc>, fade: FadeAnimation },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    id: AlertId,
    kind: AlertKind,
    message: String,
    dismissible: bool,
    hide_fade: Duration,
    state: AlertState,
}

impl Alert {
    pub fn id(&self) -> AlertId { self.id }
    pub fn kind(&self) -> AlertKind { self.kind }
    pub fn message(&self) -> &str { &self.message }
    pub fn is_dismissible(&self) -> bool { self.dismissible }

    pub fn is_fading(&self) -> bool {
        matches!(self.state, AlertState::Fading { .. })
    }

    pub fn opacity(&self, now: DateTime<Utc>) -> f64 {
        match &self.state {
            AlertState::Visible { .. } => 1.0,
            AlertState::Fading { started, fade } => fade.opacity_at(now - *started),
        }
    }

    fn render(&self) -> String {
        let close = if self.dismissible {
            r#"<button type="button" class="alert__close" aria-label="Close alert">×</button>"#
        } else {
            ""
        };
        format!(
            r#"<div class="alert alert-{kind}" role="alert" data-alert-id="{id}"><div class="alert-icon"><i class="fas fa-{icon}" aria-hidden="true"></i></div><div class="alert-content"><p class="alert-message">{message}</p></div>{close}</div>"#,
            kind = self.kind.as_str(),
            id = self.id.0,
            icon = self.kind.icon(),
            message = escape_html(&self.message),
            close = close,
        )
    }
}

#[derive(Debug, Default)]
pub struct AlertCenter {
    next_id: u64,
    alerts: Vec<Alert>,
}

impl AlertCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, now: DateTime<Utc>, message: impl Into<String>, options: AlertOptions) -> AlertId {
        self.next_id += 1;
        let id = AlertId(self.next_id);
        self.alerts.push(Alert {
            id,
            kind: options.kind,
            message: message.into(),
            dismissible: options.dismissible,
            hide_fade: options.hide_fade,
            state: AlertState::Visible {
                hide_at: options.auto_hide.map(|d| now + d),
            },
        });
        id
    }

    /// Close button: fade out over 200 ms, then remove
    pub fn dismiss(&mut self, id: AlertId, now: DateTime<Utc>) -> bool {
        match self.alerts.iter_mut().find(|a| a.id == id) {
            Some(alert) if alert.dismissible && !alert.is_fading() => {
                alert.state = AlertState::Fading {
                    started: now,
                    fade: FadeAnimation::fade_out(Duration::milliseconds(DISMISS_FADE_MS)),
                };
                true
            }
            _ => false,
        }
    }

    /// Remove immediately
    pub fn remove(&mut self, id: AlertId) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != id);
        self.alerts.len() != before
    }

    /// Start due fades and drop finished alerts; returns the removed ids
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<AlertId> {
        for alert in &mut self.alerts {
            if let AlertState::Visible { hide_at: Some(at) } = alert.state {
                if now >= at {
                    alert.state = AlertState::Fading {
                        started: at,
                        fade: FadeAnimation::fade_out(alert.hide_fade),
                    };
                }
            }
        }

        let mut removed = Vec::new();
        self.alerts.retain(|alert| match &alert.state {
            AlertState::Fading { started, fade } if fade.is_finished(now - *started) => {
                removed.push(alert.id);
                false
            }
            _ => true,
        });
        removed
    }

    /// Earliest instant at which `tick` has work to do
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.alerts
            .iter()
            .filter_map(|a| match &a.state {
                AlertState::Visible { hide_at } => *hide_at,
                AlertState::Fading { started, fade } => Some(*started + fade.duration()),
            })
            .min()
    }

    pub fn get(&self, id: AlertId) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.id == id)
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    pub fn render(&self) -> String {
        let body: String = self.alerts.iter().map(Alert::render).collect();
        format!(r#"<div class="alert-container">{}</div>"#, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap()
    }

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    #[test]
    fn test_dismiss_fades_then_removes() {
        let mut center = AlertCenter::new();
        let id = center.push(t0(), "Saved", AlertOptions::default());
        assert!(center.dismiss(id, t0()));
        assert!(!center.dismiss(id, t0()));

        assert_eq!(center.get(id).unwrap().opacity(t0() + ms(100)), 0.5);
        assert!(center.tick(t0() + ms(199)).is_empty());
        assert_eq!(center.tick(t0() + ms(200)), vec![id]);
        assert!(center.is_empty());
    }

    #[test]
    fn test_flash_auto_hide() {
        let mut center = AlertCenter::new();
        let default = center.push(t0(), "a", AlertOptions::flash(AlertKind::Success, Some("abc")));
        let fast = center.push(t0(), "b", AlertOptions::flash(AlertKind::Info, Some("1000")));

        center.tick(t0() + ms(1000));
        assert!(center.get(fast).unwrap().is_fading());
        assert_eq!(center.tick(t0() + ms(1300)), vec![fast]);

        assert_eq!(center.next_deadline(), Some(t0() + ms(5000)));
        center.tick(t0() + ms(5000));
        assert_eq!(center.get(default).unwrap().opacity(t0() + ms(5150)), 0.5);
        assert_eq!(center.tick(t0() + ms(5300)), vec![default]);
    }

    #[test]
    fn test_late_tick_removes_at_once() {
        let mut center = AlertCenter::new();
        let id = center.push(t0(), "x", AlertOptions::flash(AlertKind::Info, None));
        assert_eq!(center.tick(t0() + ms(60_000)), vec![id]);
    }

    #[test]
    fn test_transient_error() {
        let mut center = AlertCenter::new();
        let id = center.push(t0(), "Upload failed", AlertOptions::transient_error());
        assert!(center.tick(t0() + ms(4999)).is_empty());
        assert_eq!(center.tick(t0() + ms(5000)), vec![id]);
    }

    #[test]
    fn test_render_escapes() {
        let mut center = AlertCenter::new();
        center.push(t0(), "<b>hi</b>", AlertOptions { kind: AlertKind::Error, ..AlertOptions::default() });
        let html = center.render();
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("alert-error"));
        assert!(html.contains("fa-exclamation-triangle"));
        assert!(html.contains("Close alert"));
    }
}
