//! Draft persistence
//!
//! Debounced save of the serialized form plus current step under a single
//! storage key, and restore on load while the draft is fresh. Storage
//! failures degrade the feature to a no-op; they are logged, never returned.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::domain::aggregates::{DraftSnapshot, Form, FormData, FormValue, StepNavigator};
use crate::domain::events::{DomainEvent, FormEvent};
use crate::domain::value_objects::{ComponentKind, ComponentRef, FieldKind, InstanceId};
use crate::ports::outbound::DraftStore;

pub struct PersistenceHelper {
    instance: InstanceId,
    config: PersistenceConfig,
    store: Arc<dyn DraftStore>,
    deadline: Option<DateTime<Utc>>,
    baseline: Option<FormData>,
    events: Vec<DomainEvent>,
}

impl PersistenceHelper {
    pub fn new(config: PersistenceConfig, store: Arc<dyn DraftStore>) -> Self {
        Self {
            instance: InstanceId::new(),
            config,
            store,
            deadline: None,
            baseline: None,
            events: Vec::new(),
        }
    }

    pub fn component(&self) -> ComponentRef {
        ComponentRef::new(ComponentKind::Persistence, self.instance)
    }

    pub fn storage_key(&self) -> &str {
        &self.config.storage_key
    }

    /// Record an input event; restarts the quiet period
    pub fn on_input(&mut self, now: DateTime<Utc>) {
        if self.config.enabled {
            self.deadline = Some(now + self.config.debounce());
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    /// Save if the quiet period has elapsed. Returns whether a save was attempted.
    pub fn poll(&mut self, now: DateTime<Utc>, form: &Form, step: u32) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.save(now, form, step);
                true
            }
            _ => false,
        }
    }

    /// Save a pending draft immediately
    pub fn flush(&mut self, now: DateTime<Utc>, form: &Form, step: u32) -> bool {
        if self.deadline.take().is_some() {
            self.save(now, form, step)
        } else {
            false
        }
    }

    /// Write the full snapshot, overwriting any previous one
    pub fn save(&mut self, now: DateTime<Utc>, form: &Form, step: u32) -> bool {
        if !self.config.enabled {
            return false;
        }
        let snapshot = DraftSnapshot::new(form.serialize(), step, now);
        let json = match snapshot.to_json() {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize draft");
                return false;
            }
        };

        match self.store.set(&self.config.storage_key, &json) {
            Ok(()) => {
                debug!(key = %self.config.storage_key, step, bytes = json.len(), "Draft saved");
                self.baseline = Some(snapshot.form_data);
                true
            }
            Err(e) => {
                warn!(error = %e, "Could not save draft");
                false
            }
        }
    }

    /// Read the stored draft if it is younger than the freshness window.
    /// Stale or unreadable drafts are removed.
    pub fn load(&self, now: DateTime<Utc>) -> Option<DraftSnapshot> {
        if !self.config.enabled {
            return None;
        }
        let json = match self.store.get(&self.config.storage_key) {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Could not read draft");
                return None;
            }
        };

        let snapshot = match DraftSnapshot::from_json(&json) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable draft");
                self.remove_key();
                return None;
            }
        };

        if !snapshot.is_fresh(now, self.config.freshness()) {
            debug!(saved_at = %snapshot.timestamp, "Discarding stale draft");
            self.remove_key();
            return None;
        }
        Some(snapshot)
    }

    /// Repopulate fields by name and jump to the saved step. Checkboxes are
    /// checked when their value was saved; file inputs are skipped.
    pub fn restore(&mut self, snapshot: &DraftSnapshot, form: &mut Form, navigator: &mut StepNavigator) {
        let mut seen: HashMap<String, usize> = HashMap::new();

        for field in form.fields_mut() {
            if field.is_file() {
                continue;
            }
            let name = field.name().to_string();
            let Some(value) = snapshot.form_data.get(&name) else {
                continue;
            };
            // Unchecked boxes are absent from the snapshot, so match by value
            if let FieldKind::Checkbox { value: own } = field.kind() {
                let checked = value.contains(own);
                field.set_checked(checked);
                continue;
            }
            let index = seen.entry(name).or_insert(0);
            let text = match value {
                FormValue::Single(v) if *index == 0 => Some(v.as_str()),
                FormValue::Multiple(vs) => vs.get(*index).map(String::as_str),
                _ => None,
            };
            *index += 1;
            if let Some(text) = text {
                field.set_text(text);
            }
        }

        navigator.go_to(snapshot.step);
        self.baseline = Some(snapshot.form_data.clone());
        info!(step = navigator.current(), "Draft restored");
        self.events.push(DomainEvent::Form(FormEvent::DraftRestored { step: navigator.current() }));
    }

    /// Load and restore in one step; returns the restored step
    pub fn load_and_restore(
        &mut self,
        now: DateTime<Utc>,
        form: &mut Form,
        navigator: &mut StepNavigator,
    ) -> Option<u32> {
        let snapshot = self.load(now)?;
        self.restore(&snapshot, form, navigator);
        Some(navigator.current())
    }

    /// Drop the stored draft and any pending save
    pub fn clear(&mut self) {
        self.deadline = None;
        self.remove_key();
        self.events.push(DomainEvent::Form(FormEvent::DraftCleared));
    }

    /// Take the current form state as the saved reference point
    pub fn mark_clean(&mut self, form: &Form) {
        self.baseline = Some(form.serialize());
    }

    pub fn has_unsaved_changes(&self, form: &Form) -> bool {
        self.is_pending() || self.baseline.as_ref().map_or(false, |saved| form.has_changes(saved))
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn remove_key(&self) {
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            warn!(error = %e, "Could not remove draft");
        }
    }
}

impl std::fmt::Debug for PersistenceHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceHelper")
            .field("key", &self.config.storage_key)
            .field("deadline", &self.deadline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::Field;
    use crate::infrastructure::InMemoryDraftStore;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    fn form() -> Form {
        let mut form = Form::new("ticket");
        form.add_field(Field::new("title", FieldKind::Text));
        form.add_field(Field::new("attachments", FieldKind::File));
        form
    }

    fn helper(store: Arc<InMemoryDraftStore>) -> PersistenceHelper {
        PersistenceHelper::new(PersistenceConfig::default(), store)
    }

    #[test]
    fn test_debounce_restarts() {
        let store = Arc::new(InMemoryDraftStore::new());
        let mut helper = helper(store.clone());
        let mut form = form();
        form.set_value("title", "Printer").unwrap();

        helper.on_input(t0());
        helper.on_input(t0() + Duration::milliseconds(800));
        assert!(!helper.poll(t0() + Duration::milliseconds(1000), &form, 1));
        assert!(store.is_empty());

        assert!(helper.poll(t0() + Duration::milliseconds(1800), &form, 1));
        assert!(!helper.is_pending());
        assert!(store.get("ticket-form-draft").unwrap().is_some());
    }

    #[test]
    fn test_restore_within_window() {
        let store = Arc::new(InMemoryDraftStore::new());
        let mut form = form();
        form.set_value("title", "Printer on fire").unwrap();
        helper(store.clone()).save(t0(), &form, 2);

        let mut fresh = self::form();
        let mut nav = StepNavigator::new(3).unwrap();
        let mut restorer = helper(store.clone());
        let step = restorer.load_and_restore(
            t0() + Duration::hours(23) + Duration::minutes(59),
            &mut fresh,
            &mut nav,
        );
        assert_eq!(step, Some(2));
        assert_eq!(fresh.field("title").unwrap().text_value(), "Printer on fire");
        assert_eq!(
            restorer.take_events(),
            vec![DomainEvent::Form(FormEvent::DraftRestored { step: 2 })]
        );
    }

    #[test]
    fn test_restore_checkbox_group() {
        let tags = || {
            let mut form = form();
            form.add_field(Field::new("tags", FieldKind::Checkbox { value: "a".into() }));
            form.add_field(Field::new("tags", FieldKind::Checkbox { value: "b".into() }));
            form.add_field(Field::new("tags", FieldKind::Checkbox { value: "c".into() }));
            form
        };
        let store = Arc::new(InMemoryDraftStore::new());
        let mut form = tags();
        form.fields_mut().nth(3).unwrap().set_checked(true);
        let saved = form.serialize();
        assert_eq!(saved.get("tags"), Some(&FormValue::Single("b".into())));
        helper(store.clone()).save(t0(), &form, 1);

        let mut fresh = tags();
        fresh.fields_mut().nth(2).unwrap().set_checked(true);
        let mut nav = StepNavigator::new(3).unwrap();
        assert!(helper(store.clone()).load_and_restore(t0(), &mut fresh, &mut nav).is_some());
        assert_eq!(fresh.serialize(), saved);

        form.fields_mut().nth(4).unwrap().set_checked(true);
        let saved = form.serialize();
        assert_eq!(saved.get("tags"), Some(&FormValue::Multiple(vec!["b".into(), "c".into()])));
        helper(store.clone()).save(t0(), &form, 1);
        let mut fresh = tags();
        helper(store.clone()).load_and_restore(t0(), &mut fresh, &mut nav);
        assert_eq!(fresh.serialize(), saved);
    }

    #[test]
    fn test_stale_draft_is_removed() {
        let store = Arc::new(InMemoryDraftStore::new());
        helper(store.clone()).save(t0(), &form(), 1);

        let loaded = helper(store.clone()).load(t0() + Duration::hours(24) + Duration::minutes(1));
        assert!(loaded.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_corrupt_draft_is_removed() {
        let store = Arc::new(InMemoryDraftStore::new());
        store.set("ticket-form-draft", "{oops").unwrap();
        assert!(helper(store.clone()).load(t0()).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let mut helper = PersistenceHelper::new(
            PersistenceConfig::default(),
            Arc::new(InMemoryDraftStore::disabled()),
        );
        assert!(!helper.save(t0(), &form(), 1));
        assert!(helper.load(t0()).is_none());
        helper.clear();

        let mut tiny = PersistenceHelper::new(
            PersistenceConfig::default(),
            Arc::new(InMemoryDraftStore::with_quota(8)),
        );
        assert!(!tiny.save(t0(), &form(), 1));
    }

    #[test]
    fn test_disabled_config() {
        let store = Arc::new(InMemoryDraftStore::new());
        let config = PersistenceConfig { enabled: false, ..PersistenceConfig::default() };
        let mut helper = PersistenceHelper::new(config, store.clone());
        helper.on_input(t0());
        assert!(!helper.is_pending());
        assert!(!helper.save(t0(), &form(), 1));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_and_unsaved_changes() {
        let store = Arc::new(InMemoryDraftStore::new());
        let mut helper = helper(store.clone());
        let mut form = form();
        helper.mark_clean(&form);
        assert!(!helper.has_unsaved_changes(&form));

        form.set_value("title", "x").unwrap();
        assert!(helper.has_unsaved_changes(&form));
        helper.on_input(t0());
        assert!(helper.flush(t0(), &form, 1));
        assert!(!helper.has_unsaved_changes(&form));

        helper.on_input(t0());
        helper.clear();
        assert!(!helper.is_pending());
        assert!(store.is_empty());
    }
}
