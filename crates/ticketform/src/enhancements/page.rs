//! Page enhancements
//!
//! Installs the site-wide affordances from element attributes and routes page
//! events to them. Every installed handler is recorded in a
//! [`ListenerRegistry`] so teardown removes exactly what was attached.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use super::alerts::{AlertCenter, AlertId, AlertKind, AlertOptions};
use super::clipboard::CopyButton;
use super::confirm::ConfirmGate;
use super::counter::{CharacterCounter, CounterView};
use super::dropdown::DropdownGroup;
use super::listeners::{ElementId, ListenerRegistry};
use super::submit_guard::SubmitGuard;
use super::table_filter::TableFilter;
use crate::ports::outbound::{Clipboard, Confirmer};

/// What the enhancer sees of one element
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageElement {
    pub id: ElementId,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    /// Body row texts, for tables
    pub rows: Vec<String>,
}

impl PageElement {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: ElementId::new(id), ..Self::default() }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn rows<I, S>(mut self, rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows = rows.into_iter().map(Into::into).collect();
        self
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }
}

/// Events routed to the enhancements
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageEvent {
    Click(ElementId),
    Input { target: ElementId, value: String },
    Submit(ElementId),
    /// Click that reached the document without being stopped
    DocumentClick,
    Keydown(String),
}

/// Result of routing one event to one handler
#[derive(Clone, Debug, PartialEq)]
pub enum PageOutcome {
    /// Default action cancelled (declined confirm, guarded submit)
    Prevented,
    Confirmed,
    AlertDismissed(AlertId),
    Filtered { table: ElementId, visible: usize, no_results: bool },
    DropdownToggled { menu: ElementId, open: bool },
    DropdownsClosed { focus: Option<ElementId> },
    Copied { success: bool },
    SubmitDisabled,
    Counter(CounterView),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Handler {
    Confirm(ConfirmGate),
    Dismiss(AlertId),
    Filter(ElementId),
    Dropdown(ElementId),
    Copy,
    Guard,
    Count(CharacterCounter),
}

#[derive(Debug, Default)]
pub struct PageEnhancements {
    listeners: ListenerRegistry<Handler>,
    alerts: AlertCenter,
    tables: HashMap<ElementId, TableFilter>,
    dropdowns: DropdownGroup,
    copy_buttons: HashMap<ElementId, CopyButton>,
    guards: HashMap<ElementId, SubmitGuard>,
    document_handlers: usize,
}

impl PageEnhancements {
    /// Attach to every element carrying an enhancement attribute
    pub fn install(now: DateTime<Utc>, elements: &[PageElement]) -> Self {
        let mut page = Self::default();
        let by_id: HashMap<&ElementId, &PageElement> = elements.iter().map(|e| (&e.id, e)).collect();

        for element in elements {
            let id = element.id.clone();

            if element.has("data-confirm") {
                let gate = ConfirmGate::from_attribute(element.get("data-confirm"));
                page.listeners.attach(id.clone(), "click", Handler::Confirm(gate));
            }

            if element.has("data-dismissible") || element.has("data-auto-hide") {
                let mut options = match element.get("data-auto-hide") {
                    Some(delay) => AlertOptions::flash(alert_kind(element), Some(delay)),
                    None => AlertOptions { kind: alert_kind(element), ..AlertOptions::default() },
                };
                options.dismissible = element.has("data-dismissible");
                let alert = page.alerts.push(now, element.text.clone(), options);
                if element.has("data-dismissible") {
                    page.listeners.attach(id.clone(), "click", Handler::Dismiss(alert));
                }
            }

            if let Some(table_id) = element.get("data-filter-table") {
                let table_id = ElementId::new(table_id);
                if let Some(table) = by_id.get(&table_id) {
                    page.tables.insert(table_id.clone(), TableFilter::new(table.rows.clone()));
                    page.listeners.attach(id.clone(), "input", Handler::Filter(table_id));
                }
            }

            if let Some(menu_id) = element.get("data-dropdown-toggle") {
                let menu_id = ElementId::new(menu_id);
                if by_id.contains_key(&menu_id) {
                    page.dropdowns.register(id.clone(), menu_id.clone());
                    page.listeners.attach(id.clone(), "click", Handler::Dropdown(menu_id));
                }
            }

            if let Some(text) = element.get("data-copy") {
                page.copy_buttons.insert(id.clone(), CopyButton::new(text, element.text.clone()));
                page.listeners.attach(id.clone(), "click", Handler::Copy);
            }

            if element.get("type") == Some("submit") {
                page.guards.insert(id.clone(), SubmitGuard::new(element.text.clone()));
                page.listeners.attach(id.clone(), "submit", Handler::Guard);
            }

            if let Some(max) = element.get("data-max-length").and_then(|v| v.parse().ok()) {
                page.listeners.attach(id.clone(), "input", Handler::Count(CharacterCounter::new(max)));
            }
        }

        if !page.dropdowns.is_empty() {
            // outside click and Escape
            page.document_handlers = 2;
        }
        debug!(listeners = page.listeners.len(), alerts = page.alerts.alerts().len(), "Page enhanced");
        page
    }

    /// Route an event to the handlers attached for it
    pub fn dispatch(
        &mut self,
        now: DateTime<Utc>,
        event: PageEvent,
        confirmer: &dyn Confirmer,
        clipboard: &dyn Clipboard,
    ) -> Vec<PageOutcome> {
        match event {
            // Document-level handlers only exist while dropdowns are installed
            PageEvent::DocumentClick | PageEvent::Keydown(_) if self.document_handlers == 0 => {
                Vec::new()
            }
            PageEvent::DocumentClick => {
                if self.dropdowns.outside_click() {
                    vec![PageOutcome::DropdownsClosed { focus: None }]
                } else {
                    Vec::new()
                }
            }
            PageEvent::Keydown(key) if key == "Escape" => match self.dropdowns.escape() {
                Some(focus) => vec![PageOutcome::DropdownsClosed { focus: Some(focus) }],
                None => Vec::new(),
            },
            PageEvent::Keydown(_) => Vec::new(),
            PageEvent::Click(target) => self.run(now, &target, "click", "", confirmer, clipboard),
            PageEvent::Submit(target) => self.run(now, &target, "submit", "", confirmer, clipboard),
            PageEvent::Input { target, value } => {
                self.run(now, &target, "input", &value, confirmer, clipboard)
            }
        }
    }

    /// Advance timers: alert fades, copy feedback, submit re-enable
    pub fn tick(&mut self, now: DateTime<Utc>) -> Vec<AlertId> {
        for button in self.copy_buttons.values_mut() {
            button.tick(now);
        }
        for guard in self.guards.values_mut() {
            guard.tick(now);
        }
        self.alerts.tick(now)
    }

    /// Detach everything; returns how many handlers were removed
    pub fn teardown(&mut self) -> usize {
        let removed = self.listeners.clear() + self.document_handlers;
        self.document_handlers = 0;
        removed
    }

    /// Detach the handlers of one element
    pub fn detach(&mut self, element: &ElementId) -> usize {
        self.copy_buttons.remove(element);
        self.guards.remove(element);
        self.listeners.detach_all(element).len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len() + self.document_handlers
    }

    pub fn alerts(&self) -> &AlertCenter { &self.alerts }
    pub fn dropdowns(&self) -> &DropdownGroup { &self.dropdowns }
    pub fn table(&self, id: &ElementId) -> Option<&TableFilter> { self.tables.get(id) }
    pub fn copy_button(&self, id: &ElementId) -> Option<&CopyButton> { self.copy_buttons.get(id) }
    pub fn submit_guard(&self, id: &ElementId) -> Option<&SubmitGuard> { self.guards.get(id) }

    fn run(
        &mut self,
        now: DateTime<Utc>,
        target: &ElementId,
        event: &str,
        value: &str,
        confirmer: &dyn Confirmer,
        clipboard: &dyn Clipboard,
    ) -> Vec<PageOutcome> {
        let handlers: Vec<Handler> = self.listeners.handlers_for(target, event).cloned().collect();
        let mut outcomes = Vec::new();

        for handler in handlers {
            let outcome = match handler {
                Handler::Confirm(gate) => {
                    if gate.allow(confirmer) {
                        PageOutcome::Confirmed
                    } else {
                        outcomes.push(PageOutcome::Prevented);
                        break;
                    }
                }
                Handler::Dismiss(alert) => {
                    if !self.alerts.dismiss(alert, now) {
                        continue;
                    }
                    PageOutcome::AlertDismissed(alert)
                }
                Handler::Filter(table) => match self.tables.get_mut(&table) {
                    Some(filter) => {
                        let visible = filter.apply(value);
                        PageOutcome::Filtered { table, visible, no_results: visible == 0 }
                    }
                    None => continue,
                },
                Handler::Dropdown(menu) => {
                    let open = self.dropdowns.toggle(target);
                    PageOutcome::DropdownToggled { menu, open }
                }
                Handler::Copy => match self.copy_buttons.get_mut(target) {
                    Some(button) => PageOutcome::Copied { success: button.click(now, clipboard) },
                    None => continue,
                },
                Handler::Guard => match self.guards.get_mut(target) {
                    Some(guard) => {
                        if guard.on_submit(now) {
                            PageOutcome::SubmitDisabled
                        } else {
                            PageOutcome::Prevented
                        }
                    }
                    None => continue,
                },
                Handler::Count(counter) => PageOutcome::Counter(counter.view(value)),
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

fn alert_kind(element: &PageElement) -> AlertKind {
    match element.get("data-alert-type").or_else(|| element.get("data-kind")) {
        Some("success") => AlertKind::Success,
        Some("warning") => AlertKind::Warning,
        Some("error") | Some("danger") => AlertKind::Error,
        _ => AlertKind::Info,
    }
}
