//! Ticket form application service
//!
//! Owns the form and its components and runs the use cases: live validation,
//! file selection, step navigation, preview, draft persistence and
//! submission. Events collected from the components are published on the
//! [`EventBus`] after every command.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::events::{EventBus, SubscriptionId};
use crate::application::persistence::PersistenceHelper;
use crate::config::FormConfig;
use crate::domain::aggregates::{
    AdmissionReport, ErrorMap, FileUploadTracker, Form, ProgressView, StepNavigator,
    StepTransition, ValidationEngine,
};
use crate::domain::events::{DomainEvent, EventEnvelope, FormEvent};
use crate::domain::services::PreviewRenderer;
use crate::domain::value_objects::{
    ComponentKind, ComponentRef, FieldName, FileCandidate, FileId, FileMeta, InstanceId,
    RuleRegistry,
};
use crate::enhancements::{AlertCenter, AlertId, AlertOptions, ElementId, PreviewModal};
use crate::error::Result;
use crate::ports::outbound::{
    Clock, Confirmer, DraftStore, PreviewUrlAllocator, Submission, SubmissionReceipt, SubmitError,
    TicketSubmitter,
};

pub const SUBMIT_LABEL: &str = "Submit Ticket";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const RESET_CONFIRM_MESSAGE: &str =
    "Are you sure you want to reset the form? All changes will be lost.";
const DRAFT_NOTICE_SECS: i64 = 10;

/// Adapters the application runs against
#[derive(Clone)]
pub struct AppServices {
    pub clock: Arc<dyn Clock>,
    pub store: Arc<dyn DraftStore>,
    pub previews: Arc<dyn PreviewUrlAllocator>,
    pub submitter: Arc<dyn TicketSubmitter>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitState {
    #[default]
    Editing,
    Submitting,
    Submitted,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; `first_invalid` is the field to focus
    Invalid { errors: ErrorMap, first_invalid: Option<FieldName> },
    AlreadySubmitting,
    Submitted(SubmissionReceipt),
    Failed(SubmitError),
}

pub struct TicketFormApp {
    instance: InstanceId,
    form: Form,
    validator: ValidationEngine,
    tracker: FileUploadTracker,
    navigator: StepNavigator,
    persistence: PersistenceHelper,
    bus: EventBus,
    alerts: AlertCenter,
    modal: PreviewModal,
    state: SubmitState,
    events: Vec<DomainEvent>,
    clock: Arc<dyn Clock>,
    submitter: Arc<dyn TicketSubmitter>,
}

impl TicketFormApp {
    /// Build the form from configuration and restore a fresh draft if one exists
    pub fn new(config: &FormConfig, registry: &RuleRegistry, services: AppServices) -> Result<Self> {
        config.validate()?;
        let form = Form::from_config(config, registry)?;
        let navigator = StepNavigator::new(config.steps.total)?;

        let mut app = Self {
            instance: InstanceId::new(),
            form,
            validator: ValidationEngine::new(),
            tracker: FileUploadTracker::new(config.upload.clone(), services.previews),
            navigator,
            persistence: PersistenceHelper::new(config.persistence.clone(), services.store),
            bus: EventBus::new(),
            alerts: AlertCenter::new(),
            modal: PreviewModal::new(),
            state: SubmitState::Editing,
            events: Vec::new(),
            clock: services.clock,
            submitter: services.submitter,
        };

        let now = app.clock.now();
        if app
            .persistence
            .load_and_restore(now, &mut app.form, &mut app.navigator)
            .is_some()
        {
            app.alerts.push(
                now,
                "Draft restored",
                AlertOptions::notice(Duration::seconds(DRAFT_NOTICE_SECS)),
            );
        }
        app.persistence.mark_clean(&app.form);
        // Nobody can have subscribed yet
        app.collect_events();

        info!(form = %app.form.id(), fields = app.form.fields().len(), "Ticket form ready");
        Ok(app)
    }

    pub fn component(&self) -> ComponentRef {
        ComponentRef::new(ComponentKind::Form, self.instance)
    }

    // =========================================================================
    // Observers
    // =========================================================================

    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: Fn(&EventEnvelope) + Send + Sync + 'static,
    {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // =========================================================================
    // Field interaction
    // =========================================================================

    /// Input event: store the value, re-check a field already shown as
    /// invalid, and restart the draft debounce
    pub fn handle_input(&mut self, name: &str, value: &str) -> Result<()> {
        self.form.set_value(name, value)?;
        let already_invalid = self
            .form
            .field(name)
            .map_or(false, |f| f.annotation().invalid);
        if already_invalid {
            self.validator.validate_field(&mut self.form, name)?;
        }
        self.persistence.on_input(self.clock.now());
        Ok(())
    }

    /// Blur event: always validate the field
    pub fn handle_blur(&mut self, name: &str) -> Result<bool> {
        let valid = self.validator.validate_field(&mut self.form, name)?;
        self.publish_pending();
        Ok(valid)
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Run the admission policy over a selection or drop. Rejections raise a
    /// transient error alert.
    pub fn add_files(&mut self, candidates: Vec<FileCandidate>) -> AdmissionReport {
        let report = self.tracker.add_files(candidates);
        if let Some(message) = report.notification() {
            self.alerts.push(self.clock.now(), message, AlertOptions::transient_error());
        }
        self.sync_files();
        self.publish_pending();
        report
    }

    pub fn remove_file(&mut self, id: &FileId) -> Option<FileMeta> {
        let removed = self.tracker.remove_file(id);
        if removed.is_some() {
            self.sync_files();
            self.publish_pending();
        }
        removed
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// Advance when the current step's required fields are filled; a blocked
    /// advance marks the missing fields invalid
    pub fn next_step(&mut self) -> StepTransition {
        let transition = self.navigator.next(&self.form);
        if let StepTransition::Blocked { missing } = &transition {
            for name in missing {
                if let Err(e) = self.validator.validate_field(&mut self.form, name.as_str()) {
                    warn!(error = %e, "Could not validate blocking field");
                }
            }
        }
        self.publish_pending();
        transition
    }

    pub fn prev_step(&mut self) -> StepTransition {
        let transition = self.navigator.prev();
        self.publish_pending();
        transition
    }

    pub fn go_to_step(&mut self, step: u32) -> StepTransition {
        let transition = self.navigator.go_to(step);
        self.publish_pending();
        transition
    }

    pub fn progress(&self) -> ProgressView {
        self.navigator.progress()
    }

    // =========================================================================
    // Preview
    // =========================================================================

    /// Render the preview into the modal and open it
    pub fn preview(&mut self, trigger: Option<ElementId>) -> &str {
        let html = PreviewRenderer::render(&self.form, &self.tracker.metas());
        self.modal.open(html, trigger);
        self.modal.content().unwrap_or_default()
    }

    /// Close the modal; returns the element that should regain focus
    pub fn close_preview(&mut self) -> Option<ElementId> {
        self.modal.close()
    }

    pub fn handle_key(&mut self, key: &str) -> Option<ElementId> {
        self.modal.handle_key(key)
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Validate and hand the ticket to the submitter
    pub async fn submit(&mut self) -> SubmitOutcome {
        let submission = match self.begin_submit() {
            Ok(submission) => submission,
            Err(outcome) => return outcome,
        };
        let result = self.submitter.submit(&submission).await;
        self.finish_submit(result)
    }

    /// Validation and the switch to the submitting state. A second call while
    /// a submission is in flight is ignored.
    pub fn begin_submit(&mut self) -> std::result::Result<Submission, SubmitOutcome> {
        if self.state == SubmitState::Submitting {
            debug!("Submit ignored while submitting");
            return Err(SubmitOutcome::AlreadySubmitting);
        }

        let valid = self.validator.validate_form(&mut self.form);
        self.publish_pending();
        if !valid {
            return Err(SubmitOutcome::Invalid {
                errors: self.validator.errors().clone(),
                first_invalid: self.form.first_invalid_field().cloned(),
            });
        }

        self.state = SubmitState::Submitting;
        Ok(Submission {
            form_id: self.form.id().to_string(),
            data: self.form.serialize(),
            files: self.tracker.metas(),
        })
    }

    /// Apply the submitter's answer
    pub fn finish_submit(&mut self, result: std::result::Result<SubmissionReceipt, SubmitError>) -> SubmitOutcome {
        match result {
            Ok(receipt) => {
                self.state = SubmitState::Submitted;
                self.persistence.clear();
                self.persistence.mark_clean(&self.form);
                info!(ticket = %receipt.ticket_id, "Ticket submitted successfully");
                self.events.push(DomainEvent::Form(FormEvent::Submitted { receipt: receipt.clone() }));
                self.publish_pending();
                SubmitOutcome::Submitted(receipt)
            }
            Err(e) => {
                self.state = SubmitState::Editing;
                warn!(error = %e, "Ticket submission failed");
                self.alerts.push(
                    self.clock.now(),
                    format!("Could not submit ticket: {}", e),
                    AlertOptions::transient_error(),
                );
                SubmitOutcome::Failed(e)
            }
        }
    }

    pub fn submit_state(&self) -> SubmitState {
        self.state
    }

    pub fn is_submit_disabled(&self) -> bool {
        self.state == SubmitState::Submitting
    }

    pub fn submit_label(&self) -> &'static str {
        match self.state {
            SubmitState::Submitting => SUBMITTING_LABEL,
            _ => SUBMIT_LABEL,
        }
    }

    /// Markup replacing the form once the ticket is in
    pub fn success_html(&self) -> Option<&'static str> {
        (self.state == SubmitState::Submitted).then_some(concat!(
            r#"<div class="success-message"><div class="success-icon">✅</div>"#,
            r#"<div class="success-content"><h3>Ticket Submitted Successfully!</h3>"#,
            "<p>Your support ticket has been submitted. You'll receive a confirmation email shortly.</p>",
            "</div></div>"
        ))
    }

    // =========================================================================
    // Timers and lifecycle
    // =========================================================================

    /// Fire due deadlines: draft save and alert hiding
    pub fn tick(&mut self) -> Vec<AlertId> {
        let now = self.clock.now();
        self.persistence.poll(now, &self.form, self.navigator.current());
        self.alerts.tick(now)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        [self.persistence.deadline(), self.alerts.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    /// Reset after confirmation: defaults, no files, no draft, first step
    pub fn reset(&mut self, confirmer: &dyn Confirmer) -> bool {
        if !confirmer.confirm(RESET_CONFIRM_MESSAGE) {
            return false;
        }
        self.form.reset();
        self.validator.clear_errors(&mut self.form);
        self.tracker.clear();
        self.navigator.go_to(1);
        self.persistence.clear();
        self.persistence.mark_clean(&self.form);
        self.state = SubmitState::Editing;
        self.events.push(DomainEvent::Form(FormEvent::Reset));
        self.publish_pending();
        true
    }

    /// Tear down: release previews and drop the draft
    pub fn destroy(&mut self) {
        self.tracker.clear();
        self.persistence.clear();
        self.modal.close();
        self.alerts.clear();
        self.publish_pending();
        debug!(form = %self.form.id(), "Ticket form destroyed");
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.persistence.has_unsaved_changes(&self.form)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn form(&self) -> &Form { &self.form }
    pub fn errors(&self) -> &ErrorMap { self.validator.errors() }
    pub fn tracker(&self) -> &FileUploadTracker { &self.tracker }
    pub fn navigator(&self) -> &StepNavigator { &self.navigator }
    pub fn alerts(&self) -> &AlertCenter { &self.alerts }
    pub fn modal(&self) -> &PreviewModal { &self.modal }

    fn sync_files(&mut self) {
        let metas = self.tracker.metas();
        let name = self.form.file_field().map(|f| f.name().to_string());
        if let Some(field) = name.and_then(|n| self.form.field_mut(&n)) {
            field.set_files(metas);
        }
    }

    fn collect_events(&mut self) -> Vec<EventEnvelope> {
        let now = self.clock.now();
        let mut envelopes = Vec::new();
        let sources = [
            (self.validator.component(), self.validator.take_events()),
            (self.tracker.component(), self.tracker.take_events()),
            (self.navigator.component(), self.navigator.take_events()),
            (self.persistence.component(), self.persistence.take_events()),
            (self.component(), std::mem::take(&mut self.events)),
        ];
        for (source, events) in sources {
            envelopes.extend(events.into_iter().map(|e| EventEnvelope::new(source, e, now)));
        }
        envelopes
    }

    fn publish_pending(&mut self) {
        for envelope in self.collect_events() {
            self.bus.publish(&envelope);
        }
    }
}

impl std::fmt::Debug for TicketFormApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketFormApp")
            .field("form", &self.form.id())
            .field("step", &self.navigator.current())
            .field("files", &self.tracker.len())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{InMemoryDraftStore, ManualClock, ObjectUrlRegistry, SimulatedSubmitter};
    use chrono::TimeZone;
    use parking_lot::Mutex;

    struct Answer(bool);

    impl Confirmer for Answer {
        fn confirm(&self, _message: &str) -> bool {
            self.0
        }
    }

    struct Harness {
        clock: Arc<ManualClock>,
        store: Arc<InMemoryDraftStore>,
        previews: Arc<ObjectUrlRegistry>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())),
                store: Arc::new(InMemoryDraftStore::new()),
                previews: Arc::new(ObjectUrlRegistry::new()),
            }
        }

        fn app(&self) -> TicketFormApp {
            let services = AppServices {
                clock: self.clock.clone(),
                store: self.store.clone(),
                previews: self.previews.clone(),
                submitter: Arc::new(SimulatedSubmitter::default()),
            };
            TicketFormApp::new(&FormConfig::ticket_form(), &RuleRegistry::new(), services).unwrap()
        }
    }

    fn fill(app: &mut TicketFormApp) {
        app.handle_input("title", "Printer on fire").unwrap();
        app.handle_input("category", "problem").unwrap();
        app.handle_input("description", "Smoke coming out of tray 2").unwrap();
        app.handle_input("email", "ops@example.com").unwrap();
    }

    fn recorder(app: &mut TicketFormApp) -> Arc<Mutex<Vec<&'static str>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        app.subscribe(move |envelope| sink.lock().push(envelope.event.name()));
        seen
    }

    #[test]
    fn test_live_validation_only_after_invalid() {
        let harness = Harness::new();
        let mut app = harness.app();

        app.handle_input("title", "abc").unwrap();
        assert!(app.errors().is_empty());

        assert!(!app.handle_blur("title").unwrap());
        assert_eq!(app.errors()["title"], vec!["Title must be at least 5 characters"]);

        app.handle_input("title", "Printer on fire").unwrap();
        assert!(app.errors().is_empty());
        assert!(!app.form().field("title").unwrap().annotation().invalid);

        assert!(app.handle_input("nope", "x").is_err());
    }

    #[test]
    fn test_blocked_step_marks_missing_fields() {
        let harness = Harness::new();
        let mut app = harness.app();
        let seen = recorder(&mut app);

        match app.next_step() {
            StepTransition::Blocked { missing } => {
                assert_eq!(missing, vec![FieldName::new("title"), FieldName::new("category")]);
            }
            other => panic!("unexpected transition {:?}", other),
        }
        assert!(app.form().field("title").unwrap().annotation().invalid);

        fill(&mut app);
        assert_eq!(app.next_step(), StepTransition::Moved { from: 1, to: 2 });
        assert_eq!(app.progress().current, 2);
        assert_eq!(*seen.lock(), vec!["step:changed"]);
    }

    #[test]
    fn test_rejected_files_raise_alert() {
        let harness = Harness::new();
        let mut app = harness.app();

        let report = app.add_files(vec![
            FileCandidate::new("log.txt", 100, "text/plain"),
            FileCandidate::new("virus.exe", 100, "application/x-msdownload"),
        ]);
        assert_eq!(report.accepted.len(), 1);
        assert_eq!(app.alerts().alerts().len(), 1);
        assert!(app.alerts().alerts()[0].message().contains("virus.exe: File type not allowed"));
        assert_eq!(app.form().field("attachments").unwrap().files().len(), 1);
        assert_eq!(harness.previews.live_count(), 1);

        let id = report.accepted[0].clone();
        assert!(app.remove_file(&id).is_some());
        assert!(app.form().field("attachments").unwrap().files().is_empty());
        assert_eq!(harness.previews.live_count(), 0);

        harness.clock.advance(Duration::seconds(5));
        assert_eq!(app.tick().len(), 1);
    }

    #[test]
    fn test_draft_saved_and_restored() {
        let harness = Harness::new();
        {
            let mut app = harness.app();
            fill(&mut app);
            app.next_step();
            assert!(app.has_unsaved_changes());
            harness.clock.advance(Duration::milliseconds(1000));
            app.tick();
            assert!(!app.has_unsaved_changes());
        }

        harness.clock.advance(Duration::hours(1));
        let app = harness.app();
        assert_eq!(app.navigator().current(), 2);
        assert_eq!(app.form().field("title").unwrap().text_value(), "Printer on fire");
        assert_eq!(app.alerts().alerts()[0].message(), "Draft restored");
        assert!(!app.has_unsaved_changes());
    }

    #[test]
    fn test_preview_modal() {
        let harness = Harness::new();
        let mut app = harness.app();
        app.handle_input("title", "<b>bold</b>").unwrap();

        let html = app.preview(Some("preview-btn".into())).to_string();
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(app.modal().is_open());
        assert_eq!(app.handle_key("Enter"), None);
        assert_eq!(app.handle_key("Escape"), Some(ElementId::new("preview-btn")));
        assert!(!app.modal().is_open());
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let harness = Harness::new();
        let mut app = harness.app();
        fill(&mut app);
        app.add_files(vec![FileCandidate::new("a.pdf", 10, "application/pdf")]);
        let seen = recorder(&mut app);

        assert!(!app.reset(&Answer(false)));
        assert_eq!(app.form().field("title").unwrap().text_value(), "Printer on fire");

        assert!(app.reset(&Answer(true)));
        assert_eq!(app.form().field("title").unwrap().text_value(), "");
        assert_eq!(app.form().field("priority").unwrap().text_value(), "normal");
        assert!(app.tracker().is_empty());
        assert_eq!(harness.previews.live_count(), 0);
        assert!(harness.store.is_empty());
        assert_eq!(*seen.lock(), vec!["files:cleared", "draft:cleared", "form:reset"]);
    }

    #[tokio::test]
    async fn test_invalid_submit_reports_first_field() {
        let harness = Harness::new();
        let mut app = harness.app();
        app.handle_input("email", "not-an-email").unwrap();

        match app.submit().await {
            SubmitOutcome::Invalid { errors, first_invalid } => {
                assert_eq!(first_invalid, Some(FieldName::new("title")));
                assert_eq!(errors["email"], vec!["Please enter a valid email address"]);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(app.submit_state(), SubmitState::Editing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_flow() {
        let harness = Harness::new();
        let mut app = harness.app();
        fill(&mut app);
        harness.clock.advance(Duration::seconds(2));
        app.tick();
        assert!(!harness.store.is_empty());
        let seen = recorder(&mut app);

        let outcome = app.submit().await;
        let receipt = match outcome {
            SubmitOutcome::Submitted(receipt) => receipt,
            other => panic!("unexpected outcome {:?}", other),
        };
        assert!(receipt.ticket_id.starts_with("TKT-"));
        assert_eq!(app.submit_state(), SubmitState::Submitted);
        assert_eq!(app.submit_label(), SUBMIT_LABEL);
        assert!(app.success_html().unwrap().contains("Ticket Submitted Successfully!"));
        assert!(harness.store.is_empty());
        assert_eq!(
            *seen.lock(),
            vec!["validation:passed", "draft:cleared", "form:submitted"]
        );
    }

    #[test]
    fn test_second_submit_is_ignored() {
        let harness = Harness::new();
        let mut app = harness.app();
        fill(&mut app);

        let submission = app.begin_submit().unwrap();
        assert_eq!(submission.form_id, "ticket-form");
        assert!(app.is_submit_disabled());
        assert_eq!(app.submit_label(), SUBMITTING_LABEL);
        assert_eq!(app.begin_submit().unwrap_err(), SubmitOutcome::AlreadySubmitting);

        let outcome = app.finish_submit(Err(SubmitError::Transport("offline".into())));
        assert!(matches!(outcome, SubmitOutcome::Failed(_)));
        assert!(!app.is_submit_disabled());
        assert_eq!(app.alerts().alerts().len(), 1);
    }

    #[test]
    fn test_destroy_releases_everything() {
        let harness = Harness::new();
        let mut app = harness.app();
        fill(&mut app);
        app.add_files(vec![FileCandidate::new("a.png", 10, "image/png")]);
        harness.clock.advance(Duration::seconds(1));
        app.tick();

        app.destroy();
        assert_eq!(harness.previews.live_count(), 0);
        assert!(harness.store.is_empty());
        assert!(app.next_deadline().is_none());
    }
}
