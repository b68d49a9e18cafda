//! Step Navigator Aggregate
//!
//! Current step within `[1, total]`. Moving forward is gated on the current
//! section's required fields; moving back and jumping are not.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::aggregates::form::Form;
use crate::domain::events::{DomainEvent, StepEvent};
use crate::domain::value_objects::{ComponentKind, ComponentRef, FieldName, InstanceId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigatorError {
    #[error("a form needs at least one step")]
    NoSteps,
}

/// Result of a navigation request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepTransition {
    Moved { from: u32, to: u32 },
    /// Required fields of the current step are empty
    Blocked { missing: Vec<FieldName> },
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    Completed,
    Active,
    Pending,
}

/// Visibility of the navigation buttons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct NavControls {
    pub prev_visible: bool,
    pub next_visible: bool,
    pub submit_visible: bool,
    pub preview_visible: bool,
}

/// Everything the progress indicator shows
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressView {
    pub current: u32,
    pub total: u32,
    /// `(current - 1) / (total - 1)`, 0 for a single-step form
    pub fraction: f64,
    pub steps: Vec<StepState>,
    pub controls: NavControls,
}

impl ProgressView {
    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

#[derive(Debug)]
pub struct StepNavigator {
    instance: InstanceId,
    current: u32,
    total: u32,
    events: Vec<DomainEvent>,
}

impl StepNavigator {
    pub fn new(total: u32) -> Result<Self, NavigatorError> {
        if total == 0 {
            return Err(NavigatorError::NoSteps);
        }
        Ok(Self {
            instance: InstanceId::new(),
            current: 1,
            total,
            events: Vec::new(),
        })
    }

    pub fn component(&self) -> ComponentRef {
        ComponentRef::new(ComponentKind::Navigator, self.instance)
    }

    pub fn current(&self) -> u32 { self.current }
    pub fn total(&self) -> u32 { self.total }
    pub fn is_first(&self) -> bool { self.current == 1 }
    pub fn is_last(&self) -> bool { self.current == self.total }

    /// Required fields of a step whose trimmed value is empty
    pub fn required_missing(&self, form: &Form, step: u32) -> Vec<FieldName> {
        form.fields_in_section(step)
            .filter(|f| f.is_required())
            .filter(|f| {
                if f.is_file() {
                    f.files().is_empty()
                } else {
                    f.text_value().trim().is_empty()
                }
            })
            .map(|f| f.name().clone())
            .collect()
    }

    /// Advance one step if the current step's required fields are filled
    pub fn next(&mut self, form: &Form) -> StepTransition {
        if self.is_last() {
            return StepTransition::Unchanged;
        }
        let missing = self.required_missing(form, self.current);
        if !missing.is_empty() {
            debug!(step = self.current, missing = missing.len(), "Step advance blocked");
            return StepTransition::Blocked { missing };
        }
        self.move_to(self.current + 1)
    }

    pub fn prev(&mut self) -> StepTransition {
        if self.is_first() {
            return StepTransition::Unchanged;
        }
        self.move_to(self.current - 1)
    }

    /// Unchecked jump, clamped to `[1, total]`
    pub fn go_to(&mut self, step: u32) -> StepTransition {
        self.move_to(step.clamp(1, self.total))
    }

    pub fn progress(&self) -> ProgressView {
        let fraction = if self.total > 1 {
            f64::from(self.current - 1) / f64::from(self.total - 1)
        } else {
            0.0
        };
        let steps = (1..=self.total)
            .map(|step| match step.cmp(&self.current) {
                std::cmp::Ordering::Less => StepState::Completed,
                std::cmp::Ordering::Equal => StepState::Active,
                std::cmp::Ordering::Greater => StepState::Pending,
            })
            .collect();

        ProgressView {
            current: self.current,
            total: self.total,
            fraction,
            steps,
            controls: NavControls {
                prev_visible: !self.is_first(),
                next_visible: !self.is_last(),
                submit_visible: self.is_last(),
                preview_visible: self.is_last(),
            },
        }
    }

    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    fn move_to(&mut self, to: u32) -> StepTransition {
        let from = self.current;
        if to == from {
            return StepTransition::Unchanged;
        }
        self.current = to;
        debug!(from, to, "Step changed");
        self.events.push(DomainEvent::Step(StepEvent::Changed { from, to }));
        StepTransition::Moved { from, to }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::form::Field;
    use crate::domain::value_objects::FieldKind;
    use proptest::prelude::*;

    fn form() -> Form {
        let mut form = Form::new("steps");
        form.add_field(Field::new("title", FieldKind::Text).required());
        form.add_field(Field::new("notes", FieldKind::Text));
        form.add_field(Field::new("description", FieldKind::TextArea).required().in_section(2));
        form
    }

    #[test]
    fn test_zero_steps_rejected() {
        assert_eq!(StepNavigator::new(0).unwrap_err(), NavigatorError::NoSteps);
    }

    #[test]
    fn test_next_is_gated() {
        let mut form = form();
        let mut nav = StepNavigator::new(3).unwrap();

        assert_eq!(
            nav.next(&form),
            StepTransition::Blocked { missing: vec![FieldName::new("title")] }
        );
        assert_eq!(nav.current(), 1);

        form.set_value("title", "  ").unwrap();
        assert!(matches!(nav.next(&form), StepTransition::Blocked { .. }));

        form.set_value("title", "Printer").unwrap();
        assert_eq!(nav.next(&form), StepTransition::Moved { from: 1, to: 2 });
    }

    #[test]
    fn test_boundaries_are_noops() {
        let form = form();
        let mut nav = StepNavigator::new(3).unwrap();
        assert_eq!(nav.prev(), StepTransition::Unchanged);

        nav.go_to(3);
        assert_eq!(nav.next(&form), StepTransition::Unchanged);
        assert_eq!(nav.current(), 3);
    }

    #[test]
    fn test_prev_not_gated() {
        let mut nav = StepNavigator::new(3).unwrap();
        nav.go_to(2);
        assert_eq!(nav.prev(), StepTransition::Moved { from: 2, to: 1 });
    }

    #[test]
    fn test_progress_view() {
        let mut nav = StepNavigator::new(3).unwrap();
        let view = nav.progress();
        assert_eq!(view.fraction, 0.0);
        assert_eq!(view.steps, vec![StepState::Active, StepState::Pending, StepState::Pending]);
        assert!(!view.controls.prev_visible);
        assert!(view.controls.next_visible);
        assert!(!view.controls.submit_visible);

        nav.go_to(2);
        assert_eq!(nav.progress().percent(), 50.0);

        nav.go_to(3);
        let view = nav.progress();
        assert_eq!(view.fraction, 1.0);
        assert_eq!(view.steps[0], StepState::Completed);
        assert!(view.controls.prev_visible);
        assert!(!view.controls.next_visible);
        assert!(view.controls.submit_visible);
        assert!(view.controls.preview_visible);
    }

    #[test]
    fn test_single_step_form() {
        let nav = StepNavigator::new(1).unwrap();
        let view = nav.progress();
        assert_eq!(view.fraction, 0.0);
        assert!(view.controls.submit_visible);
        assert!(!view.controls.prev_visible);
    }

    #[test]
    fn test_events_only_on_change() {
        let mut nav = StepNavigator::new(3).unwrap();
        nav.prev();
        nav.go_to(1);
        nav.go_to(3);
        assert_eq!(
            nav.take_events(),
            vec![DomainEvent::Step(StepEvent::Changed { from: 1, to: 3 })]
        );
    }

    proptest! {
        #[test]
        fn prop_go_to_clamps(total in 1u32..10, target in 0u32..50) {
            let mut nav = StepNavigator::new(total).unwrap();
            nav.go_to(target);
            prop_assert!(nav.current() >= 1 && nav.current() <= total);
            prop_assert_eq!(nav.current(), target.clamp(1, total));
        }
    }
}
