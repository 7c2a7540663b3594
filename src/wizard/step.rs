use std::collections::BTreeMap;

use serde_json::Value;

use crate::collaborators::{OptionItem, OptionsKind};
use crate::errors::{CollaboratorError, FieldError};
use crate::scheduling::{Booking, ConflictQuery};

use super::draft::WizardDraft;
use super::form::FieldDescriptor;
use super::notifications::NotificationLevel;

/// A user-facing message a step wants raised while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub level: NotificationLevel,
    pub key: &'static str,
}

impl Notice {
    pub fn warning(key: &'static str) -> Self {
        Self {
            level: NotificationLevel::Warning,
            key,
        }
    }

    pub fn error(key: &'static str) -> Self {
        Self {
            level: NotificationLevel::Error,
            key,
        }
    }
}

/// Per-step contract consumed by the wizard controller.
///
/// Only `draft`, `is_valid` and `reset` are mandatory. The remaining hooks
/// cover optional capabilities: editable fields, entry-time reloads,
/// suggestions, asynchronous option lists and scheduling conflict checks.
pub trait StepState: Send {
    /// The step's current draft, as it appears in the snapshot and payload.
    fn draft(&self) -> Value;

    /// Whether the draft is currently valid. Must not mutate state; the
    /// snapshot gives read access to other steps.
    fn is_valid(&self, snapshot: &WizardDraft) -> bool;

    /// Return the draft to its initial value.
    fn reset(&mut self);

    /// Called every time the controller moves onto this step.
    fn reload(&mut self, _snapshot: &WizardDraft) {}

    fn fields(&self) -> Vec<FieldDescriptor> {
        Vec::new()
    }

    fn set_field(&mut self, field: &str, _value: Value) -> Result<(), FieldError> {
        Err(FieldError::new(format!("`{field}` is not editable here")))
    }

    /// Prefill values keyed by field name.
    fn suggestions(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Human-readable lines, used by review steps and front ends.
    fn describe(&self) -> Vec<String> {
        Vec::new()
    }

    fn notices(&self, _snapshot: &WizardDraft) -> Vec<Notice> {
        Vec::new()
    }

    /// Option list this step needs fetched once per session.
    fn options_request(&self) -> Option<OptionsKind> {
        None
    }

    fn apply_options(&mut self, _result: Result<Vec<OptionItem>, CollaboratorError>) {}

    /// Query to send to the conflict checker, once the schedule is complete.
    fn conflict_query(&self) -> Option<ConflictQuery> {
        None
    }

    /// A conflict check for the current values has been dispatched.
    fn conflicts_pending(&mut self) {}

    fn apply_conflicts(&mut self, _result: Result<Vec<Booking>, CollaboratorError>) {}
}
