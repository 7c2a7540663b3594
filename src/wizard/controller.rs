use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::collaborators::{
    ConflictChecker, OptionItem, OptionsKind, OptionsProvider, SubmitReceipt, Submitter,
};
use crate::errors::{CollaboratorError, WizardError};
use crate::scheduling::{Booking, ConflictQuery};
use crate::validation::ValidationBridge;

use super::draft::WizardDraft;
use super::generation::{GenerationTracker, Ticket};
use super::notifications::{NotificationLevel, Notifications, STEP_CONTEXT, SUBMISSION_CONTEXT};
use super::registry::{StepDescriptor, StepRegistry};

/// Identity of a wizard flow: the resource it creates and the prefix of its
/// outcome notification keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardProfile {
    resource: String,
    notification_prefix: String,
}

impl WizardProfile {
    pub fn new(resource: impl Into<String>, notification_prefix: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            notification_prefix: notification_prefix.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn success_key(&self) -> String {
        format!("{}_ADDED", self.notification_prefix)
    }

    pub fn failure_key(&self) -> String {
        format!("{}_NOT_SAVED", self.notification_prefix)
    }

    pub fn conflict_key(&self) -> String {
        format!("{}_CONFLICT", self.notification_prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitTarget {
    Create,
    /// Edit mode: submission saves over an existing entity.
    Save(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    AtStep(usize),
    Submitting,
    Closed,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: usize, to: usize },
    /// The current step (or one before the target) is invalid.
    Blocked { at: usize },
    Unchanged { at: usize },
}

impl Transition {
    pub fn moved(&self) -> bool {
        matches!(self, Transition::Moved { .. })
    }

    /// Step index after the transition.
    pub fn position(&self) -> usize {
        match *self {
            Transition::Moved { to, .. } => to,
            Transition::Blocked { at } | Transition::Unchanged { at } => at,
        }
    }
}

/// What happened to an asynchronous response handed back to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    /// The wizard moved on since the request was issued; nothing changed.
    Stale,
}

/// Result of a field edit: the bridge rules the new value fails, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldStatus {
    pub field: String,
    pub failing: Vec<String>,
}

impl FieldStatus {
    pub fn is_valid(&self) -> bool {
        self.failing.is_empty()
    }
}

#[derive(Debug)]
pub struct ConflictRequest {
    ticket: Ticket,
    query: ConflictQuery,
}

impl ConflictRequest {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn query(&self) -> &ConflictQuery {
        &self.query
    }

    pub async fn run(self, checker: &dyn ConflictChecker) -> ConflictResponse {
        let result = checker.check(&self.query).await;
        self.resolve(result)
    }

    /// Pairs an externally obtained result with this request's ticket.
    pub fn resolve(self, result: Result<Vec<Booking>, CollaboratorError>) -> ConflictResponse {
        ConflictResponse {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct ConflictResponse {
    ticket: Ticket,
    result: Result<Vec<Booking>, CollaboratorError>,
}

impl ConflictResponse {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }
}

#[derive(Debug)]
pub struct OptionsRequest {
    ticket: Ticket,
    kind: OptionsKind,
}

impl OptionsRequest {
    pub fn kind(&self) -> OptionsKind {
        self.kind
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub async fn run(self, provider: &dyn OptionsProvider) -> OptionsResponse {
        let result = provider.fetch(self.kind).await;
        self.resolve(result)
    }

    pub fn resolve(self, result: Result<Vec<OptionItem>, CollaboratorError>) -> OptionsResponse {
        OptionsResponse {
            ticket: self.ticket,
            kind: self.kind,
            result,
        }
    }
}

#[derive(Debug)]
pub struct OptionsResponse {
    ticket: Ticket,
    kind: OptionsKind,
    result: Result<Vec<OptionItem>, CollaboratorError>,
}

/// Drives one wizard: navigation gated by step validity, cross-step
/// validation, ticketed asynchronous requests and the terminal submission.
#[derive(Debug)]
pub struct WizardController {
    profile: WizardProfile,
    registry: StepRegistry,
    bridge: ValidationBridge,
    state: WizardState,
    target: SubmitTarget,
    generations: GenerationTracker,
    notifications: Notifications,
}

impl WizardController {
    /// Builds the controller and opens its first session at step 0.
    pub fn new(
        profile: WizardProfile,
        registry: StepRegistry,
        bridge: ValidationBridge,
    ) -> Result<Self, WizardError> {
        if registry.is_empty() {
            return Err(WizardError::NoSteps(profile.resource.clone()));
        }
        if let Some(duplicate) = registry.first_duplicate() {
            return Err(WizardError::DuplicateStep(duplicate.to_string()));
        }

        let generations = GenerationTracker::new(registry.len());
        let mut controller = Self {
            profile,
            registry,
            bridge,
            state: WizardState::Closed,
            target: SubmitTarget::Create,
            generations,
            notifications: Notifications::new(),
        };
        controller.open();
        Ok(controller)
    }

    /// Starts a fresh session: every step reset, pointer at the first step,
    /// outstanding requests invalidated.
    pub fn open(&mut self) {
        let session = self.generations.begin_session();
        self.target = SubmitTarget::Create;
        self.registry.reset();
        self.notifications.clear();
        self.state = WizardState::AtStep(0);
        self.enter(0);
        info!(wizard = %self.profile.resource, session, "wizard opened");
    }

    pub fn reopen(&mut self) {
        self.open();
    }

    /// Opens a session whose submission saves over entity `id`.
    pub fn open_for_edit(&mut self, id: impl Into<String>) {
        self.open();
        let id = id.into();
        debug!(wizard = %self.profile.resource, id = %id, "editing existing entity");
        self.target = SubmitTarget::Save(id);
    }

    /// Abandons the session without submitting.
    pub fn close(&mut self) {
        self.generations.begin_session();
        self.state = WizardState::Closed;
        self.notifications.clear_context(STEP_CONTEXT);
        info!(wizard = %self.profile.resource, "wizard closed");
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            WizardState::AtStep(index) => Some(index),
            _ => None,
        }
    }

    pub fn current_step(&self) -> Option<&StepDescriptor> {
        self.current_index()
            .and_then(|index| self.registry.get().get(index))
    }

    pub fn is_last_step(&self) -> bool {
        self.current_index() == Some(self.registry.len() - 1)
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        self.registry.get()
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    pub fn bridge(&self) -> &ValidationBridge {
        &self.bridge
    }

    pub fn profile(&self) -> &WizardProfile {
        &self.profile
    }

    pub fn target(&self) -> &SubmitTarget {
        &self.target
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn dismiss(&mut self, id: Uuid) -> bool {
        self.notifications.remove(id)
    }

    /// Aggregated drafts, one entry per step in declared order.
    pub fn payload(&self) -> WizardDraft {
        self.registry.aggregate()
    }

    pub fn step_is_valid(&self, index: usize) -> bool {
        self.step_valid_in(index, &self.payload())
    }

    /// Bridge rules failing on the fields of step `index`.
    pub fn step_failures(&self, index: usize) -> Vec<(String, String)> {
        match self.registry.get().get(index) {
            Some(step) => self.bridge.step_failures(step.name(), &self.payload()),
            None => Vec::new(),
        }
    }

    pub fn next(&mut self) -> Result<Transition, WizardError> {
        let at = self.active()?;
        if at + 1 >= self.registry.len() {
            return Ok(Transition::Unchanged { at });
        }
        let snapshot = self.payload();
        if !self.step_valid_in(at, &snapshot) {
            self.raise_step_notices(at, &snapshot);
            debug!(step = at, "navigation blocked by invalid step");
            return Ok(Transition::Blocked { at });
        }
        self.move_to(at, at + 1);
        Ok(Transition::Moved { from: at, to: at + 1 })
    }

    pub fn previous(&mut self) -> Result<Transition, WizardError> {
        let at = self.active()?;
        if at == 0 {
            return Ok(Transition::Unchanged { at });
        }
        self.move_to(at, at - 1);
        Ok(Transition::Moved {
            from: at,
            to: at - 1,
        })
    }

    /// Backward jumps always succeed; forward jumps need every earlier step valid.
    pub fn jump_to(&mut self, target: usize) -> Result<Transition, WizardError> {
        let at = self.active()?;
        if target >= self.registry.len() {
            return Err(WizardError::UnknownStep(target.to_string()));
        }
        if target == at {
            return Ok(Transition::Unchanged { at });
        }
        if target > at {
            let snapshot = self.payload();
            if let Some(blocking) = (0..target).find(|index| !self.step_valid_in(*index, &snapshot)) {
                self.raise_step_notices(blocking, &snapshot);
                debug!(step = at, target, blocking, "jump blocked by invalid step");
                return Ok(Transition::Blocked { at });
            }
        }
        self.move_to(at, target);
        Ok(Transition::Moved { from: at, to: target })
    }

    pub fn jump_to_step(&mut self, name: &str) -> Result<Transition, WizardError> {
        let target = self
            .registry
            .position(name)
            .ok_or_else(|| WizardError::UnknownStep(name.to_string()))?;
        self.jump_to(target)
    }

    /// Routes a field edit to step `step` and evaluates the bridge rules
    /// registered on `step/field`.
    pub fn set_field(
        &mut self,
        step: &str,
        field: &str,
        value: Value,
    ) -> Result<FieldStatus, WizardError> {
        self.active()?;
        let index = self
            .registry
            .position(step)
            .ok_or_else(|| WizardError::UnknownStep(step.to_string()))?;
        let path = format!("{step}/{field}");
        let descriptor = self
            .registry
            .get_mut(index)
            .ok_or_else(|| WizardError::UnknownStep(step.to_string()))?;
        descriptor
            .state_mut()
            .set_field(field, value)
            .map_err(|source| WizardError::Field {
                field: path.clone(),
                source,
            })?;

        self.generations.touch(index);
        self.notifications.clear_context(STEP_CONTEXT);
        let failing = self.bridge.evaluate_field(&path, &self.payload());
        debug!(field = %path, failing = failing.len(), "field updated");
        Ok(FieldStatus {
            field: path,
            failing,
        })
    }

    /// Issues a conflict check for the active step, if it has a complete
    /// schedule to check.
    pub fn begin_conflict_check(&mut self) -> Option<ConflictRequest> {
        let at = self.current_index()?;
        let query = self.registry.get().get(at)?.state().conflict_query()?;
        if let Some(step) = self.registry.get_mut(at) {
            step.state_mut().conflicts_pending();
        }
        let ticket = self.generations.entry_ticket(at);
        debug!(step = at, device = %query.device, "conflict check dispatched");
        Some(ConflictRequest { ticket, query })
    }

    pub fn apply_conflict_response(&mut self, response: ConflictResponse) -> ApplyOutcome {
        let index = response.ticket.step();
        if !self
            .generations
            .is_current(&response.ticket, self.current_index())
        {
            debug!(step = index, "discarding stale conflict check result");
            return ApplyOutcome::Stale;
        }
        if let Err(err) = &response.result {
            warn!(step = index, error = %err, "conflict check failed");
        }
        if let Some(step) = self.registry.get_mut(index) {
            step.state_mut().apply_conflicts(response.result);
        }
        let snapshot = self.payload();
        self.raise_step_notices(index, &snapshot);
        ApplyOutcome::Applied
    }

    pub async fn check_conflicts(&mut self, checker: &dyn ConflictChecker) -> Option<ApplyOutcome> {
        let request = self.begin_conflict_check()?;
        let response = request.run(checker).await;
        Some(self.apply_conflict_response(response))
    }

    /// One request per step that wants an options list. Tickets are scoped to
    /// the session, so responses survive navigation but not a reopen.
    pub fn begin_options_requests(&self) -> Vec<OptionsRequest> {
        self.registry
            .get()
            .iter()
            .enumerate()
            .filter_map(|(index, step)| {
                step.state().options_request().map(|kind| OptionsRequest {
                    ticket: self.generations.session_ticket(index),
                    kind,
                })
            })
            .collect()
    }

    pub fn apply_options_response(&mut self, response: OptionsResponse) -> ApplyOutcome {
        let index = response.ticket.step();
        if !self
            .generations
            .is_current(&response.ticket, self.current_index())
        {
            debug!(step = index, kind = response.kind.as_str(), "discarding stale options");
            return ApplyOutcome::Stale;
        }
        if let Err(err) = &response.result {
            warn!(kind = response.kind.as_str(), error = %err, "options unavailable");
        }
        if let Some(step) = self.registry.get_mut(index) {
            step.state_mut().apply_options(response.result);
        }
        ApplyOutcome::Applied
    }

    /// Fetches and applies every options list; returns how many were applied.
    pub async fn load_options(&mut self, provider: &dyn OptionsProvider) -> usize {
        let mut applied = 0;
        for request in self.begin_options_requests() {
            let response = request.run(provider).await;
            if self.apply_options_response(response) == ApplyOutcome::Applied {
                applied += 1;
            }
        }
        applied
    }

    /// Re-validates every step, then hands the aggregated payload to the
    /// submitter. Failure keeps the wizard on the last step with its drafts.
    pub async fn submit(&mut self, submitter: &dyn Submitter) -> Result<SubmitReceipt, WizardError> {
        let at = self.active()?;
        if at + 1 != self.registry.len() {
            return Err(WizardError::NotAtFinalStep(at));
        }

        let snapshot = self.payload();
        let invalid = (0..self.registry.len()).find(|index| !self.step_valid_in(*index, &snapshot));
        if let Some(index) = invalid {
            self.raise_step_notices(index, &snapshot);
            let name = self
                .registry
                .get()
                .get(index)
                .map(|step| step.name().to_string())
                .unwrap_or_default();
            warn!(step = %name, "submission blocked by invalid step");
            return Err(WizardError::StepInvalid { index, name });
        }

        let payload = snapshot.to_json();
        self.state = WizardState::Submitting;
        info!(wizard = %self.profile.resource, "submitting wizard");
        let result = match &self.target {
            SubmitTarget::Create => submitter.create(&self.profile.resource, &payload).await,
            SubmitTarget::Save(id) => submitter.save(&self.profile.resource, id, &payload).await,
        };

        match result {
            Ok(receipt) => {
                self.generations.begin_session();
                self.state = WizardState::Closed;
                self.registry.reset();
                self.notifications.clear();
                self.notifications.add(
                    NotificationLevel::Success,
                    self.profile.success_key(),
                    SUBMISSION_CONTEXT,
                );
                info!(wizard = %self.profile.resource, id = %receipt.id, "submission accepted");
                Ok(receipt)
            }
            Err(err) => {
                self.state = WizardState::AtStep(at);
                let key = if err.is_conflict() {
                    self.profile.conflict_key()
                } else {
                    self.profile.failure_key()
                };
                self.notifications.clear_context(SUBMISSION_CONTEXT);
                self.notifications
                    .add(NotificationLevel::Error, key, SUBMISSION_CONTEXT);
                warn!(wizard = %self.profile.resource, error = %err, "submission failed");
                Err(WizardError::Submission(err))
            }
        }
    }

    fn active(&self) -> Result<usize, WizardError> {
        self.current_index().ok_or(WizardError::NotOpen)
    }

    fn step_valid_in(&self, index: usize, snapshot: &WizardDraft) -> bool {
        self.registry.get().get(index).is_some_and(|step| {
            step.state().is_valid(snapshot) && self.bridge.step_rules_hold(step.name(), snapshot)
        })
    }

    fn move_to(&mut self, from: usize, to: usize) {
        self.notifications.clear_context(STEP_CONTEXT);
        self.state = WizardState::AtStep(to);
        self.enter(to);
        debug!(from, to, "wizard moved");
    }

    fn enter(&mut self, index: usize) {
        self.generations.enter(index);
        let snapshot = self.payload();
        if let Some(step) = self.registry.get_mut(index) {
            step.state_mut().reload(&snapshot);
        }
    }

    fn raise_step_notices(&mut self, index: usize, snapshot: &WizardDraft) {
        self.notifications.clear_context(STEP_CONTEXT);
        let notices = self
            .registry
            .get()
            .get(index)
            .map(|step| step.state().notices(snapshot))
            .unwrap_or_default();
        for notice in notices {
            self.notifications
                .add(notice.level, notice.key, STEP_CONTEXT);
        }
    }
}
