//! Drives a [`WizardController`] through a [`WizardInteraction`]: one prompt
//! per step field, gated navigation, conflict checks before leaving a
//! scheduled step and a confirmation before submitting.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::cli::interaction::{
    kind_hint, ConfirmationResponse, PromptContext, PromptResponse, WizardInteraction,
};
use crate::cli::output;
use crate::collaborators::{ConflictChecker, OptionsProvider, SubmitReceipt, Submitter};
use crate::errors::WizardError;
use crate::wizard::{
    FieldDescriptor, Transition, WizardController, STEP_CONTEXT, SUBMISSION_CONTEXT,
};

/// How an interactive run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Submitted(SubmitReceipt),
    Cancelled,
}

/// Owned view of the active step, taken before the controller is mutated.
struct StepView {
    index: usize,
    name: String,
    label: String,
    fields: Vec<FieldDescriptor>,
    suggestions: BTreeMap<String, String>,
    draft: Value,
}

impl StepView {
    fn default_for(&self, key: &str) -> Option<String> {
        self.suggestions
            .get(key)
            .cloned()
            .or_else(|| self.draft.get(key).and_then(as_input))
    }
}

/// Renders a stored draft value back into the text a user would type.
fn as_input(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(if *flag { "yes" } else { "no" }.to_string()),
        Value::Array(items) if !items.is_empty() => {
            let parts: Vec<String> = items.iter().filter_map(item_input).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

fn item_input(item: &Value) -> Option<String> {
    match item {
        Value::String(text) => Some(text.clone()),
        Value::Object(map) => {
            if let Some(value) = map.get("value").and_then(Value::as_str) {
                return Some(value.to_string());
            }
            let role = map.get("role").and_then(Value::as_str)?;
            let mut flags = String::new();
            if map.get("read").and_then(Value::as_bool).unwrap_or(false) {
                flags.push('r');
            }
            if map.get("write").and_then(Value::as_bool).unwrap_or(false) {
                flags.push('w');
            }
            let actions: Vec<&str> = map
                .get("actions")
                .and_then(Value::as_array)
                .map(|list| list.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            if actions.is_empty() {
                Some(format!("{role}:{flags}"))
            } else {
                Some(format!("{role}:{flags}:{}", actions.join("|")))
            }
        }
        _ => None,
    }
}

pub struct WizardRunner<'a> {
    options: &'a dyn OptionsProvider,
    conflicts: &'a dyn ConflictChecker,
    submitter: &'a dyn Submitter,
}

impl<'a> WizardRunner<'a> {
    pub fn new(
        options: &'a dyn OptionsProvider,
        conflicts: &'a dyn ConflictChecker,
        submitter: &'a dyn Submitter,
    ) -> Self {
        Self {
            options,
            conflicts,
            submitter,
        }
    }

    pub async fn run<I: WizardInteraction>(
        &self,
        controller: &mut WizardController,
        interaction: &mut I,
    ) -> Result<RunOutcome, WizardError> {
        controller.load_options(self.options).await;
        let mut field_index = 0;

        loop {
            let Some(view) = active_view(controller) else {
                return Ok(RunOutcome::Cancelled);
            };

            if field_index < view.fields.len() {
                let descriptor = &view.fields[field_index];
                let default = view.default_for(descriptor.key);
                let response = interaction.prompt_field(&PromptContext {
                    step_label: &view.label,
                    step_index: view.index,
                    step_total: controller.steps().len(),
                    descriptor,
                    default: default.as_deref(),
                    field_index,
                    field_total: view.fields.len(),
                });

                match response {
                    PromptResponse::Value(raw) => {
                        if apply_input(controller, &view, descriptor, &raw)? {
                            field_index += 1;
                        }
                    }
                    PromptResponse::Keep => match default {
                        Some(current) => {
                            if apply_input(controller, &view, descriptor, &current)? {
                                field_index += 1;
                            }
                        }
                        None if descriptor.required => {
                            output::warning(format!("{} is required", descriptor.label));
                        }
                        None => field_index += 1,
                    },
                    PromptResponse::Back => {
                        if field_index > 0 {
                            field_index -= 1;
                        } else if view.index > 0 {
                            field_index = step_back(controller)?;
                        } else {
                            output::info("Already at the first field");
                        }
                    }
                    PromptResponse::Help => print_help(descriptor),
                    PromptResponse::Cancel => {
                        controller.close();
                        return Ok(RunOutcome::Cancelled);
                    }
                }
                continue;
            }

            if controller.is_last_step() {
                let mut lines = Vec::new();
                if let Some(step) = controller.current_step() {
                    lines = step.state().describe();
                }
                match interaction.confirm(&lines) {
                    ConfirmationResponse::Confirm => match controller.submit(self.submitter).await {
                        Ok(receipt) => {
                            report(controller, SUBMISSION_CONTEXT);
                            return Ok(RunOutcome::Submitted(receipt));
                        }
                        Err(WizardError::Submission(err)) => {
                            report(controller, SUBMISSION_CONTEXT);
                            output::error(err);
                        }
                        Err(WizardError::StepInvalid { index, name }) => {
                            output::warning(format!("Step `{name}` needs attention"));
                            report(controller, STEP_CONTEXT);
                            controller.jump_to(index)?;
                            field_index = 0;
                        }
                        Err(other) => return Err(other),
                    },
                    ConfirmationResponse::Back => {
                        if view.index > 0 {
                            field_index = step_back(controller)?;
                        }
                    }
                    ConfirmationResponse::Cancel => {
                        controller.close();
                        return Ok(RunOutcome::Cancelled);
                    }
                }
                continue;
            }

            controller.check_conflicts(self.conflicts).await;
            match controller.next()? {
                Transition::Moved { to, .. } => {
                    debug!(step = to, "runner advanced");
                    field_index = 0;
                }
                Transition::Blocked { at } | Transition::Unchanged { at } => {
                    report(controller, STEP_CONTEXT);
                    for (field, rule) in controller.step_failures(at) {
                        output::warning(format!("{field}: {rule}"));
                    }
                    if view.fields.is_empty() {
                        controller.close();
                        return Err(WizardError::StepInvalid {
                            index: at,
                            name: view.name,
                        });
                    }
                    field_index = 0;
                }
            }
        }
    }
}

fn active_view(controller: &WizardController) -> Option<StepView> {
    let index = controller.current_index()?;
    let step = controller.current_step()?;
    let state = step.state();
    Some(StepView {
        index,
        name: step.name().to_string(),
        label: step.label().to_string(),
        fields: state.fields(),
        suggestions: state.suggestions(),
        draft: state.draft(),
    })
}

/// Parses and stores one answer. Returns whether the runner may move on to
/// the next field.
fn apply_input(
    controller: &mut WizardController,
    view: &StepView,
    descriptor: &FieldDescriptor,
    raw: &str,
) -> Result<bool, WizardError> {
    if raw.trim().is_empty() && descriptor.required {
        output::warning(format!("{} is required", descriptor.label));
        return Ok(false);
    }
    let parsed = if raw.trim().is_empty() {
        Ok(descriptor.kind.parse(raw).unwrap_or(Value::Null))
    } else {
        descriptor.kind.parse(raw)
    };
    let value = match parsed {
        Ok(value) => value,
        Err(err) => {
            output::warning(err);
            return Ok(false);
        }
    };

    match controller.set_field(&view.name, descriptor.key, value) {
        Ok(status) if status.is_valid() => Ok(true),
        Ok(status) => {
            for rule in &status.failing {
                output::warning(format!("{}: {rule}", status.field));
            }
            Ok(false)
        }
        Err(WizardError::Field { source, .. }) => {
            output::warning(source);
            Ok(false)
        }
        Err(other) => Err(other),
    }
}

/// Moves to the previous step and returns the index of its last field.
fn step_back(controller: &mut WizardController) -> Result<usize, WizardError> {
    controller.previous()?;
    Ok(controller
        .current_step()
        .map(|step| step.state().fields().len().saturating_sub(1))
        .unwrap_or(0))
}

fn print_help(descriptor: &FieldDescriptor) {
    if let Some(help) = descriptor.help {
        output::info(help);
    }
    for line in kind_hint(&descriptor.kind) {
        output::info(line);
    }
    if !descriptor.required {
        output::info("Leave empty to skip.");
    }
}

fn report(controller: &WizardController, context: &str) {
    for notification in controller
        .notifications()
        .iter()
        .filter(|notification| notification.context == context)
    {
        output::notification(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{BookingCalendar, OptionItem, OptionsKind, StaticOptions};
    use crate::errors::CollaboratorError;
    use crate::flows::{self, FlowContext, WizardKind};
    use crate::wizard::WizardState;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockInteraction {
        prompts: VecDeque<PromptResponse>,
        confirmations: VecDeque<ConfirmationResponse>,
        asked: Vec<String>,
    }

    impl MockInteraction {
        fn new(prompts: Vec<PromptResponse>, confirmations: Vec<ConfirmationResponse>) -> Self {
            Self {
                prompts: prompts.into(),
                confirmations: confirmations.into(),
                asked: Vec::new(),
            }
        }
    }

    impl WizardInteraction for MockInteraction {
        fn prompt_field(&mut self, context: &PromptContext<'_>) -> PromptResponse {
            self.asked.push(format!(
                "{}/{}={}",
                context.step_label,
                context.descriptor.key,
                context.default.unwrap_or("")
            ));
            self.prompts.pop_front().unwrap_or(PromptResponse::Cancel)
        }

        fn confirm(&mut self, _lines: &[String]) -> ConfirmationResponse {
            self.confirmations
                .pop_front()
                .unwrap_or(ConfirmationResponse::Cancel)
        }
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        failures: Mutex<VecDeque<CollaboratorError>>,
        payloads: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl Submitter for RecordingSubmitter {
        async fn create(
            &self,
            _resource: &str,
            payload: &Value,
        ) -> Result<SubmitReceipt, CollaboratorError> {
            if let Some(err) = self.failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            self.payloads.lock().unwrap().push(payload.clone());
            Ok(SubmitReceipt {
                id: "42".into(),
                location: None,
            })
        }

        async fn save(
            &self,
            resource: &str,
            _id: &str,
            payload: &Value,
        ) -> Result<SubmitReceipt, CollaboratorError> {
            self.create(resource, payload).await
        }
    }

    fn value(raw: &str) -> PromptResponse {
        PromptResponse::Value(raw.into())
    }

    #[tokio::test]
    async fn acl_wizard_runs_to_submission() {
        let mut controller = flows::controller(WizardKind::NewAcl, &FlowContext::default()).unwrap();
        let options = StaticOptions::new();
        let calendar = BookingCalendar::new(Vec::new());
        let submitter = RecordingSubmitter::default();
        let runner = WizardRunner::new(&options, &calendar, &submitter);
        let mut interaction = MockInteraction::new(
            vec![value("Course staff"), value("ROLE_ADMIN:rw"), value("")],
            vec![ConfirmationResponse::Confirm],
        );

        let outcome = runner.run(&mut controller, &mut interaction).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Submitted(ref receipt) if receipt.id == "42"));
        let payloads = submitter.payloads.lock().unwrap();
        assert_eq!(payloads[0]["metadata"]["name"], "Course staff");
        assert_eq!(payloads[0]["access"]["policies"][0]["role"], "ROLE_ADMIN");
        assert_eq!(controller.state(), WizardState::Closed);
        assert!(controller.notifications().contains("ACL_ADDED"));
    }

    #[tokio::test]
    async fn back_from_a_steps_first_field_revisits_the_previous_step() {
        let mut controller = flows::controller(WizardKind::NewAcl, &FlowContext::default()).unwrap();
        let options = StaticOptions::new();
        let calendar = BookingCalendar::new(Vec::new());
        let submitter = RecordingSubmitter::default();
        let runner = WizardRunner::new(&options, &calendar, &submitter);
        let mut interaction = MockInteraction::new(
            vec![
                value("First"),
                PromptResponse::Back,
                value("Second"),
                value("ROLE_ADMIN:rw"),
                PromptResponse::Keep,
            ],
            vec![ConfirmationResponse::Confirm],
        );

        runner.run(&mut controller, &mut interaction).await.unwrap();

        assert_eq!(
            interaction.asked[..3],
            [
                "Metadata/name=".to_string(),
                "Access policy/policies=".to_string(),
                "Metadata/name=First".to_string(),
            ]
        );
        assert_eq!(submitter.payloads.lock().unwrap()[0]["metadata"]["name"], "Second");
    }

    #[tokio::test]
    async fn failing_bridge_rule_reprompts_the_field() {
        let mut controller = flows::controller(WizardKind::NewAcl, &FlowContext::default()).unwrap();
        let options = StaticOptions::new();
        let calendar = BookingCalendar::new(Vec::new());
        let submitter = RecordingSubmitter::default();
        let runner = WizardRunner::new(&options, &calendar, &submitter);
        let mut interaction = MockInteraction::new(
            vec![
                value("Readers"),
                value("ROLE_USER:r"),
                value("ROLE_USER:r, ROLE_ADMIN:rw"),
                value(""),
            ],
            vec![ConfirmationResponse::Confirm],
        );

        runner.run(&mut controller, &mut interaction).await.unwrap();

        let policy_prompts = interaction
            .asked
            .iter()
            .filter(|entry| entry.starts_with("Access policy/policies"))
            .count();
        assert_eq!(policy_prompts, 2);
        let payloads = submitter.payloads.lock().unwrap();
        assert_eq!(payloads[0]["access"]["policies"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn cancel_closes_without_submitting() {
        let mut controller = flows::controller(WizardKind::NewAcl, &FlowContext::default()).unwrap();
        let options = StaticOptions::new();
        let calendar = BookingCalendar::new(Vec::new());
        let submitter = RecordingSubmitter::default();
        let runner = WizardRunner::new(&options, &calendar, &submitter);
        let mut interaction = MockInteraction::new(vec![PromptResponse::Cancel], Vec::new());

        let outcome = runner.run(&mut controller, &mut interaction).await.unwrap();

        assert_eq!(outcome, RunOutcome::Cancelled);
        assert_eq!(controller.state(), WizardState::Closed);
        assert!(submitter.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_submission_can_be_retried_from_the_last_step() {
        let mut controller = flows::controller(WizardKind::NewAcl, &FlowContext::default()).unwrap();
        let options = StaticOptions::new();
        let calendar = BookingCalendar::new(Vec::new());
        let submitter = RecordingSubmitter::default();
        submitter
            .failures
            .lock()
            .unwrap()
            .push_back(CollaboratorError::Unreachable("timeout".into()));
        let runner = WizardRunner::new(&options, &calendar, &submitter);
        let mut interaction = MockInteraction::new(
            vec![value("Retry"), value("ROLE_ADMIN:rw"), value("")],
            vec![ConfirmationResponse::Confirm, ConfirmationResponse::Confirm],
        );

        let outcome = runner.run(&mut controller, &mut interaction).await.unwrap();

        assert!(matches!(outcome, RunOutcome::Submitted(_)));
        assert_eq!(submitter.payloads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn group_wizard_picks_from_loaded_options() {
        let mut controller =
            flows::controller(WizardKind::NewGroup, &FlowContext::default()).unwrap();
        let options = StaticOptions::new()
            .with(
                OptionsKind::Roles,
                vec![
                    OptionItem::new("Admins", "ROLE_ADMIN"),
                    OptionItem::new("Students", "ROLE_STUDENT"),
                ],
            )
            .with(OptionsKind::Users, vec![OptionItem::new("Alice", "alice")]);
        let calendar = BookingCalendar::new(Vec::new());
        let submitter = RecordingSubmitter::default();
        let runner = WizardRunner::new(&options, &calendar, &submitter);
        let mut interaction = MockInteraction::new(
            vec![value("Tutors"), value(""), value("2"), value("alice")],
            vec![ConfirmationResponse::Confirm],
        );

        runner.run(&mut controller, &mut interaction).await.unwrap();

        let payloads = submitter.payloads.lock().unwrap();
        assert_eq!(payloads[0]["roles"]["selected"][0]["value"], "ROLE_STUDENT");
        assert_eq!(payloads[0]["users"]["selected"][0]["name"], "Alice");
    }

    #[test]
    fn stored_values_render_as_typed_input() {
        let policies = serde_json::json!([
            { "role": "ROLE_ADMIN", "read": true, "write": true, "actions": [] },
            { "role": "ROLE_USER", "read": true, "write": false, "actions": ["annotate"] }
        ]);
        assert_eq!(
            as_input(&policies).as_deref(),
            Some("ROLE_ADMIN:rw, ROLE_USER:r:annotate")
        );
        assert_eq!(as_input(&Value::from(7)).as_deref(), Some("7"));
        assert_eq!(as_input(&Value::String(String::new())), None);
    }
}
