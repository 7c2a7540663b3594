use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::wizard::WizardDraft;

pub type Predicate = dyn Fn(&Value, &WizardDraft) -> bool + Send + Sync;

/// A named synchronous validity predicate.
#[derive(Clone)]
pub struct ValidationRule {
    name: String,
    predicate: Arc<Predicate>,
}

impl ValidationRule {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value, &WizardDraft) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the predicate. A panicking predicate counts as a failure.
    pub fn check(&self, value: &Value, snapshot: &WizardDraft) -> bool {
        catch_unwind(AssertUnwindSafe(|| (self.predicate)(value, snapshot))).unwrap_or_else(|_| {
            warn!(rule = %self.name, "validation rule panicked, treating value as invalid");
            false
        })
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationRule")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Field-level validators registered against `step/field` paths.
///
/// The bridge never schedules evaluation itself; the controller asks it when
/// a field changes and when it gates navigation or submission.
#[derive(Debug, Clone, Default)]
pub struct ValidationBridge {
    rules: Vec<(String, ValidationRule)>,
}

impl ValidationBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_validator(&mut self, field: impl Into<String>, rule: ValidationRule) -> &mut Self {
        self.rules.push((field.into(), rule));
        self
    }

    pub fn with_validator(mut self, field: impl Into<String>, rule: ValidationRule) -> Self {
        self.register_validator(field, rule);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Field paths with at least one registered rule, in registration order.
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for (field, _) in &self.rules {
            if !fields.contains(&field.as_str()) {
                fields.push(field.as_str());
            }
        }
        fields
    }

    /// Names of the rules on `field` that reject `value`.
    pub fn evaluate(&self, field: &str, value: &Value, snapshot: &WizardDraft) -> Vec<String> {
        self.rules
            .iter()
            .filter(|(path, _)| path == field)
            .filter(|(_, rule)| !rule.check(value, snapshot))
            .map(|(_, rule)| rule.name.clone())
            .collect()
    }

    /// Evaluates `field` against its current value in the snapshot.
    pub fn evaluate_field(&self, field: &str, snapshot: &WizardDraft) -> Vec<String> {
        self.evaluate(field, snapshot.lookup(field), snapshot)
    }

    /// Every `(field, rule)` failing on fields that belong to `step`.
    pub fn step_failures(&self, step: &str, snapshot: &WizardDraft) -> Vec<(String, String)> {
        self.rules
            .iter()
            .filter(|(path, _)| step_of(path) == step)
            .filter(|(path, rule)| !rule.check(snapshot.lookup(path), snapshot))
            .map(|(path, rule)| (path.clone(), rule.name.clone()))
            .collect()
    }

    pub fn step_rules_hold(&self, step: &str, snapshot: &WizardDraft) -> bool {
        self.step_failures(step, snapshot).is_empty()
    }
}

fn step_of(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}
