use super::draft::WizardDraft;
use super::step::StepState;

pub struct StepDescriptor {
    name: String,
    label: String,
    state: Box<dyn StepState>,
}

impl StepDescriptor {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        state: impl StepState + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            state: Box::new(state),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> &dyn StepState {
        self.state.as_ref()
    }

    pub(crate) fn state_mut(&mut self) -> &mut dyn StepState {
        self.state.as_mut()
    }
}

impl std::fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of the steps of one wizard.
#[derive(Debug, Default)]
pub struct StepRegistry {
    steps: Vec<StepDescriptor>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step(
        mut self,
        name: impl Into<String>,
        label: impl Into<String>,
        state: impl StepState + 'static,
    ) -> Self {
        self.push(StepDescriptor::new(name, label, state));
        self
    }

    pub fn push(&mut self, step: StepDescriptor) {
        self.steps.push(step);
    }

    /// Steps in wizard order.
    pub fn get(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut StepDescriptor> {
        self.steps.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.name == name)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.label.as_str()).collect()
    }

    /// Resets every step, first to last.
    pub fn reset(&mut self) {
        for step in &mut self.steps {
            step.state.reset();
        }
    }

    /// Snapshot of every step's draft, keyed by step name in wizard order.
    pub fn aggregate(&self) -> WizardDraft {
        let mut draft = WizardDraft::new();
        for step in &self.steps {
            draft.push(step.name.clone(), step.state.draft());
        }
        draft
    }

    pub(crate) fn first_duplicate(&self) -> Option<&str> {
        self.steps.iter().enumerate().find_map(|(idx, step)| {
            self.steps[..idx]
                .iter()
                .any(|earlier| earlier.name == step.name)
                .then_some(step.name.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    struct Recording {
        id: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl StepState for Recording {
        fn draft(&self) -> Value {
            json!({ "id": self.id })
        }

        fn is_valid(&self, _snapshot: &WizardDraft) -> bool {
            true
        }

        fn reset(&mut self) {
            self.log.lock().unwrap().push(self.id);
        }
    }

    fn registry(log: &Arc<Mutex<Vec<&'static str>>>) -> StepRegistry {
        StepRegistry::new()
            .with_step("a", "First", Recording { id: "a", log: log.clone() })
            .with_step("b", "Second", Recording { id: "b", log: log.clone() })
            .with_step("c", "Third", Recording { id: "c", log: log.clone() })
    }

    #[test]
    fn reset_runs_in_declared_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut steps = registry(&log);
        steps.reset();
        assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn aggregate_and_lookup() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = registry(&log);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps.position("b"), Some(1));
        assert_eq!(steps.labels(), vec!["First", "Second", "Third"]);
        let snapshot = steps.aggregate();
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(snapshot.lookup("c/id"), &json!("c"));
    }

    #[test]
    fn duplicates_are_detected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let steps = registry(&log).with_step("b", "Again", Recording { id: "b", log: log.clone() });
        assert_eq!(steps.first_duplicate(), Some("b"));
    }
}
