use serde_json::{json, Value};

use crate::wizard::{StepState, WizardDraft};

use super::fields::display_value;

/// Read-only review of everything entered so far.
///
/// Contributes an empty object to the payload; its preview is rebuilt from
/// the snapshot every time the step is entered.
#[derive(Debug, Clone, Default)]
pub struct SummaryStep {
    preview: Vec<String>,
}

impl SummaryStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> &[String] {
        &self.preview
    }
}

fn render(name: &str, draft: &Value) -> Option<String> {
    let Value::Object(map) = draft else {
        return None;
    };
    let parts: Vec<String> = map
        .iter()
        .filter(|(key, _)| key.as_str() != "available")
        .filter(|(_, value)| !matches!(value, Value::Null))
        .map(|(key, value)| format!("{key}={}", display_value(value)))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(format!("{name}: {}", parts.join("; ")))
    }
}

impl StepState for SummaryStep {
    fn draft(&self) -> Value {
        json!({})
    }

    fn is_valid(&self, _snapshot: &WizardDraft) -> bool {
        true
    }

    fn reset(&mut self) {
        self.preview.clear();
    }

    fn reload(&mut self, snapshot: &WizardDraft) {
        self.preview = snapshot
            .entries()
            .iter()
            .filter_map(|(name, draft)| render(name, draft))
            .collect();
    }

    fn describe(&self) -> Vec<String> {
        self.preview.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_renders_other_steps() {
        let mut snapshot = WizardDraft::new();
        snapshot.push("metadata", json!({ "name": "Team A", "description": "" }));
        snapshot.push(
            "roles",
            json!({ "available": [{ "name": "x", "value": "y" }], "selected": [{ "name": "Admins", "value": "ROLE_ADMIN" }] }),
        );
        snapshot.push("summary", json!({}));

        let mut summary = SummaryStep::new();
        summary.reload(&snapshot);
        assert_eq!(
            summary.preview(),
            &[
                "metadata: name=Team A; description=-".to_string(),
                "roles: selected=Admins".to_string(),
            ]
        );
        assert!(summary.is_valid(&snapshot));

        summary.reset();
        assert!(summary.describe().is_empty());
    }
}
