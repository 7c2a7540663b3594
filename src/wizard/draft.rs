use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

static NULL: Value = Value::Null;

/// Ordered mapping of step name to that step's draft.
///
/// Validators receive it as a read-only snapshot; the submission collaborator
/// receives it as the aggregated payload. Entry order is wizard order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardDraft {
    entries: Vec<(String, Value)>,
}

impl WizardDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: impl Into<String>, draft: Value) {
        self.entries.push((step.into(), draft));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, Value)] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, step: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == step)
            .map(|(_, draft)| draft)
    }

    /// Resolves `step/field/...` paths; anything missing reads as `null`.
    pub fn lookup(&self, path: &str) -> &Value {
        let (step, rest) = match path.split_once('/') {
            Some((step, rest)) => (step, Some(rest)),
            None => (path, None),
        };
        let Some(draft) = self.get(step) else {
            return &NULL;
        };
        match rest {
            None => draft,
            Some(rest) => draft.pointer(&format!("/{rest}")).unwrap_or(&NULL),
        }
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.entries.iter().cloned().collect();
        Value::Object(map)
    }
}

impl Serialize for WizardDraft {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, draft) in &self.entries {
            map.serialize_entry(name, draft)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> WizardDraft {
        let mut draft = WizardDraft::new();
        draft.push("metadata", json!({ "name": "Team A" }));
        draft.push("access", json!({ "policies": [{ "role": "ROLE_USER" }] }));
        draft.push("summary", json!({}));
        draft
    }

    #[test]
    fn lookup_resolves_nested_paths() {
        let draft = sample();
        assert_eq!(draft.lookup("metadata/name"), &json!("Team A"));
        assert_eq!(draft.lookup("access/policies/0/role"), &json!("ROLE_USER"));
        assert_eq!(draft.lookup("metadata/missing"), &Value::Null);
        assert_eq!(draft.lookup("nope/name"), &Value::Null);
    }

    #[test]
    fn serialization_keeps_step_order() {
        let text = serde_json::to_string(&sample()).unwrap();
        let metadata = text.find("metadata").unwrap();
        let access = text.find("access").unwrap();
        let summary = text.find("summary").unwrap();
        assert!(metadata < access && access < summary);
    }
}
