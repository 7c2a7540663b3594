use serde_json::{json, Value};

use crate::collaborators::{OptionItem, OptionsKind};
use crate::errors::{CollaboratorError, FieldError};
use crate::wizard::{FieldDescriptor, FieldKind, Notice, StepState, WizardDraft};

const OPTIONS_UNAVAILABLE: &str = "OPTIONS_UNAVAILABLE";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Catalog {
    NotLoaded,
    Loaded,
    Failed,
}

/// Multi-select over an options list fetched once per session.
///
/// The draft is `{ "available": [...], "selected": [...] }`; an item is in
/// exactly one of the two lists.
#[derive(Debug, Clone)]
pub struct SelectionStep {
    kind: OptionsKind,
    label: &'static str,
    min_selected: usize,
    options: Vec<OptionItem>,
    selected: Vec<OptionItem>,
    catalog: Catalog,
}

impl SelectionStep {
    pub fn new(kind: OptionsKind, label: &'static str) -> Self {
        Self {
            kind,
            label,
            min_selected: 0,
            options: Vec::new(),
            selected: Vec::new(),
            catalog: Catalog::NotLoaded,
        }
    }

    pub fn with_min_selected(mut self, min_selected: usize) -> Self {
        self.min_selected = min_selected;
        self
    }

    pub fn available(&self) -> Vec<&OptionItem> {
        self.options
            .iter()
            .filter(|option| !self.is_selected(&option.value))
            .collect()
    }

    pub fn selected(&self) -> &[OptionItem] {
        &self.selected
    }

    /// Moves `value` from the available list to the selection.
    pub fn select(&mut self, value: &str) -> bool {
        if self.is_selected(value) {
            return false;
        }
        match self.options.iter().find(|option| option.value == value) {
            Some(option) => {
                self.selected.push(option.clone());
                true
            }
            None => false,
        }
    }

    pub fn deselect(&mut self, value: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|option| option.value != value);
        self.selected.len() != before
    }

    fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|option| option.value == value)
    }
}

impl StepState for SelectionStep {
    fn draft(&self) -> Value {
        json!({
            "available": self.available(),
            "selected": self.selected,
        })
    }

    fn is_valid(&self, _snapshot: &WizardDraft) -> bool {
        self.selected.len() >= self.min_selected
    }

    fn reset(&mut self) {
        self.options.clear();
        self.selected.clear();
        self.catalog = Catalog::NotLoaded;
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        let field = FieldDescriptor::new(
            "selected",
            self.label,
            FieldKind::Selection(self.options.clone()),
        );
        if self.min_selected == 0 {
            vec![field.with_optional()]
        } else {
            vec![field]
        }
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        if field != "selected" {
            return Err(FieldError::new(format!("Unknown field `{field}`")));
        }
        let values: Vec<String> = serde_json::from_value(value)
            .map_err(|_| FieldError::new("Expected a list of option values"))?;
        let mut picked = Vec::with_capacity(values.len());
        for value in &values {
            let option = self
                .options
                .iter()
                .find(|option| &option.value == value)
                .ok_or_else(|| FieldError::new(format!("Unknown option `{value}`")))?;
            if !picked.contains(option) {
                picked.push(option.clone());
            }
        }
        self.selected = picked;
        Ok(())
    }

    fn describe(&self) -> Vec<String> {
        let names: Vec<&str> = self.selected.iter().map(|item| item.name.as_str()).collect();
        if names.is_empty() {
            vec![format!("{}: -", self.label)]
        } else {
            vec![format!("{}: {}", self.label, names.join(", "))]
        }
    }

    fn notices(&self, _snapshot: &WizardDraft) -> Vec<Notice> {
        if self.catalog == Catalog::Failed {
            vec![Notice::warning(OPTIONS_UNAVAILABLE)]
        } else {
            Vec::new()
        }
    }

    fn options_request(&self) -> Option<OptionsKind> {
        Some(self.kind)
    }

    fn apply_options(&mut self, result: Result<Vec<OptionItem>, CollaboratorError>) {
        match result {
            Ok(options) => {
                self.selected
                    .retain(|item| options.iter().any(|option| option.value == item.value));
                self.options = options;
                self.catalog = Catalog::Loaded;
            }
            Err(_) => {
                self.options.clear();
                self.catalog = Catalog::Failed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> SelectionStep {
        let mut step = SelectionStep::new(OptionsKind::Roles, "Roles").with_min_selected(1);
        step.apply_options(Ok(vec![
            OptionItem::new("Admins", "ROLE_ADMIN"),
            OptionItem::new("Students", "ROLE_STUDENT"),
        ]));
        step
    }

    #[test]
    fn select_moves_items_between_lists() {
        let mut step = roles();
        let snapshot = WizardDraft::new();
        assert!(!step.is_valid(&snapshot));
        assert!(step.select("ROLE_STUDENT"));
        assert!(!step.select("ROLE_STUDENT"));
        assert!(!step.select("ROLE_UNKNOWN"));
        assert!(step.is_valid(&snapshot));
        assert_eq!(
            step.draft(),
            json!({
                "available": [{ "name": "Admins", "value": "ROLE_ADMIN" }],
                "selected": [{ "name": "Students", "value": "ROLE_STUDENT" }],
            })
        );
        assert!(step.deselect("ROLE_STUDENT"));
        assert_eq!(step.available().len(), 2);
    }

    #[test]
    fn set_field_replaces_selection() {
        let mut step = roles();
        step.set_field("selected", json!(["ROLE_ADMIN", "ROLE_STUDENT", "ROLE_ADMIN"]))
            .unwrap();
        assert_eq!(step.selected().len(), 2);
        assert!(step.set_field("selected", json!(["ROLE_GUEST"])).is_err());
        assert_eq!(step.selected().len(), 2);
    }

    #[test]
    fn failed_fetch_degrades_to_empty_list() {
        let mut step = roles();
        step.apply_options(Err(CollaboratorError::Unreachable("offline".into())));
        assert!(step.available().is_empty());
        assert_eq!(
            step.notices(&WizardDraft::new()),
            vec![Notice::warning(OPTIONS_UNAVAILABLE)]
        );
    }
}
