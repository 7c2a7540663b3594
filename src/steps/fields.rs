use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::errors::FieldError;
use crate::wizard::{FieldDescriptor, FieldKind, StepState, WizardDraft};

/// Flat key/value form such as event metadata or a message body.
#[derive(Debug, Clone)]
pub struct FieldsStep {
    descriptors: Vec<FieldDescriptor>,
    values: Vec<Value>,
}

impl FieldsStep {
    pub fn new(descriptors: Vec<FieldDescriptor>) -> Self {
        let values = descriptors.iter().map(|field| empty_value(&field.kind)).collect();
        Self {
            descriptors,
            values,
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.index_of(key).and_then(|idx| self.values.get(idx))
    }

    fn index_of(&self, key: &str) -> Option<usize> {
        self.descriptors.iter().position(|field| field.key == key)
    }
}

fn empty_value(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Text => Value::String(String::new()),
        FieldKind::Boolean => Value::Bool(false),
        FieldKind::List | FieldKind::Selection(_) | FieldKind::Policies => Value::Array(Vec::new()),
        FieldKind::Integer | FieldKind::Date | FieldKind::Choice(_) => Value::Null,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn accepts(kind: &FieldKind, value: &Value) -> Result<(), FieldError> {
    let ok = match (kind, value) {
        (_, Value::Null) => true,
        (FieldKind::Text, Value::String(_)) => true,
        (FieldKind::Integer, Value::Number(number)) => number.is_i64(),
        (FieldKind::Date, Value::String(raw)) => {
            return NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| FieldError::new("Use YYYY-MM-DD format"));
        }
        (FieldKind::Boolean, Value::Bool(_)) => true,
        (FieldKind::Choice(options), Value::String(choice)) => {
            if options.contains(choice) {
                true
            } else {
                return Err(FieldError::new(format!(
                    "Value must be one of: {}",
                    options.join(", ")
                )));
            }
        }
        (FieldKind::List | FieldKind::Selection(_), Value::Array(items)) => {
            items.iter().all(Value::is_string)
        }
        (FieldKind::Policies, Value::Array(items)) => items.iter().all(Value::is_object),
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(FieldError::new(format!("Unexpected value {value}")))
    }
}

impl StepState for FieldsStep {
    fn draft(&self) -> Value {
        let map: Map<String, Value> = self
            .descriptors
            .iter()
            .zip(&self.values)
            .map(|(field, value)| (field.key.to_string(), value.clone()))
            .collect();
        Value::Object(map)
    }

    fn is_valid(&self, _snapshot: &WizardDraft) -> bool {
        self.descriptors
            .iter()
            .zip(&self.values)
            .all(|(field, value)| !field.required || !is_blank(value))
    }

    fn reset(&mut self) {
        self.values = self
            .descriptors
            .iter()
            .map(|field| empty_value(&field.kind))
            .collect();
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        self.descriptors.clone()
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        let idx = self
            .index_of(field)
            .ok_or_else(|| FieldError::new(format!("Unknown field `{field}`")))?;
        accepts(&self.descriptors[idx].kind, &value)?;
        let value = match value {
            Value::Null => empty_value(&self.descriptors[idx].kind),
            other => other,
        };
        self.values[idx] = value;
        Ok(())
    }

    fn describe(&self) -> Vec<String> {
        self.descriptors
            .iter()
            .zip(&self.values)
            .map(|(field, value)| format!("{}: {}", field.label, display_value(value)))
            .collect()
    }
}

pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".into(),
        Value::String(text) if text.is_empty() => "-".into(),
        Value::String(text) => text.clone(),
        Value::Array(items) if items.is_empty() => "-".into(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        Value::Object(map) => map
            .get("name")
            .or_else(|| map.get("role"))
            .map(display_value)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
