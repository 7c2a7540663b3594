//! Field descriptors used by interactive front ends to prompt for step input.
//!
//! Steps describe their editable fields; a front end turns raw text into a
//! JSON value with [`FieldKind::parse`] and hands it back to the step through
//! `set_field`.

use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::collaborators::OptionItem;
use crate::errors::FieldError;

/// Supported data kinds for step fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
    Boolean,
    Choice(Vec<String>),
    /// Comma separated free-form values.
    List,
    /// Comma separated picks from the given options, by value, name or 1-based index.
    Selection(Vec<OptionItem>),
    /// Comma separated `ROLE:flags[:action|action]` access rules, flags drawn from `r` and `w`.
    Policies,
}

impl FieldKind {
    pub fn parse(&self, raw: &str) -> Result<Value, FieldError> {
        let trimmed = raw.trim();
        match self {
            FieldKind::Text => Ok(Value::String(trimmed.to_string())),
            FieldKind::Integer => trimmed
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| FieldError::new("Enter a whole number (e.g., 42)")),
            FieldKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(|date| Value::String(date.to_string()))
                .map_err(|_| FieldError::new("Use YYYY-MM-DD format")),
            FieldKind::Boolean => match trimmed.to_lowercase().as_str() {
                "y" | "yes" | "true" | "1" => Ok(Value::Bool(true)),
                "n" | "no" | "false" | "0" => Ok(Value::Bool(false)),
                _ => Err(FieldError::new(
                    "Enter yes/no, true/false, or 1/0 to indicate boolean values",
                )),
            },
            FieldKind::Choice(options) => {
                let normalized = trimmed.to_lowercase();
                options
                    .iter()
                    .find(|candidate| candidate.to_lowercase() == normalized)
                    .map(|choice| Value::String(choice.clone()))
                    .ok_or_else(|| {
                        FieldError::new(format!("Value must be one of: {}", options.join(", ")))
                    })
            }
            FieldKind::List => Ok(Value::Array(
                split_list(trimmed)
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            )),
            FieldKind::Selection(options) => split_list(trimmed)
                .map(|token| resolve_option(options, token).map(Value::String))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            FieldKind::Policies => split_list(trimmed)
                .map(parse_policy)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
        }
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|item| !item.is_empty())
}

fn resolve_option(options: &[OptionItem], token: &str) -> Result<String, FieldError> {
    if let Ok(index) = token.parse::<usize>() {
        if let Some(option) = index.checked_sub(1).and_then(|idx| options.get(idx)) {
            return Ok(option.value.clone());
        }
    }
    options
        .iter()
        .find(|option| {
            option.value.eq_ignore_ascii_case(token) || option.name.eq_ignore_ascii_case(token)
        })
        .map(|option| option.value.clone())
        .ok_or_else(|| FieldError::new(format!("Unknown option `{token}`")))
}

fn parse_policy(raw: &str) -> Result<Value, FieldError> {
    let mut parts = raw.split(':');
    let role = parts.next().unwrap_or_default().trim();
    if role.is_empty() {
        return Err(FieldError::new("Each rule needs a role"));
    }
    let flags = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    let mut read = false;
    let mut write = false;
    for flag in flags.chars() {
        match flag {
            'r' => read = true,
            'w' => write = true,
            other => {
                return Err(FieldError::new(format!(
                    "Unknown access flag `{other}` for {role} (use r and/or w)"
                )))
            }
        }
    }
    let actions: Vec<&str> = parts
        .next()
        .map(|list| {
            list.split('|')
                .map(str::trim)
                .filter(|action| !action.is_empty())
                .collect()
        })
        .unwrap_or_default();
    Ok(json!({ "role": role, "read": read, "write": write, "actions": actions }))
}

/// Declarative description of a single step field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub help: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
            help: None,
        }
    }

    pub fn with_optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_kinds_parse() {
        assert_eq!(FieldKind::Integer.parse(" 42 ").unwrap(), json!(42));
        assert!(FieldKind::Integer.parse("4.2").is_err());
        assert_eq!(FieldKind::Date.parse("2026-10-19").unwrap(), json!("2026-10-19"));
        assert!(FieldKind::Date.parse("19.10.2026").is_err());
        assert_eq!(FieldKind::Boolean.parse("Yes").unwrap(), json!(true));
        let choice = FieldKind::Choice(vec!["UPLOAD".into(), "SCHEDULE_SINGLE".into()]);
        assert_eq!(choice.parse("upload").unwrap(), json!("UPLOAD"));
        assert!(choice.parse("stream").is_err());
    }

    #[test]
    fn selections_resolve_by_index_name_or_value() {
        let kind = FieldKind::Selection(vec![
            OptionItem::new("Administrators", "ROLE_ADMIN"),
            OptionItem::new("Students", "ROLE_STUDENT"),
        ]);
        assert_eq!(
            kind.parse("2, administrators").unwrap(),
            json!(["ROLE_STUDENT", "ROLE_ADMIN"])
        );
        assert!(kind.parse("3").is_err());
    }

    #[test]
    fn policies_parse_flags_and_actions() {
        let parsed = FieldKind::Policies
            .parse("ROLE_ADMIN:rw:annotate|moderate, ROLE_USER:r")
            .unwrap();
        assert_eq!(
            parsed,
            json!([
                { "role": "ROLE_ADMIN", "read": true, "write": true, "actions": ["annotate", "moderate"] },
                { "role": "ROLE_USER", "read": true, "write": false, "actions": [] }
            ])
        );
        assert!(FieldKind::Policies.parse("ROLE_USER:x").is_err());
        assert!(FieldKind::Policies.parse(":rw").is_err());
    }
}
