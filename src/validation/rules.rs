//! Built-in predicates for the validation bridge.
//!
//! Every rule answers `false` when it cannot decide.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use super::bridge::ValidationRule;
use crate::collaborators::{IdentityProvider, OptionItem};
use crate::scheduling::agent_capability_role;
use crate::steps::access::{AclPolicy, AclVerdict};

/// Option attribute naming how an event was created.
pub const EVENT_SOURCE: &str = "source";
/// Option attribute naming the capture agent an event records on.
pub const EVENT_AGENT: &str = "agent";
pub const SCHEDULED_SOURCE: &str = "SCHEDULE";

/// Non-null, and non-blank for strings and lists.
pub fn required() -> ValidationRule {
    ValidationRule::new("required", |value, _| match value {
        Value::Null => false,
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    })
}

/// A selection object carrying a non-empty `id`, or a non-empty list.
pub fn not_empty_selection() -> ValidationRule {
    ValidationRule::new("not_empty_selection", |value, _| match value {
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => match map.get("id") {
            Some(Value::String(id)) => !id.trim().is_empty(),
            Some(Value::Number(_)) => true,
            _ => false,
        },
        _ => false,
    })
}

/// Case-insensitive uniqueness against names already taken.
pub fn unique_name(existing: impl IntoIterator<Item = String>) -> ValidationRule {
    let taken: HashSet<String> = existing
        .into_iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    ValidationRule::new("unique_name", move |value, _| match value {
        Value::Null => true,
        Value::String(name) => !taken.contains(&name.trim().to_lowercase()),
        _ => false,
    })
}

/// Conflict status object reported clear (or not needed for this source).
pub fn no_scheduling_conflict() -> ValidationRule {
    ValidationRule::new("no_scheduling_conflict", |value, _| {
        matches!(
            value.get("status").and_then(Value::as_str),
            Some("clear") | Some("not_required")
        )
    })
}

/// The acting identity may schedule on the referenced capture agent.
///
/// An unset agent passes; `required` covers presence.
pub fn agent_access(identity: Arc<dyn IdentityProvider>, enforce: bool) -> ValidationRule {
    ValidationRule::new("agent_access", move |value, _| match value {
        Value::Null => true,
        Value::String(agent) if agent.is_empty() => true,
        Value::String(agent) => may_use_agent(identity.as_ref(), enforce, agent),
        _ => false,
    })
}

fn may_use_agent(identity: &dyn IdentityProvider, enforce: bool, agent: &str) -> bool {
    !enforce || identity.is_admin() || identity.has_role(&agent_capability_role(agent))
}

fn selected_items(value: &Value) -> Option<Vec<OptionItem>> {
    serde_json::from_value(value.clone()).ok()
}

/// Every selected event was scheduled, not uploaded.
pub fn scheduled_events_only() -> ValidationRule {
    ValidationRule::new("scheduled_events_only", |value, _| {
        selected_items(value).is_some_and(|items| {
            items
                .iter()
                .all(|item| item.attribute(EVENT_SOURCE) == Some(SCHEDULED_SOURCE))
        })
    })
}

/// The acting identity may use the capture agent of every selected event.
pub fn agents_accessible(identity: Arc<dyn IdentityProvider>, enforce: bool) -> ValidationRule {
    ValidationRule::new("agents_accessible", move |value, _| {
        selected_items(value).is_some_and(|items| {
            items.iter().all(|item| match item.attribute(EVENT_AGENT) {
                Some(agent) if !agent.is_empty() => {
                    may_use_agent(identity.as_ref(), enforce, agent)
                }
                _ => !enforce || identity.is_admin(),
            })
        })
    })
}

/// Every policy names a role and grants something; one grants read and write.
pub fn acl_policies_complete() -> ValidationRule {
    ValidationRule::new("acl_policies_complete", |value, _| {
        serde_json::from_value::<Vec<AclPolicy>>(value.clone())
            .map(|policies| AclVerdict::of(&policies).is_complete())
            .unwrap_or(false)
    })
}

/// ISO date not earlier than the ISO date at `other`. Missing dates pass.
pub fn date_not_before(other: impl Into<String>) -> ValidationRule {
    let other = other.into();
    ValidationRule::new("date_not_before", move |value, snapshot| {
        let this = match value {
            Value::Null => return true,
            Value::String(raw) if raw.is_empty() => return true,
            Value::String(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d"),
            _ => return false,
        };
        let earlier = match snapshot.lookup(&other) {
            Value::Null => return true,
            Value::String(raw) if raw.is_empty() => return true,
            Value::String(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d"),
            _ => return false,
        };
        match (this, earlier) {
            (Ok(this), Ok(earlier)) => this >= earlier,
            _ => false,
        }
    })
}
