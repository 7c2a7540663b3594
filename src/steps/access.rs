use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::FieldError;
use crate::wizard::{FieldDescriptor, FieldKind, Notice, StepState, WizardDraft};

pub const INVALID_ACL_RULES: &str = "INVALID_ACL_RULES";
pub const MISSING_ACL_RULES: &str = "MISSING_ACL_RULES";

/// One access rule: a role and what it may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclPolicy {
    pub role: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub actions: Vec<String>,
}

impl AclPolicy {
    pub fn new(role: impl Into<String>, read: bool, write: bool) -> Self {
        Self {
            role: role.into(),
            read,
            write,
            actions: Vec::new(),
        }
    }

    /// Names a role and grants at least one of read or write.
    pub fn is_well_formed(&self) -> bool {
        !self.role.trim().is_empty() && (self.read || self.write)
    }
}

/// Assessment of a policy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AclVerdict {
    pub has_rules: bool,
    pub all_well_formed: bool,
    pub has_full_access: bool,
}

impl AclVerdict {
    pub fn of(policies: &[AclPolicy]) -> Self {
        Self {
            has_rules: !policies.is_empty(),
            all_well_formed: policies.iter().all(AclPolicy::is_well_formed),
            has_full_access: policies
                .iter()
                .any(|policy| policy.is_well_formed() && policy.read && policy.write),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.has_rules && self.all_well_formed && self.has_full_access
    }
}

/// Access rules attached to the created entity.
///
/// The step itself only insists on well-formed rules; completeness (somebody
/// can read and write) is a bridge rule so it is reported together with other
/// cross-step checks.
#[derive(Debug, Clone, Default)]
pub struct AccessStep {
    template: Option<String>,
    policies: Vec<AclPolicy>,
}

impl AccessStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policies(&self) -> &[AclPolicy] {
        &self.policies
    }

    /// Adds a rule, replacing any existing rule for the same role.
    pub fn upsert(&mut self, policy: AclPolicy) {
        match self
            .policies
            .iter()
            .position(|existing| existing.role == policy.role)
        {
            Some(idx) => self.policies[idx] = policy,
            None => self.policies.push(policy),
        }
    }

    pub fn remove(&mut self, role: &str) -> bool {
        let before = self.policies.len();
        self.policies.retain(|policy| policy.role != role);
        self.policies.len() != before
    }
}

impl StepState for AccessStep {
    fn draft(&self) -> Value {
        json!({
            "template": self.template,
            "policies": self.policies,
        })
    }

    fn is_valid(&self, _snapshot: &WizardDraft) -> bool {
        self.policies.iter().all(AclPolicy::is_well_formed)
    }

    fn reset(&mut self) {
        self.template = None;
        self.policies.clear();
    }

    fn fields(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("policies", "Access rules", FieldKind::Policies).with_help(
                "Comma separated ROLE:flags[:action|action], e.g. ROLE_ADMIN:rw, ROLE_USER:r",
            ),
            FieldDescriptor::new("template", "ACL template", FieldKind::Text).with_optional(),
        ]
    }

    fn set_field(&mut self, field: &str, value: Value) -> Result<(), FieldError> {
        match field {
            "policies" => {
                self.policies = serde_json::from_value(value)
                    .map_err(|err| FieldError::new(format!("Invalid access rules: {err}")))?;
                Ok(())
            }
            "template" => {
                self.template = match value {
                    Value::Null => None,
                    Value::String(id) if id.trim().is_empty() => None,
                    Value::String(id) => Some(id.trim().to_string()),
                    other => {
                        return Err(FieldError::new(format!("Unexpected template id {other}")))
                    }
                };
                Ok(())
            }
            other => Err(FieldError::new(format!("Unknown field `{other}`"))),
        }
    }

    fn describe(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .policies
            .iter()
            .map(|policy| {
                let mut grants = Vec::new();
                if policy.read {
                    grants.push("read");
                }
                if policy.write {
                    grants.push("write");
                }
                let mut line = format!("{}: {}", policy.role, grants.join("+"));
                if !policy.actions.is_empty() {
                    line.push_str(&format!(" ({})", policy.actions.join(", ")));
                }
                line
            })
            .collect();
        if let Some(template) = &self.template {
            lines.insert(0, format!("Template: {template}"));
        }
        lines
    }

    fn notices(&self, _snapshot: &WizardDraft) -> Vec<Notice> {
        let verdict = AclVerdict::of(&self.policies);
        let mut notices = Vec::new();
        if !verdict.all_well_formed {
            notices.push(Notice::warning(INVALID_ACL_RULES));
        }
        if !verdict.has_full_access {
            notices.push(Notice::warning(MISSING_ACL_RULES));
        }
        notices
    }
}
