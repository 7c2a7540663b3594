//! Factories for the wizards the admin console offers.
//!
//! Every call builds fresh step states, so each session starts from empty
//! drafts.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::collaborators::{
    CachedIdentity, Clock, IdentityProvider, OptionsKind, SystemClock, ADMIN_ROLE,
};
use crate::errors::WizardError;
use crate::scheduling::SlotProperties;
use crate::steps::{AccessStep, FieldsStep, SelectionStep, SourceStep, SummaryStep};
use crate::validation::rules;
use crate::validation::ValidationBridge;
use crate::wizard::{FieldDescriptor, FieldKind, StepRegistry, WizardController, WizardProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardKind {
    NewEvent,
    NewSeries,
    NewAcl,
    NewGroup,
    BulkMessage,
    UserBlacklist,
    LocationBlacklist,
    EditScheduledEvents,
}

impl WizardKind {
    pub const ALL: [WizardKind; 8] = [
        WizardKind::NewEvent,
        WizardKind::NewSeries,
        WizardKind::NewAcl,
        WizardKind::NewGroup,
        WizardKind::BulkMessage,
        WizardKind::UserBlacklist,
        WizardKind::LocationBlacklist,
        WizardKind::EditScheduledEvents,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardKind::NewEvent => "new-event",
            WizardKind::NewSeries => "new-series",
            WizardKind::NewAcl => "new-acl",
            WizardKind::NewGroup => "new-group",
            WizardKind::BulkMessage => "bulk-message",
            WizardKind::UserBlacklist => "user-blacklist",
            WizardKind::LocationBlacklist => "location-blacklist",
            WizardKind::EditScheduledEvents => "edit-scheduled-events",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardKind::NewEvent => "Create event",
            WizardKind::NewSeries => "Create series",
            WizardKind::NewAcl => "Create access policy template",
            WizardKind::NewGroup => "Create group",
            WizardKind::BulkMessage => "Send message",
            WizardKind::UserBlacklist => "Block users",
            WizardKind::LocationBlacklist => "Block locations",
            WizardKind::EditScheduledEvents => "Edit scheduled events",
        }
    }

    pub fn profile(&self) -> WizardProfile {
        match self {
            WizardKind::NewEvent => WizardProfile::new("event", "EVENT"),
            WizardKind::NewSeries => WizardProfile::new("series", "SERIES"),
            WizardKind::NewAcl => WizardProfile::new("acl", "ACL"),
            WizardKind::NewGroup => WizardProfile::new("group", "GROUP"),
            WizardKind::BulkMessage => WizardProfile::new("message", "MESSAGE"),
            WizardKind::UserBlacklist => WizardProfile::new("blacklist", "USER_BLACKLIST"),
            WizardKind::LocationBlacklist => {
                WizardProfile::new("blacklist", "LOCATION_BLACKLIST")
            }
            WizardKind::EditScheduledEvents => {
                WizardProfile::new("event_bulk_edit", "EVENTS_BULK_EDIT")
            }
        }
    }
}

impl fmt::Display for WizardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardKind {
    type Err = WizardError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| WizardError::UnknownWizard(raw.to_string()))
    }
}

/// Shared services and settings the flows are built with.
#[derive(Clone)]
pub struct FlowContext {
    pub identity: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
    pub slot: SlotProperties,
    pub enforce_agent_access: bool,
    /// Names already in use; new ACLs and groups must not reuse them.
    pub existing_names: Vec<String>,
}

impl FlowContext {
    pub fn new(identity: Arc<dyn IdentityProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            identity,
            clock,
            slot: SlotProperties::default(),
            enforce_agent_access: true,
            existing_names: Vec::new(),
        }
    }

    pub fn with_slot(mut self, slot: SlotProperties) -> Self {
        self.slot = slot;
        self
    }

    pub fn with_agent_access(mut self, enforce: bool) -> Self {
        self.enforce_agent_access = enforce;
        self
    }

    pub fn with_existing_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.existing_names = names.into_iter().collect();
        self
    }
}

impl Default for FlowContext {
    /// Administrator identity on the system clock.
    fn default() -> Self {
        let identity = CachedIdentity::new("admin", vec![ADMIN_ROLE.to_string()]);
        Self::new(Arc::new(identity), Arc::new(SystemClock))
    }
}

fn name_field() -> FieldDescriptor {
    FieldDescriptor::new("name", "Name", FieldKind::Text)
}

fn description_field() -> FieldDescriptor {
    FieldDescriptor::new("description", "Description", FieldKind::Text).with_optional()
}

/// Fresh step states for `kind`, in wizard order.
pub fn build(kind: WizardKind, ctx: &FlowContext) -> StepRegistry {
    match kind {
        WizardKind::NewEvent => StepRegistry::new()
            .with_step(
                "metadata",
                "Metadata",
                FieldsStep::new(vec![
                    FieldDescriptor::new("title", "Title", FieldKind::Text),
                    description_field(),
                    FieldDescriptor::new("presenters", "Presenters", FieldKind::List)
                        .with_optional(),
                ]),
            )
            .with_step(
                "source",
                "Source",
                SourceStep::new(ctx.clock.clone(), ctx.slot),
            )
            .with_step("access", "Access policy", AccessStep::new())
            .with_step("summary", "Summary", SummaryStep::new()),
        WizardKind::NewSeries => StepRegistry::new()
            .with_step(
                "metadata",
                "Metadata",
                FieldsStep::new(vec![
                    FieldDescriptor::new("title", "Title", FieldKind::Text),
                    description_field(),
                    FieldDescriptor::new("organizers", "Organizers", FieldKind::List)
                        .with_optional(),
                ]),
            )
            .with_step("access", "Access policy", AccessStep::new())
            .with_step("summary", "Summary", SummaryStep::new()),
        WizardKind::NewAcl => StepRegistry::new()
            .with_step("metadata", "Metadata", FieldsStep::new(vec![name_field()]))
            .with_step("access", "Access policy", AccessStep::new())
            .with_step("summary", "Summary", SummaryStep::new()),
        WizardKind::NewGroup => StepRegistry::new()
            .with_step(
                "metadata",
                "Metadata",
                FieldsStep::new(vec![name_field(), description_field()]),
            )
            .with_step("roles", "Roles", SelectionStep::new(OptionsKind::Roles, "Roles"))
            .with_step("users", "Users", SelectionStep::new(OptionsKind::Users, "Users"))
            .with_step("summary", "Summary", SummaryStep::new()),
        WizardKind::BulkMessage => StepRegistry::new()
            .with_step(
                "recipients",
                "Recipients",
                SelectionStep::new(OptionsKind::Recipients, "Recipients"),
            )
            .with_step(
                "message",
                "Message",
                FieldsStep::new(vec![
                    FieldDescriptor::new("subject", "Subject", FieldKind::Text),
                    FieldDescriptor::new("body", "Body", FieldKind::Text),
                ]),
            )
            .with_step("summary", "Summary", SummaryStep::new()),
        WizardKind::UserBlacklist | WizardKind::LocationBlacklist => {
            let (options, label) = if kind == WizardKind::UserBlacklist {
                (OptionsKind::Users, "Users")
            } else {
                (OptionsKind::Locations, "Locations")
            };
            StepRegistry::new()
                .with_step("items", label, SelectionStep::new(options, label))
                .with_step(
                    "reason",
                    "Reason",
                    FieldsStep::new(vec![
                        FieldDescriptor::new("reason", "Reason", FieldKind::Text),
                        FieldDescriptor::new("comment", "Comment", FieldKind::Text)
                            .with_optional(),
                        FieldDescriptor::new("start_date", "From", FieldKind::Date),
                        FieldDescriptor::new("end_date", "Until", FieldKind::Date),
                    ]),
                )
                .with_step("summary", "Summary", SummaryStep::new())
        }
        // Blank metadata keeps each event's own value.
        WizardKind::EditScheduledEvents => StepRegistry::new()
            .with_step(
                "events",
                "Events",
                SelectionStep::new(OptionsKind::ScheduledEvents, "Events").with_min_selected(1),
            )
            .with_step(
                "scheduling",
                "Scheduling",
                SourceStep::scheduled(ctx.clock.clone(), ctx.slot),
            )
            .with_step(
                "metadata",
                "Metadata",
                FieldsStep::new(vec![
                    FieldDescriptor::new("title", "Title", FieldKind::Text).with_optional(),
                    FieldDescriptor::new("series", "Series", FieldKind::Text).with_optional(),
                ]),
            )
            .with_step("summary", "Summary", SummaryStep::new()),
    }
}

/// Cross-step and field-level rules for `kind`.
pub fn validators(kind: WizardKind, ctx: &FlowContext) -> ValidationBridge {
    let mut bridge = ValidationBridge::new();
    match kind {
        WizardKind::NewEvent => {
            bridge
                .register_validator("metadata/title", rules::required())
                .register_validator("source/conflicts", rules::no_scheduling_conflict())
                .register_validator(
                    "source/schedule/device",
                    rules::agent_access(ctx.identity.clone(), ctx.enforce_agent_access),
                )
                .register_validator("access/policies", rules::acl_policies_complete());
        }
        WizardKind::NewSeries => {
            bridge
                .register_validator("metadata/title", rules::required())
                .register_validator("access/policies", rules::acl_policies_complete());
        }
        WizardKind::NewAcl => {
            bridge
                .register_validator("metadata/name", rules::required())
                .register_validator(
                    "metadata/name",
                    rules::unique_name(ctx.existing_names.clone()),
                )
                .register_validator("access/policies", rules::acl_policies_complete());
        }
        WizardKind::NewGroup => {
            bridge
                .register_validator("metadata/name", rules::required())
                .register_validator(
                    "metadata/name",
                    rules::unique_name(ctx.existing_names.clone()),
                );
        }
        WizardKind::BulkMessage => {
            bridge.register_validator("recipients/selected", rules::not_empty_selection());
        }
        WizardKind::UserBlacklist | WizardKind::LocationBlacklist => {
            bridge
                .register_validator("items/selected", rules::not_empty_selection())
                .register_validator(
                    "reason/end_date",
                    rules::date_not_before("reason/start_date"),
                );
        }
        WizardKind::EditScheduledEvents => {
            bridge
                .register_validator("events/selected", rules::not_empty_selection())
                .register_validator("events/selected", rules::scheduled_events_only())
                .register_validator(
                    "events/selected",
                    rules::agents_accessible(ctx.identity.clone(), ctx.enforce_agent_access),
                )
                .register_validator("scheduling/conflicts", rules::no_scheduling_conflict())
                .register_validator(
                    "scheduling/schedule/device",
                    rules::agent_access(ctx.identity.clone(), ctx.enforce_agent_access),
                );
        }
    }
    bridge
}

pub fn controller(kind: WizardKind, ctx: &FlowContext) -> Result<WizardController, WizardError> {
    WizardController::new(kind.profile(), build(kind, ctx), validators(kind, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_names() {
        for kind in WizardKind::ALL {
            assert_eq!(kind.as_str().parse::<WizardKind>().unwrap(), kind);
        }
        assert!("new-thing".parse::<WizardKind>().is_err());
    }

    #[test]
    fn every_flow_builds_and_ends_in_summary() {
        let ctx = FlowContext::default();
        for kind in WizardKind::ALL {
            let registry = build(kind, &ctx);
            assert!(registry.len() >= 3, "{kind} is too short");
            assert_eq!(registry.get().last().map(|step| step.name()), Some("summary"));
            assert!(controller(kind, &ctx).is_ok());
        }
    }

    #[test]
    fn bridge_fields_belong_to_declared_steps() {
        let ctx = FlowContext::default();
        for kind in WizardKind::ALL {
            let registry = build(kind, &ctx);
            for field in validators(kind, &ctx).fields() {
                let step = field.split('/').next().unwrap_or_default();
                assert!(registry.position(step).is_some(), "{kind}: {field}");
            }
        }
    }
}
