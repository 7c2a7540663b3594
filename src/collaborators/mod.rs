//! External services the wizard calls into, plus in-process implementations
//! used by the command line front end and the tests.

pub mod calendar;
pub mod identity;
pub mod json_submitter;
pub mod static_options;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wizard_config::OptionEntry;

use crate::errors::CollaboratorError;
use crate::scheduling::{Booking, ConflictQuery};

pub use calendar::BookingCalendar;
pub use identity::{CachedIdentity, ConfigIdentitySource};
pub use json_submitter::JsonFileSubmitter;
pub use static_options::StaticOptions;

pub const ADMIN_ROLE: &str = "ROLE_ADMIN";

/// One entry of a selectable options list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionItem {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl OptionItem {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

impl From<&OptionEntry> for OptionItem {
    fn from(entry: &OptionEntry) -> Self {
        Self {
            name: entry.name.clone(),
            value: entry.value.clone(),
            attributes: entry.attributes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionsKind {
    Roles,
    Users,
    CaptureAgents,
    Locations,
    Recipients,
    /// Events with their `source` and capture `agent` as attributes.
    ScheduledEvents,
}

impl OptionsKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionsKind::Roles => "roles",
            OptionsKind::Users => "users",
            OptionsKind::CaptureAgents => "capture_agents",
            OptionsKind::Locations => "locations",
            OptionsKind::Recipients => "recipients",
            OptionsKind::ScheduledEvents => "scheduled_events",
        }
    }
}

/// Acknowledgement returned by a successful create or save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub id: String,
    pub location: Option<String>,
}

/// Terminal create/save call for a wizard's aggregated payload.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn create(&self, resource: &str, payload: &Value)
        -> Result<SubmitReceipt, CollaboratorError>;

    async fn save(
        &self,
        resource: &str,
        id: &str,
        payload: &Value,
    ) -> Result<SubmitReceipt, CollaboratorError>;
}

#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn fetch(&self, kind: OptionsKind) -> Result<Vec<OptionItem>, CollaboratorError>;
}

/// Returns the bookings a proposed schedule collides with; empty means free.
#[async_trait]
pub trait ConflictChecker: Send + Sync {
    async fn check(&self, query: &ConflictQuery) -> Result<Vec<Booking>, CollaboratorError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub username: String,
    pub roles: Vec<String>,
}

/// Remote source of the acting user's roles.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    async fn fetch(&self) -> Result<IdentityRecord, CollaboratorError>;
}

/// Synchronous capability queries against an already loaded identity.
pub trait IdentityProvider: Send + Sync {
    fn has_role(&self, role: &str) -> bool;

    fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }
}

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
