use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Preferences consumed by the wizard CLI and the reference collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    pub locale: String,
    #[serde(default)]
    pub scheduling: SchedulingDefaults,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub options: OptionLists,
    #[serde(default)]
    pub bookings: Vec<BookingEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Directory receiving submitted payloads. Defaults to `<data dir>/admin_wizard/submissions`.
    pub submission_dir: Option<PathBuf>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            locale: "en-US".into(),
            scheduling: SchedulingDefaults::default(),
            identity: IdentitySettings::default(),
            options: OptionLists::default(),
            bookings: Vec::new(),
            submission_dir: None,
        }
    }
}

impl WizardConfig {
    pub fn resolve_submission_dir(&self) -> PathBuf {
        if let Some(path) = &self.submission_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("admin_wizard").join("submissions")
    }
}

/// Organisation properties used to propose the next free recording slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingDefaults {
    #[serde(default = "SchedulingDefaults::default_start_time")]
    pub start_time: String,
    #[serde(default = "SchedulingDefaults::default_end_time")]
    pub end_time: String,
    #[serde(default = "SchedulingDefaults::default_duration_minutes")]
    pub duration_minutes: u32,
    #[serde(default = "SchedulingDefaults::default_interval_minutes")]
    pub interval_minutes: u32,
}

impl SchedulingDefaults {
    pub fn default_start_time() -> String {
        "08:00".into()
    }

    pub fn default_end_time() -> String {
        "20:00".into()
    }

    pub fn default_duration_minutes() -> u32 {
        55
    }

    pub fn default_interval_minutes() -> u32 {
        60
    }
}

impl Default for SchedulingDefaults {
    fn default() -> Self {
        Self {
            start_time: Self::default_start_time(),
            end_time: Self::default_end_time(),
            duration_minutes: Self::default_duration_minutes(),
            interval_minutes: Self::default_interval_minutes(),
        }
    }
}

/// The acting user as seen by the authorization checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySettings {
    #[serde(default = "IdentitySettings::default_username")]
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
    /// When false every capture agent is considered accessible.
    #[serde(default = "IdentitySettings::default_enforce_agent_access")]
    pub enforce_agent_access: bool,
}

impl IdentitySettings {
    pub fn default_username() -> String {
        "admin".into()
    }

    pub fn default_enforce_agent_access() -> bool {
        true
    }
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            username: Self::default_username(),
            roles: vec!["ROLE_ADMIN".into()],
            enforce_agent_access: Self::default_enforce_agent_access(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub name: String,
    pub value: String,
    /// Extra facts about the entry, e.g. `source` and `agent` of an event.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl OptionEntry {
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
}

/// Option lists served to multi-select steps when no remote backend is wired.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionLists {
    #[serde(default)]
    pub roles: Vec<OptionEntry>,
    #[serde(default)]
    pub users: Vec<OptionEntry>,
    #[serde(default)]
    pub capture_agents: Vec<OptionEntry>,
    #[serde(default)]
    pub locations: Vec<OptionEntry>,
    #[serde(default)]
    pub recipients: Vec<OptionEntry>,
    #[serde(default)]
    pub scheduled_events: Vec<OptionEntry>,
}

/// Existing reservation of a capture agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingEntry {
    pub device: String,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
