use serde::Serialize;
use uuid::Uuid;

/// Context for outcome notifications of a submission.
pub const SUBMISSION_CONTEXT: &str = "wizard";
/// Context for notices raised by the active step.
pub const STEP_CONTEXT: &str = "wizard-step";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub key: String,
    pub context: String,
}

/// Keyed, contextual user messages. Adding a key that is already shown in
/// the same context returns the existing entry.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    items: Vec<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, level: NotificationLevel, key: impl Into<String>, context: &str) -> Uuid {
        let key = key.into();
        if let Some(existing) = self
            .items
            .iter()
            .find(|item| item.key == key && item.context == context)
        {
            return existing.id;
        }
        let id = Uuid::new_v4();
        self.items.push(Notification {
            id,
            level,
            key,
            context: context.to_string(),
        });
        id
    }

    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear_context(&mut self, context: &str) {
        self.items.retain(|item| item.context != context);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
