use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;
use wizard_config::OptionLists;

use super::{OptionItem, OptionsKind, OptionsProvider};
use crate::errors::CollaboratorError;

/// Option lists held in memory, typically loaded from the configuration file.
#[derive(Debug, Clone, Default)]
pub struct StaticOptions {
    lists: HashMap<OptionsKind, Vec<OptionItem>>,
}

impl StaticOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(options: &OptionLists) -> Self {
        let convert = |entries: &[wizard_config::OptionEntry]| -> Vec<OptionItem> {
            entries.iter().map(OptionItem::from).collect()
        };
        Self::new()
            .with(OptionsKind::Roles, convert(&options.roles))
            .with(OptionsKind::Users, convert(&options.users))
            .with(OptionsKind::CaptureAgents, convert(&options.capture_agents))
            .with(OptionsKind::Locations, convert(&options.locations))
            .with(OptionsKind::Recipients, convert(&options.recipients))
            .with(OptionsKind::ScheduledEvents, convert(&options.scheduled_events))
    }

    pub fn with(mut self, kind: OptionsKind, items: Vec<OptionItem>) -> Self {
        self.lists.insert(kind, items);
        self
    }
}

#[async_trait]
impl OptionsProvider for StaticOptions {
    async fn fetch(&self, kind: OptionsKind) -> Result<Vec<OptionItem>, CollaboratorError> {
        let items = self.lists.get(&kind).cloned().unwrap_or_default();
        debug!(kind = kind.as_str(), count = items.len(), "serving static options");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wizard_config::OptionEntry;

    #[tokio::test]
    async fn serves_configured_lists() {
        let lists = OptionLists {
            roles: vec![OptionEntry::new("Admins", "ROLE_ADMIN")],
            ..OptionLists::default()
        };
        let provider = StaticOptions::from_config(&lists);
        let roles = provider.fetch(OptionsKind::Roles).await.unwrap();
        assert_eq!(roles, vec![OptionItem::new("Admins", "ROLE_ADMIN")]);
        assert!(provider.fetch(OptionsKind::Users).await.unwrap().is_empty());
    }
}
