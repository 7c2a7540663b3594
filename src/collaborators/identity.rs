use std::collections::BTreeSet;

use async_trait::async_trait;
use tracing::warn;
use wizard_config::IdentitySettings;

use super::{IdentityProvider, IdentityRecord, IdentitySource};
use crate::errors::CollaboratorError;

/// Roles fetched once and answered synchronously afterwards.
#[derive(Debug, Clone, Default)]
pub struct CachedIdentity {
    username: Option<String>,
    roles: BTreeSet<String>,
}

impl CachedIdentity {
    pub fn new(username: impl Into<String>, roles: impl IntoIterator<Item = String>) -> Self {
        Self {
            username: Some(username.into()),
            roles: roles.into_iter().collect(),
        }
    }

    /// No user, no roles. Every capability query answers `false`.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Falls back to [`CachedIdentity::anonymous`] when the source fails.
    pub async fn load(source: &dyn IdentitySource) -> Self {
        match source.fetch().await {
            Ok(record) => Self::new(record.username, record.roles),
            Err(err) => {
                warn!(error = %err, "identity unavailable, continuing without roles");
                Self::anonymous()
            }
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

impl IdentityProvider for CachedIdentity {
    fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// Identity source backed by the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigIdentitySource {
    settings: IdentitySettings,
}

impl ConfigIdentitySource {
    pub fn new(settings: IdentitySettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl IdentitySource for ConfigIdentitySource {
    async fn fetch(&self) -> Result<IdentityRecord, CollaboratorError> {
        Ok(IdentityRecord {
            username: self.settings.username.clone(),
            roles: self.settings.roles.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    #[async_trait]
    impl IdentitySource for Offline {
        async fn fetch(&self) -> Result<IdentityRecord, CollaboratorError> {
            Err(CollaboratorError::Unreachable("identity service".into()))
        }
    }

    #[tokio::test]
    async fn loads_roles_from_config() {
        let source = ConfigIdentitySource::new(IdentitySettings {
            username: "jane".into(),
            roles: vec!["ROLE_CAPTURE_AGENT_ROOM1".into()],
            enforce_agent_access: true,
        });
        let identity = CachedIdentity::load(&source).await;
        assert_eq!(identity.username(), Some("jane"));
        assert!(identity.has_role("ROLE_CAPTURE_AGENT_ROOM1"));
        assert!(!identity.is_admin());
    }

    #[tokio::test]
    async fn unreachable_source_degrades_to_anonymous() {
        let identity = CachedIdentity::load(&Offline).await;
        assert_eq!(identity.username(), None);
        assert!(!identity.is_admin());
    }
}
