use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{SubmitReceipt, Submitter};
use crate::errors::{CollaboratorError, HTTP_CONFLICT};

const HTTP_NOT_FOUND: u16 = 404;

/// Resources whose names must be unique. Events and series may share titles.
const NAMED_RESOURCES: [&str; 2] = ["acl", "group"];

/// Stored form of a submitted wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSubmission {
    pub id: String,
    pub resource: String,
    pub submitted_at: String,
    pub payload: Value,
}

impl StoredSubmission {
    /// `metadata/name`, or `metadata/title` for resources without a name.
    pub fn name(&self) -> Option<&str> {
        display_name(&self.payload)
    }
}

/// Writes every submission as `<resource>_<id>.json` below a directory.
///
/// Creating an ACL or group whose name matches an existing one of the same
/// resource is refused with a conflict.
#[derive(Debug, Clone)]
pub struct JsonFileSubmitter {
    dir: PathBuf,
}

impl JsonFileSubmitter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, resource: &str, id: &str) -> PathBuf {
        self.dir.join(format!("{resource}_{id}.json"))
    }

    /// Submissions stored for `resource`, in file name order. Files that
    /// cannot be read or parsed are skipped.
    pub fn list(&self, resource: &str) -> Result<Vec<StoredSubmission>, CollaboratorError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let prefix = format!("{resource}_");
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(&prefix) && name.ends_with(".json"));
            if matches {
                paths.push(path);
            }
        }
        paths.sort();
        let mut stored = Vec::with_capacity(paths.len());
        for path in &paths {
            match read_submission(path) {
                // `event_` also prefixes `event_bulk_edit_` files
                Ok(submission) if submission.resource == resource => stored.push(submission),
                Ok(_) => {}
                Err(err) => warn!(
                    path = %path.display(),
                    error = %err,
                    "skipping unreadable submission"
                ),
            }
        }
        Ok(stored)
    }

    /// Names taken by stored `resource` entities, leaving out the entity
    /// with id `exempt` (the one being edited).
    pub fn names_in_use(
        &self,
        resource: &str,
        exempt: Option<&str>,
    ) -> Result<Vec<String>, CollaboratorError> {
        Ok(self
            .list(resource)?
            .iter()
            .filter(|stored| Some(stored.id.as_str()) != exempt)
            .filter_map(|stored| stored.name().map(str::to_string))
            .collect())
    }

    fn write(&self, record: &StoredSubmission) -> Result<PathBuf, CollaboratorError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&record.resource, &record.id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(record)?;
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(path)
    }

    fn receipt(record: &StoredSubmission, path: &Path) -> SubmitReceipt {
        SubmitReceipt {
            id: record.id.clone(),
            location: Some(path.display().to_string()),
        }
    }
}

fn read_submission(path: &Path) -> Result<StoredSubmission, CollaboratorError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn display_name(payload: &Value) -> Option<&str> {
    ["/metadata/name", "/metadata/title"]
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_str))
}

fn natural_key(payload: &Value) -> Option<String> {
    display_name(payload)
        .map(|key| key.trim().to_lowercase())
        .filter(|key| !key.is_empty())
}

#[async_trait]
impl Submitter for JsonFileSubmitter {
    async fn create(
        &self,
        resource: &str,
        payload: &Value,
    ) -> Result<SubmitReceipt, CollaboratorError> {
        let named = NAMED_RESOURCES.contains(&resource);
        if let Some(key) = natural_key(payload).filter(|_| named) {
            let taken = self
                .list(resource)?
                .iter()
                .any(|stored| natural_key(&stored.payload).as_deref() == Some(key.as_str()));
            if taken {
                debug!(resource, key = %key, "refusing duplicate submission");
                return Err(CollaboratorError::Status {
                    status: HTTP_CONFLICT,
                    message: format!("a {resource} named `{key}` already exists"),
                });
            }
        }

        let record = StoredSubmission {
            id: Uuid::new_v4().to_string(),
            resource: resource.to_string(),
            submitted_at: Utc::now().to_rfc3339(),
            payload: payload.clone(),
        };
        let path = self.write(&record)?;
        info!(resource, id = %record.id, "submission stored");
        Ok(Self::receipt(&record, &path))
    }

    async fn save(
        &self,
        resource: &str,
        id: &str,
        payload: &Value,
    ) -> Result<SubmitReceipt, CollaboratorError> {
        if !self.path_for(resource, id).exists() {
            return Err(CollaboratorError::Status {
                status: HTTP_NOT_FOUND,
                message: format!("no {resource} with id {id}"),
            });
        }
        let record = StoredSubmission {
            id: id.to_string(),
            resource: resource.to_string(),
            submitted_at: Utc::now().to_rfc3339(),
            payload: payload.clone(),
        };
        let path = self.write(&record)?;
        info!(resource, id, "submission updated");
        Ok(Self::receipt(&record, &path))
    }
}
