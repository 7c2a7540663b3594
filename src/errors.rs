use std::fmt;

use thiserror::Error;

use crate::scheduling::Booking;

/// Misuse or misconfiguration of a wizard session.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Wizard `{0}` has no steps configured")]
    NoSteps(String),
    #[error("Unknown wizard: {0}")]
    UnknownWizard(String),
    #[error("Step `{0}` is registered more than once")]
    DuplicateStep(String),
    #[error("Unknown step: {0}")]
    UnknownStep(String),
    #[error("Step {index} ({name}) is not valid")]
    StepInvalid { index: usize, name: String },
    #[error("Submission is only available from the final step (currently at step {0})")]
    NotAtFinalStep(usize),
    #[error("Wizard is not open")]
    NotOpen,
    #[error("Invalid value for `{field}`: {source}")]
    Field {
        field: String,
        #[source]
        source: FieldError,
    },
    #[error("Submission failed: {0}")]
    Submission(#[from] CollaboratorError),
}

/// Failure reported by an external collaborator (REST backend, identity
/// service, file sink).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Collaborator unreachable: {0}")]
    Unreachable(String),
    #[error("Request rejected with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Conflicts with {} existing booking(s)", .0.len())]
    Conflict(Vec<Booking>),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub const HTTP_CONFLICT: u16 = 409;

impl CollaboratorError {
    /// HTTP-equivalent status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            CollaboratorError::Status { status, .. } => Some(*status),
            CollaboratorError::Conflict(_) => Some(HTTP_CONFLICT),
            _ => None,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(HTTP_CONFLICT)
    }
}

/// Failures surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] wizard_config::ConfigError),
    #[error(transparent)]
    Wizard(#[from] WizardError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub message: String,
}

impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for FieldError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_variants_report_409() {
        assert!(CollaboratorError::Conflict(Vec::new()).is_conflict());
        assert!(CollaboratorError::Status {
            status: 409,
            message: "exists".into()
        }
        .is_conflict());
        assert!(!CollaboratorError::Unreachable("timeout".into()).is_conflict());
        assert_eq!(
            CollaboratorError::Status {
                status: 500,
                message: "boom".into()
            }
            .status(),
            Some(500)
        );
    }
}
