//! Multi-step wizard core: step contract, registry, controller and the
//! bookkeeping that keeps late asynchronous responses out of the drafts.

pub mod controller;
pub mod draft;
pub mod form;
pub mod generation;
pub mod notifications;
pub mod registry;
pub mod step;

pub use controller::{
    ApplyOutcome, ConflictRequest, ConflictResponse, FieldStatus, OptionsRequest,
    OptionsResponse, SubmitTarget, Transition, WizardController, WizardProfile, WizardState,
};
pub use draft::WizardDraft;
pub use form::{FieldDescriptor, FieldKind};
pub use generation::{GenerationTracker, Ticket};
pub use notifications::{
    Notification, NotificationLevel, Notifications, STEP_CONTEXT, SUBMISSION_CONTEXT,
};
pub use registry::{StepDescriptor, StepRegistry};
pub use step::{Notice, StepState};
