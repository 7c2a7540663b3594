//! wizard-config
//!
//! Operator preferences for the admin wizards: scheduling defaults, the acting
//! identity, option lists and known bookings used by the reference
//! collaborators. Owns the `WizardConfig` structure plus disk persistence.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{
    BookingEntry, IdentitySettings, OptionEntry, OptionLists, SchedulingDefaults, WizardConfig,
};
