#![doc(test(attr(deny(warnings))))]

//! Admin Wizard provides the multi-step creation wizards of a media platform
//! admin console: ordered step states, navigation gated by validity,
//! cross-step validation rules and a single terminal submission. Responses
//! to asynchronous requests that arrive after the user has moved on are
//! discarded instead of being written into the drafts.

pub mod cli;
pub mod collaborators;
pub mod errors;
pub mod flows;
pub mod scheduling;
pub mod steps;
pub mod utils;
pub mod validation;
pub mod wizard;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Admin wizard tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
