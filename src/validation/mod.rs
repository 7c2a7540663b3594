pub mod bridge;
pub mod rules;

pub use bridge::{Predicate, ValidationBridge, ValidationRule};
