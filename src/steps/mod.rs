//! Concrete step states the flows are assembled from.

pub mod access;
pub mod fields;
pub mod selection;
pub mod source;
pub mod summary;

pub use access::{AccessStep, AclPolicy, AclVerdict};
pub use fields::FieldsStep;
pub use selection::SelectionStep;
pub use source::{ConflictStatus, SourceKind, SourceStep, Track};
pub use summary::SummaryStep;
