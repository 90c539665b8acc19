//! Schema-driven form engine.
//!
//! Turns an ordered sequence of [`FieldSchema`]s into a [`CompiledForm`]
//! (a validator plus rendering metadata), then applies that validator to
//! user-submitted raw values. Pure logic, no database or network access.

pub mod compile;
pub mod field;
pub mod validate;

pub use compile::{compile, CompiledField, CompiledForm, SchemaError};
pub use field::{FieldConstraints, FieldKind, FieldSchema};
pub use validate::{validate, FieldError, ValidationResult};
