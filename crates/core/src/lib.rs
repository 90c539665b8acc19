//! Domain logic for the flowboard dashboard builder.
//!
//! Two engines live here, both pure functions over their inputs with no
//! I/O and no shared mutable state:
//!
//! - [`schema`] compiles declarative field schemas into validators and
//!   applies them to user-submitted raw values.
//! - [`render`] classifies arbitrary workflow output values into safe,
//!   structured render instructions.

pub mod dashboard;
pub mod error;
pub mod execution;
pub mod render;
pub mod schema;
pub mod types;
