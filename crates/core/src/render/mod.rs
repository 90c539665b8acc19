//! Output rendering engine.
//!
//! Classifies arbitrary (possibly schema-described, possibly schema-less)
//! workflow output values into exactly one [`RenderPlan`] variant per
//! value. Never executes or interprets the value as code, and never emits
//! unsanitized markup. Stateless; safe to call concurrently.

pub mod classify;
pub mod plan;
pub mod sanitize;

pub use classify::classify;
pub use plan::RenderPlan;
pub use sanitize::sanitize_html;
