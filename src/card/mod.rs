//! Welcome-card options and compositing.

pub(crate) mod compose;
pub(crate) mod layout;
/// Typed, defaulted card options.
pub mod options;
