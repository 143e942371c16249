//! Boundary validation for the raw JSON option bag.
//!
//! This module checks the untyped options before they are deserialized and defaulted.

pub(crate) mod color;
pub(crate) mod validate;
