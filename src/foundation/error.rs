use std::fmt;

use crate::foundation::core::JsonType;

/// Convenience result type used across welcard.
pub type WelcardResult<T> = Result<T, WelcardError>;

/// Top-level error taxonomy used by card APIs.
///
/// Validation variants carry the offending key and values as structured fields; the `Display`
/// implementation is the only place the human-readable messages are assembled.
#[derive(thiserror::Error, Debug)]
pub enum WelcardError {
    /// The option bag is not a JSON object.
    #[error("options must be an object, got: {actual}")]
    InvalidInput {
        /// Type of the value that was supplied instead.
        actual: JsonType,
    },

    /// A recognized option has the wrong JSON type.
    #[error("option '{key}' must be of type {}, got: {actual}", ExpectedTypes(.expected))]
    TypeMismatch {
        /// Option key.
        key: &'static str,
        /// Accepted types for the key.
        expected: Vec<JsonType>,
        /// Type of the supplied value.
        actual: JsonType,
    },

    /// An enumerated option holds a value outside its allowed set.
    #[error("'{key}' must be one of: {}, got: '{actual}'", .allowed.join(", "))]
    InvalidEnum {
        /// Option key.
        key: &'static str,
        /// Allowed values.
        allowed: &'static [&'static str],
        /// Supplied value.
        actual: String,
    },

    /// A URL option is not a well-formed absolute URL.
    #[error("'{key}' must be a valid URL, got: '{value}'")]
    InvalidUrl {
        /// Option key.
        key: &'static str,
        /// Supplied value.
        value: String,
    },

    /// A color option (or one element of a color sequence) fails the color grammar.
    #[error("{}", invalid_color_message(.key, .value, .in_sequence))]
    InvalidColor {
        /// Option key.
        key: &'static str,
        /// Offending value, rendered as JSON text when it is not a string.
        value: String,
        /// `true` when the value is one element of a sequence.
        in_sequence: bool,
    },

    /// A required option was absent when defaults were applied.
    #[error("missing required option '{key}'")]
    MissingOption {
        /// Option key.
        key: &'static str,
    },

    /// The background or avatar image could not be fetched or decoded.
    #[error("failed to acquire image '{url}': {reason}")]
    ImageAcquisition {
        /// Source URL.
        url: String,
        /// Underlying failure description.
        reason: String,
    },

    /// The drawing surface could not be allocated.
    #[error("surface creation error: {0}")]
    SurfaceCreation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WelcardError {
    /// Build a [`WelcardError::ImageAcquisition`] value.
    pub fn image(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::ImageAcquisition {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`WelcardError::SurfaceCreation`] value.
    pub fn surface(msg: impl Into<String>) -> Self {
        Self::SurfaceCreation(msg.into())
    }

    /// Return `true` for errors raised while checking or defaulting options.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::TypeMismatch { .. }
                | Self::InvalidEnum { .. }
                | Self::InvalidUrl { .. }
                | Self::InvalidColor { .. }
                | Self::MissingOption { .. }
        )
    }

    /// Option key the error refers to, if any.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            Self::TypeMismatch { key, .. }
            | Self::InvalidEnum { key, .. }
            | Self::InvalidUrl { key, .. }
            | Self::InvalidColor { key, .. }
            | Self::MissingOption { key } => Some(*key),
            _ => None,
        }
    }
}

struct ExpectedTypes<'a>(&'a [JsonType]);

impl fmt::Display for ExpectedTypes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" or ")?;
            }
            write!(f, "{t}")?;
        }
        Ok(())
    }
}

fn invalid_color_message(key: &str, value: &str, in_sequence: &bool) -> String {
    if *in_sequence {
        format!("one of the colors in '{key}' is not valid: '{value}'")
    } else {
        format!("'{key}' must be a valid color in '#hex' or 'rgba()' format, got: '{value}'")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
