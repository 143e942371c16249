use serde_json::Value;

use crate::foundation::core::JsonType;
use crate::foundation::error::{WelcardError, WelcardResult};
use crate::schema::color::is_valid_color;

/// Allowed values for `gradientDirection`.
pub const GRADIENT_DIRECTIONS: &[&str] = &["horizontal", "vertical", "diagonal"];

const STRING: &[JsonType] = &[JsonType::String];
const BOOLEAN: &[JsonType] = &[JsonType::Boolean];
const NUMBER: &[JsonType] = &[JsonType::Number];
const COLOR: &[JsonType] = &[JsonType::String, JsonType::Array, JsonType::Object];

/// Recognized option keys in check order, with the JSON types each accepts.
pub const OPTION_KEYS: &[(&str, &[JsonType])] = &[
    ("username", STRING),
    ("avatarURL", STRING),
    ("backgroundURL", STRING),
    ("circularAvatar", BOOLEAN),
    ("showDate", BOOLEAN),
    ("border", BOOLEAN),
    ("borderColor", COLOR),
    ("gradientDirection", STRING),
    ("maxNameLength", NUMBER),
    ("welcomeText", STRING),
    ("blurBackground", BOOLEAN),
];

/// Validate a raw option bag.
///
/// Keys are checked in [`OPTION_KEYS`] order and the first failure is returned. Absent keys are
/// skipped and unknown keys are ignored; no defaults are applied here.
pub fn validate_options(options: &Value) -> WelcardResult<()> {
    let Value::Object(map) = options else {
        return Err(WelcardError::InvalidInput {
            actual: JsonType::of(options),
        });
    };

    for &(key, expected) in OPTION_KEYS {
        let Some(value) = map.get(key) else {
            continue;
        };

        let actual = JsonType::of(value);
        if !expected.contains(&actual) {
            return Err(WelcardError::TypeMismatch {
                key,
                expected: expected.to_vec(),
                actual,
            });
        }

        match key {
            "gradientDirection" => check_gradient_direction(key, value)?,
            "avatarURL" | "backgroundURL" => check_url(key, value)?,
            "borderColor" => check_color(key, value)?,
            _ => {}
        }
    }

    Ok(())
}

fn check_gradient_direction(key: &'static str, value: &Value) -> WelcardResult<()> {
    let s = value.as_str().unwrap_or_default();
    if GRADIENT_DIRECTIONS.contains(&s) {
        return Ok(());
    }
    Err(WelcardError::InvalidEnum {
        key,
        allowed: GRADIENT_DIRECTIONS,
        actual: s.to_owned(),
    })
}

fn check_url(key: &'static str, value: &Value) -> WelcardResult<()> {
    let s = value.as_str().unwrap_or_default();
    match url::Url::parse(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(WelcardError::InvalidUrl {
            key,
            value: s.to_owned(),
        }),
    }
}

fn check_color(key: &'static str, value: &Value) -> WelcardResult<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                if !value_is_color(item) {
                    return Err(WelcardError::InvalidColor {
                        key,
                        value: display_value(item),
                        in_sequence: true,
                    });
                }
            }
            Ok(())
        }
        other if value_is_color(other) => Ok(()),
        other => Err(WelcardError::InvalidColor {
            key,
            value: display_value(other),
            in_sequence: false,
        }),
    }
}

fn value_is_color(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_color)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
