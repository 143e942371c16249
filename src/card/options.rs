use serde::Deserialize;
use serde_json::Value;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{WelcardError, WelcardResult};
use crate::schema::color::parse_color;
use crate::schema::validate::validate_options;

/// Default border color: translucent white.
pub const DEFAULT_BORDER_COLOR: &str = "rgba(255, 255, 255, 0.56)";
/// Default truncation threshold for the display name, in characters.
pub const DEFAULT_MAX_NAME_LENGTH: usize = 11;
/// Default welcome line.
pub const DEFAULT_WELCOME_TEXT: &str = "Bienvenido/a";

/// Boundary option bag with every field optional, as read from JSON.
///
/// Only meaningful after [`validate_options`] accepted the raw value it was built from.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOptionsDef {
    /// Raw display name.
    pub username: Option<String>,
    /// Avatar image URL.
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
    /// Background image URL.
    #[serde(rename = "backgroundURL")]
    pub background_url: Option<String>,
    /// Circle (`true`) or rounded-square avatar mask.
    pub circular_avatar: Option<bool>,
    /// Draw the date badge.
    pub show_date: Option<bool>,
    /// Stroke the card border.
    pub border: Option<bool>,
    /// One color or a list of gradient colors.
    pub border_color: Option<BorderColorDef>,
    /// Gradient axis name.
    pub gradient_direction: Option<GradientDirection>,
    /// Truncation threshold for the display name.
    pub max_name_length: Option<f64>,
    /// Welcome line drawn under the name.
    pub welcome_text: Option<String>,
    /// Blur the background image.
    pub blur_background: Option<bool>,
}

/// `borderColor` as it appears in JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BorderColorDef {
    /// A single color string.
    One(String),
    /// A sequence of color strings.
    Many(Vec<String>),
}

/// Axis of the border gradient.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientDirection {
    /// Left to right.
    #[default]
    Horizontal,
    /// Top to bottom.
    Vertical,
    /// Top-left to bottom-right.
    Diagonal,
}

/// Resolved border color.
#[derive(Clone, Debug, PartialEq)]
pub enum BorderColor {
    /// Solid stroke.
    Single(Rgba8),
    /// Gradient stroke when two or more colors are present.
    Multi(Vec<Rgba8>),
}

/// Validated and defaulted card options, immutable for the duration of one render.
#[derive(Clone, Debug, PartialEq)]
pub struct CardOptions {
    /// Raw display name; may exceed [`CardOptions::max_name_length`].
    pub username: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Background image URL.
    pub background_url: String,
    /// Circle (`true`) or rounded-square avatar mask.
    pub circular_avatar: bool,
    /// Draw the date badge.
    pub show_date: bool,
    /// Stroke the card border.
    pub border: bool,
    /// Border paint colors.
    pub border_color: BorderColor,
    /// Gradient axis, used only with two or more border colors.
    pub gradient_direction: GradientDirection,
    /// Truncation threshold for the display name, in characters.
    pub max_name_length: usize,
    /// Welcome line drawn under the name.
    pub welcome_text: String,
    /// Blur the background image.
    pub blur_background: bool,
}

impl CardOptions {
    /// Build options with every optional field at its default.
    pub fn new(
        username: impl Into<String>,
        avatar_url: impl Into<String>,
        background_url: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            avatar_url: avatar_url.into(),
            background_url: background_url.into(),
            circular_avatar: true,
            show_date: true,
            border: true,
            border_color: BorderColor::Single(default_border_color()),
            gradient_direction: GradientDirection::Horizontal,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            welcome_text: DEFAULT_WELCOME_TEXT.to_owned(),
            blur_background: true,
        }
    }

    /// Validate a raw option bag, then apply defaults.
    ///
    /// Nothing is defaulted unless the whole bag passes validation.
    pub fn from_value(options: &Value) -> WelcardResult<Self> {
        validate_options(options)?;
        let def: CardOptionsDef = serde_json::from_value(options.clone()).map_err(|e| {
            WelcardError::Other(anyhow::Error::new(e).context("deserialize validated options"))
        })?;
        def.resolve()
    }
}

impl CardOptionsDef {
    /// Apply defaults and parse colors.
    pub fn resolve(self) -> WelcardResult<CardOptions> {
        let username = self
            .username
            .ok_or(WelcardError::MissingOption { key: "username" })?;
        let avatar_url = self
            .avatar_url
            .ok_or(WelcardError::MissingOption { key: "avatarURL" })?;
        let background_url = self
            .background_url
            .ok_or(WelcardError::MissingOption {
                key: "backgroundURL",
            })?;

        let mut out = CardOptions::new(username, avatar_url, background_url);
        if let Some(v) = self.circular_avatar {
            out.circular_avatar = v;
        }
        if let Some(v) = self.show_date {
            out.show_date = v;
        }
        if let Some(v) = self.border {
            out.border = v;
        }
        if let Some(def) = self.border_color {
            out.border_color = resolve_border_color(def)?;
        }
        if let Some(v) = self.gradient_direction {
            out.gradient_direction = v;
        }
        if let Some(v) = self.max_name_length {
            out.max_name_length = name_limit(v);
        }
        if let Some(v) = self.welcome_text {
            out.welcome_text = v;
        }
        if let Some(v) = self.blur_background {
            out.blur_background = v;
        }
        Ok(out)
    }
}

fn resolve_border_color(def: BorderColorDef) -> WelcardResult<BorderColor> {
    let parse = |s: &str, in_sequence: bool| {
        parse_color(s).map_err(|_| WelcardError::InvalidColor {
            key: "borderColor",
            value: s.to_owned(),
            in_sequence,
        })
    };
    match def {
        BorderColorDef::One(s) => Ok(BorderColor::Single(parse(&s, false)?)),
        BorderColorDef::Many(list) => {
            let colors = list
                .iter()
                .map(|s| parse(s, true))
                .collect::<WelcardResult<Vec<_>>>()?;
            Ok(match colors.as_slice() {
                [] => BorderColor::Single(default_border_color()),
                [only] => BorderColor::Single(*only),
                _ => BorderColor::Multi(colors),
            })
        }
    }
}

/// Fractional limits truncate toward zero; negative limits clamp to zero.
fn name_limit(v: f64) -> usize {
    if !v.is_finite() {
        return if v > 0.0 { usize::MAX } else { 0 };
    }
    v.max(0.0).trunc() as usize
}

fn default_border_color() -> Rgba8 {
    Rgba8::with_alpha(255, 255, 255, 0.56)
}

#[cfg(test)]
#[path = "../../tests/unit/card/options.rs"]
mod tests;
