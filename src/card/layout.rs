use chrono::{Datelike, NaiveDate};

use crate::card::options::{BorderColor, GradientDirection};
use crate::foundation::core::{BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::geometry::{circle_path, rounded_rect_path};
use crate::render::surface::{
    FontSpec, FontWeight, GradientStop, LinearGradient, Paint, Shadow, TextAlign, TextBaseline,
    TextStyle,
};

pub(crate) const CARD_WIDTH: u32 = 727;
pub(crate) const CARD_HEIGHT: u32 = 248;
pub(crate) const CORNER_RADIUS: f64 = 20.0;

pub(crate) const AVATAR_SIZE: f64 = 150.0;
pub(crate) const AVATAR_X: f64 = 50.0;
pub(crate) const AVATAR_Y: f64 = 48.0;
pub(crate) const AVATAR_TEXT_GAP: f64 = 30.0;

pub(crate) const BORDER_WIDTH: f64 = 15.0;
pub(crate) const BACKGROUND_BLUR_RADIUS: u32 = 10;

pub(crate) const BADGE_PADDING_X: f64 = 15.0;
pub(crate) const BADGE_HEIGHT: f64 = 32.0;
pub(crate) const BADGE_MARGIN: f64 = 20.0;

pub(crate) const ELLIPSIS: &str = "...";

const NAME_FONT: FontSpec = FontSpec {
    size_px: 88.0,
    weight: FontWeight::Regular,
};
const WELCOME_FONT: FontSpec = FontSpec {
    size_px: 32.0,
    weight: FontWeight::Bold,
};
pub(crate) const DATE_FONT: FontSpec = FontSpec {
    size_px: 16.0,
    weight: FontWeight::Regular,
};

pub(crate) fn card_rect() -> Rect {
    Rect::new(0.0, 0.0, f64::from(CARD_WIDTH), f64::from(CARD_HEIGHT))
}

pub(crate) fn card_path() -> BezPath {
    rounded_rect_path(card_rect(), CORNER_RADIUS)
}

pub(crate) fn avatar_rect() -> Rect {
    Rect::new(
        AVATAR_X,
        AVATAR_Y,
        AVATAR_X + AVATAR_SIZE,
        AVATAR_Y + AVATAR_SIZE,
    )
}

/// Circle inscribed in the avatar box, or the box with rounded corners.
pub(crate) fn avatar_clip_path(circular: bool) -> BezPath {
    let rect = avatar_rect();
    if circular {
        circle_path(rect.center(), AVATAR_SIZE / 2.0)
    } else {
        rounded_rect_path(rect, CORNER_RADIUS)
    }
}

/// Left edge shared by the name and welcome lines.
fn text_x() -> f64 {
    AVATAR_X + AVATAR_SIZE + AVATAR_TEXT_GAP
}

pub(crate) fn name_origin() -> Point {
    Point::new(text_x(), AVATAR_Y + 10.0)
}

pub(crate) fn welcome_origin() -> Point {
    Point::new(text_x(), AVATAR_Y + 115.0)
}

pub(crate) fn name_style() -> TextStyle {
    TextStyle {
        font: NAME_FONT,
        fill: Rgba8::WHITE,
        align: TextAlign::Left,
        baseline: TextBaseline::Top,
        shadow: Shadow {
            color: Rgba8::with_alpha(0, 0, 0, 0.85),
            offset: Vec2::new(2.0, 2.0),
            blur: 10.0,
        },
    }
}

pub(crate) fn welcome_style() -> TextStyle {
    TextStyle {
        font: WELCOME_FONT,
        fill: Rgba8::with_alpha(255, 255, 255, 0.95),
        align: TextAlign::Left,
        baseline: TextBaseline::Top,
        shadow: Shadow {
            color: Rgba8::with_alpha(0, 0, 0, 0.8),
            offset: Vec2::new(1.0, 1.0),
            blur: 8.0,
        },
    }
}

pub(crate) fn badge_fill() -> Paint {
    Paint::Solid(Rgba8::with_alpha(70, 70, 70, 0.7))
}

pub(crate) fn date_style() -> TextStyle {
    TextStyle {
        font: DATE_FONT,
        fill: Rgba8::WHITE,
        align: TextAlign::Center,
        baseline: TextBaseline::Middle,
        shadow: Shadow::NONE,
    }
}

/// Truncate `username` to `max_chars` characters and append an ellipsis when it is longer.
pub(crate) fn display_name(username: &str, max_chars: usize) -> String {
    match username.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &username[..cut]),
        None => username.to_owned(),
    }
}

/// Stroke paint for the border: solid for one color, a linear gradient across the card otherwise.
pub(crate) fn border_paint(color: &BorderColor, direction: GradientDirection) -> Paint {
    let colors = match color {
        BorderColor::Single(c) => return Paint::Solid(*c),
        BorderColor::Multi(colors) => colors,
    };
    let (w, h) = (f64::from(CARD_WIDTH), f64::from(CARD_HEIGHT));
    let end = match direction {
        GradientDirection::Horizontal => Point::new(w, 0.0),
        GradientDirection::Vertical => Point::new(0.0, h),
        GradientDirection::Diagonal => Point::new(w, h),
    };
    let last = colors.len().saturating_sub(1).max(1) as f32;
    Paint::Linear(LinearGradient {
        start: Point::ORIGIN,
        end,
        stops: colors
            .iter()
            .enumerate()
            .map(|(i, &color)| GradientStop {
                offset: i as f32 / last,
                color,
            })
            .collect(),
    })
}

/// Date badge anchored to the bottom-right margin, sized to the measured date text.
pub(crate) fn badge_rect(text_width: f64) -> Rect {
    let width = text_width + 2.0 * BADGE_PADDING_X;
    let x = f64::from(CARD_WIDTH) - width - BADGE_MARGIN;
    let y = f64::from(CARD_HEIGHT) - BADGE_HEIGHT - BADGE_MARGIN;
    Rect::new(x, y, x + width, y + BADGE_HEIGHT)
}

pub(crate) fn badge_path(rect: Rect) -> BezPath {
    rounded_rect_path(rect, CORNER_RADIUS)
}

/// Short numeric date, `M/D/YYYY` without zero padding.
pub(crate) fn format_badge_date(date: NaiveDate) -> String {
    format!("{}/{}/{}", date.month(), date.day(), date.year())
}

#[cfg(test)]
#[path = "../../tests/unit/card/layout.rs"]
mod tests;
