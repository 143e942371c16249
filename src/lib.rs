//! welcard composes 727×248 PNG "welcome cards": a blurred rounded background, an optional
//! gradient border, a masked avatar, the member name, a welcome line and a date badge.
//!
//! The public API is small:
//!
//! - [`validate_options`] checks a raw JSON option bag without rendering
//! - [`WelcomeCard::render`] validates, fetches both images and returns PNG bytes
//! - [`generate_welcome_image`] is the one-shot form of the same pipeline
//!
//! Images are resolved through an [`ImageSource`]; [`HttpImageSource`] fetches over HTTP(S) and
//! reads `file://` URLs, [`MemoryImageSource`] serves bytes registered up front.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod card;
mod foundation;
mod render;
mod schema;
mod session;

pub use crate::foundation::core::{JsonType, Rgba8};
pub use crate::foundation::error::{WelcardError, WelcardResult};

pub use crate::assets::decode::{PreparedImage, decode_image};
pub use crate::assets::fonts::{CardFonts, FontFace};
pub use crate::assets::source::{
    HttpImageSource, HttpImageSourceOpts, ImageSource, MemoryImageSource,
};
pub use crate::card::options::{
    BorderColor, CardOptions, DEFAULT_BORDER_COLOR, DEFAULT_MAX_NAME_LENGTH, DEFAULT_WELCOME_TEXT,
    GradientDirection,
};
pub use crate::render::blur::{blur_region, blur_rgba8_premul};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::surface::{
    FontSpec, FontWeight, GradientStop, LinearGradient, Paint, PixelRect, PixelRegion, Shadow,
    Surface, TextAlign, TextBaseline, TextStyle,
};
pub use crate::schema::validate::validate_options;
pub use crate::session::{WelcomeCard, generate_welcome_image};
