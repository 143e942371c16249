use chrono::NaiveDate;
use serde_json::Value;

use crate::assets::decode::PreparedImage;
use crate::assets::fonts::CardFonts;
use crate::assets::source::{HttpImageSource, HttpImageSourceOpts, ImageSource};
use crate::card::compose::compose_card;
use crate::card::layout::{CARD_HEIGHT, CARD_WIDTH, format_badge_date};
use crate::card::options::CardOptions;
use crate::foundation::error::WelcardResult;
use crate::render::cpu::CpuSurface;

/// Reusable card renderer: an image source and the fonts used for every card.
///
/// Renders share no mutable state, so one `WelcomeCard` may serve concurrent callers.
pub struct WelcomeCard<I = HttpImageSource> {
    images: I,
    fonts: CardFonts,
    date: Option<NaiveDate>,
}

impl WelcomeCard<HttpImageSource> {
    /// Network-backed renderer using system fonts.
    pub fn with_system_fonts() -> WelcardResult<Self> {
        Ok(Self::new(
            HttpImageSource::new(HttpImageSourceOpts::default())?,
            CardFonts::from_system()?,
        ))
    }
}

impl<I: ImageSource> WelcomeCard<I> {
    /// Renderer reading images from `images` and setting text in `fonts`.
    pub fn new(images: I, fonts: CardFonts) -> Self {
        Self {
            images,
            fonts,
            date: None,
        }
    }

    /// Pin the badge date instead of reading the local clock on each render.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Validate `options`, fetch both images and return the card as PNG bytes.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn render(&self, options: &Value) -> WelcardResult<Vec<u8>> {
        let opts = CardOptions::from_value(options)?;
        self.render_options(&opts)
    }

    /// Render already-resolved options.
    pub fn render_options(&self, opts: &CardOptions) -> WelcardResult<Vec<u8>> {
        let (background, avatar) = load_images(&self.images, opts)?;
        let date_text = opts.show_date.then(|| {
            let today = self
                .date
                .unwrap_or_else(|| chrono::Local::now().date_naive());
            format_badge_date(today)
        });

        let mut surface = CpuSurface::new(CARD_WIDTH, CARD_HEIGHT)?.with_fonts(&self.fonts)?;
        let png = compose_card(
            &mut surface,
            opts,
            &background,
            &avatar,
            date_text.as_deref(),
        )?;
        tracing::debug!(bytes = png.len(), "encoded card");
        Ok(png)
    }
}

/// One-shot render: validate `options`, load images through `images` and compose with `fonts`.
pub fn generate_welcome_image<I>(
    options: &Value,
    images: &I,
    fonts: &CardFonts,
) -> WelcardResult<Vec<u8>>
where
    I: ImageSource + ?Sized,
{
    WelcomeCard::new(images, fonts.clone()).render(options)
}

/// Both loads run concurrently; when both fail the background error wins.
fn load_images<I: ImageSource + ?Sized>(
    images: &I,
    opts: &CardOptions,
) -> WelcardResult<(PreparedImage, PreparedImage)> {
    let (background, avatar) = rayon::join(
        || images.load(&opts.background_url),
        || images.load(&opts.avatar_url),
    );
    Ok((background?, avatar?))
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
