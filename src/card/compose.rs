use crate::assets::decode::PreparedImage;
use crate::card::layout::{
    BACKGROUND_BLUR_RADIUS, BORDER_WIDTH, DATE_FONT, avatar_clip_path, avatar_rect, badge_fill,
    badge_path, badge_rect, border_paint, card_path, card_rect, date_style, display_name,
    name_origin, name_style, welcome_origin, welcome_style,
};
use crate::card::options::CardOptions;
use crate::foundation::error::WelcardResult;
use crate::render::blur::blur_region;
use crate::render::surface::{PixelRect, Shadow, Surface, with_clip};

/// Paint a complete card onto `surface` and return it encoded as PNG.
///
/// `date_text` is the badge label; `None` skips the badge regardless of `opts.show_date`.
pub(crate) fn compose_card<S>(
    surface: &mut S,
    opts: &CardOptions,
    background: &PreparedImage,
    avatar: &PreparedImage,
    date_text: Option<&str>,
) -> WelcardResult<Vec<u8>>
where
    S: Surface + ?Sized,
{
    draw_background(surface, background, opts.blur_background)?;
    if opts.border {
        draw_border(surface, opts)?;
    }
    draw_avatar(surface, avatar, opts.circular_avatar)?;
    draw_texts(surface, opts)?;
    if opts.show_date
        && let Some(date) = date_text
    {
        draw_date_badge(surface, date)?;
    }
    tracing::debug!("card passes complete");
    surface.encode_png()
}

fn draw_background<S: Surface + ?Sized>(
    surface: &mut S,
    background: &PreparedImage,
    blur: bool,
) -> WelcardResult<()> {
    with_clip(surface, &card_path(), |s| {
        s.draw_image(background, card_rect())?;
        if !blur {
            return Ok(());
        }
        let (width, height) = s.size();
        let mut region = s.read_pixels(PixelRect {
            x: 0,
            y: 0,
            width,
            height,
        })?;
        blur_region(&mut region, BACKGROUND_BLUR_RADIUS)?;
        s.write_pixels(&region)
    })
}

fn draw_border<S: Surface + ?Sized>(surface: &mut S, opts: &CardOptions) -> WelcardResult<()> {
    let paint = border_paint(&opts.border_color, opts.gradient_direction);
    surface.stroke_path(&card_path(), BORDER_WIDTH, &paint)
}

fn draw_avatar<S: Surface + ?Sized>(
    surface: &mut S,
    avatar: &PreparedImage,
    circular: bool,
) -> WelcardResult<()> {
    with_clip(surface, &avatar_clip_path(circular), |s| {
        s.draw_image(avatar, avatar_rect())
    })
}

fn draw_texts<S: Surface + ?Sized>(surface: &mut S, opts: &CardOptions) -> WelcardResult<()> {
    let name = display_name(&opts.username, opts.max_name_length);
    surface.fill_text(&name, name_origin(), &name_style())?;
    surface.fill_text(&opts.welcome_text, welcome_origin(), &welcome_style())
}

fn draw_date_badge<S: Surface + ?Sized>(surface: &mut S, date: &str) -> WelcardResult<()> {
    let text_width = surface.measure_text(date, &DATE_FONT)?;
    let rect = badge_rect(text_width);
    surface.fill_path(&badge_path(rect), &badge_fill(), &Shadow::NONE)?;
    surface.fill_text(date, rect.center(), &date_style())
}

#[cfg(test)]
#[path = "../../tests/unit/card/compose.rs"]
mod tests;
