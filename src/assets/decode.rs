use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{WelcardError, WelcardResult};
use crate::render::composite::premultiply_in_place;

/// Largest SVG raster edge accepted when rasterizing at intrinsic size.
const MAX_SVG_DIM: u32 = 4096;
/// Largest raster edge the CPU surface can sample from.
pub(crate) const MAX_IMAGE_DIM: u32 = u16::MAX as u32;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Decoded raster image in premultiplied RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Wrap premultiplied RGBA8 bytes, checking the buffer length.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> WelcardResult<Self> {
        let expected = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        if rgba8_premul.len() != expected || width == 0 || height == 0 {
            return Err(WelcardError::Other(anyhow::anyhow!(
                "image buffer of {} bytes does not match {width}x{height}",
                rgba8_premul.len()
            )));
        }
        check_dimensions(width, height).map_err(WelcardError::Other)?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }
}

/// Decode encoded image bytes (raster formats or SVG) to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> anyhow::Result<PreparedImage> {
    if looks_like_svg(bytes) {
        return decode_svg(bytes);
    }

    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    check_dimensions(dyn_img.width(), dyn_img.height())?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn decode_svg(bytes: &[u8]) -> anyhow::Result<PreparedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let to_px = |v: f32| -> anyhow::Result<u32> {
        if !v.is_finite() || v <= 0.0 {
            anyhow::bail!("svg has invalid width/height");
        }
        Ok((v.ceil() as u32).max(1))
    };
    let (width, height) = (to_px(size.width())?, to_px(size.height())?);
    if width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        anyhow::bail!("svg raster size too large: {width}x{height}");
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .context("allocate svg pixmap")?;
    let xform = resvg::tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, xform, &mut pixmap.as_mut());

    // tiny-skia pixmaps are already premultiplied RGBA8.
    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

fn check_dimensions(width: u32, height: u32) -> anyhow::Result<()> {
    if width == 0 || height == 0 {
        anyhow::bail!("decoded image has zero size");
    }
    if width > MAX_IMAGE_DIM || height > MAX_IMAGE_DIM {
        anyhow::bail!("image size {width}x{height} exceeds {MAX_IMAGE_DIM}px per edge");
    }
    Ok(())
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    // The cut may split a multibyte character; keep the valid prefix.
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) => match std::str::from_utf8(&head[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return false,
        },
    };
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
