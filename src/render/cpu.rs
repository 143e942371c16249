use std::io::Cursor;
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::fonts::{CardFonts, ShapedText, TextLayoutEngine};
use crate::foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{WelcardError, WelcardResult};
use crate::render::blur::{blur_rgba8_premul, radius_for_sigma};
use crate::render::composite::{over_in_place, unpremultiply_in_place};
use crate::render::surface::{
    FontSpec, LinearGradient, Paint, PixelRect, PixelRegion, Shadow, Surface, TextAlign,
    TextBaseline, TextStyle,
};

/// Flattening tolerance for stroke outlines.
const STROKE_TOLERANCE: f64 = 0.1;

/// `vello_cpu`-backed [`Surface`].
///
/// Each draw op is rasterized on its own into a scratch layer, masked by the active clips and
/// composited premultiplied-over the committed pixels. Shapes and glyphs are rendered as white
/// coverage first, so solid and gradient paints share one path.
pub struct CpuSurface {
    width: u16,
    height: u16,
    target: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
    /// Cumulative clip coverage; each entry is the intersection of all clips up to it.
    clip_masks: Vec<Vec<u8>>,
    text: Option<TextLayoutEngine>,
}

impl CpuSurface {
    /// Allocate a transparent surface without fonts; text operations fail until
    /// [`CpuSurface::with_fonts`] is called.
    pub fn new(width: u32, height: u32) -> WelcardResult<Self> {
        if width == 0 || height == 0 {
            return Err(WelcardError::surface(format!(
                "surface size must be non-zero, got {width}x{height}"
            )));
        }
        let width: u16 = width
            .try_into()
            .map_err(|_| WelcardError::surface("surface width exceeds u16"))?;
        let height: u16 = height
            .try_into()
            .map_err(|_| WelcardError::surface("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            target: vello_cpu::Pixmap::new(width, height),
            ctx: None,
            clip_masks: Vec::new(),
            text: None,
        })
    }

    /// Load `fonts` for text measurement and drawing.
    pub fn with_fonts(mut self, fonts: &CardFonts) -> WelcardResult<Self> {
        self.text = Some(TextLayoutEngine::new(fonts)?);
        Ok(self)
    }

    /// Committed pixels as premultiplied RGBA8.
    pub fn data(&self) -> &[u8] {
        self.target.data_as_u8_slice()
    }

    fn pixel_count(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    /// Run `f` against a reset render context and return the rendered premultiplied bytes.
    fn rasterize(&mut self, f: impl FnOnce(&mut vello_cpu::RenderContext)) -> Vec<u8> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == self.width && ctx.height() == self.height => ctx,
            _ => vello_cpu::RenderContext::new(self.width, self.height),
        };
        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        f(&mut ctx);
        ctx.flush();

        let mut layer = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.render_to_pixmap(&mut layer);
        self.ctx = Some(ctx);
        layer.data_as_u8_slice().to_vec()
    }

    /// Per-pixel coverage of `path` translated by `offset`.
    fn path_coverage(&mut self, path: &BezPath, offset: Vec2) -> Vec<u8> {
        let cpu_path = bezpath_to_cpu(path);
        let layer = self.rasterize(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((offset.x, offset.y)));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            ctx.fill_path(&cpu_path);
        });
        alpha_channel(&layer)
    }

    /// Per-pixel coverage of shaped glyphs whose line box starts at `top_left`.
    fn glyph_coverage(&mut self, shaped: &ShapedText, top_left: Point) -> Vec<u8> {
        let layer = self.rasterize(|ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((top_left.x, top_left.y)));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            for line in shaped.layout.lines() {
                for item in line.items() {
                    let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                        continue;
                    };
                    // Positioned glyphs carry the run offset, advances and line baseline.
                    let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                        id: g.id,
                        x: g.x,
                        y: g.y,
                    });
                    ctx.glyph_run(&shaped.font)
                        .font_size(run.run().font_size())
                        .fill_glyphs(glyphs);
                }
            }
        });
        alpha_channel(&layer)
    }

    /// Turn coverage into a premultiplied layer painted with `paint`.
    fn paint_layer(&self, paint: &Paint, coverage: &[u8]) -> Vec<u8> {
        let mut layer = vec![0u8; coverage.len() * 4];
        match paint {
            Paint::Solid(color) => {
                let premul = color.to_premul();
                for (px, &cov) in layer.chunks_exact_mut(4).zip(coverage) {
                    if cov != 0 {
                        px.copy_from_slice(&scale_px(premul, cov));
                    }
                }
            }
            Paint::Linear(gradient) => {
                let sampler = GradientSampler::new(gradient);
                let w = usize::from(self.width);
                for (i, (px, &cov)) in layer.chunks_exact_mut(4).zip(coverage).enumerate() {
                    if cov == 0 {
                        continue;
                    }
                    let x = (i % w) as f64 + 0.5;
                    let y = (i / w) as f64 + 0.5;
                    px.copy_from_slice(&scale_px(sampler.sample(Point::new(x, y)), cov));
                }
            }
        }
        layer
    }

    /// Shadow layer: coverage tinted with the shadow color, then blurred with sigma `blur / 2`.
    fn shadow_layer(&self, shadow: &Shadow, coverage: &[u8]) -> WelcardResult<Vec<u8>> {
        let layer = self.paint_layer(&Paint::Solid(shadow.color), coverage);
        let sigma = shadow.blur / 2.0;
        let radius = radius_for_sigma(sigma);
        if radius == 0 {
            return Ok(layer);
        }
        blur_rgba8_premul(
            &layer,
            u32::from(self.width),
            u32::from(self.height),
            radius,
            sigma as f32,
        )
    }

    /// Mask `layer` by the active clip and composite it over the committed pixels.
    fn commit(&mut self, mut layer: Vec<u8>) -> WelcardResult<()> {
        if let Some(mask) = self.clip_masks.last() {
            for (px, &m) in layer.chunks_exact_mut(4).zip(mask) {
                let out = scale_px([px[0], px[1], px[2], px[3]], m);
                px.copy_from_slice(&out);
            }
        }
        over_in_place(self.target.data_as_u8_slice_mut(), &layer)
    }

    fn text_engine(&mut self) -> WelcardResult<&mut TextLayoutEngine> {
        self.text
            .as_mut()
            .ok_or_else(|| WelcardError::surface("surface has no fonts loaded"))
    }

    fn check_rect(&self, rect: PixelRect) -> WelcardResult<()> {
        let fits = |start: u32, len: u32, max: u16| {
            start
                .checked_add(len)
                .is_some_and(|end| end <= u32::from(max))
        };
        if !fits(rect.x, rect.width, self.width) || !fits(rect.y, rect.height, self.height) {
            return Err(WelcardError::Other(anyhow::anyhow!(
                "pixel rect {rect:?} is outside the {}x{} surface",
                self.width,
                self.height
            )));
        }
        Ok(())
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn push_clip(&mut self, path: &BezPath) {
        let coverage = self.path_coverage(path, Vec2::ZERO);
        let combined = match self.clip_masks.last() {
            Some(prev) => prev
                .iter()
                .zip(&coverage)
                .map(|(&a, &b)| mul_div255(a, b))
                .collect(),
            None => coverage,
        };
        self.clip_masks.push(combined);
    }

    fn pop_clip(&mut self) {
        self.clip_masks.pop();
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint, shadow: &Shadow) -> WelcardResult<()> {
        if shadow.is_visible() {
            let coverage = self.path_coverage(path, shadow.offset);
            let layer = self.shadow_layer(shadow, &coverage)?;
            self.commit(layer)?;
        }
        let coverage = self.path_coverage(path, Vec2::ZERO);
        let layer = self.paint_layer(paint, &coverage);
        self.commit(layer)
    }

    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint) -> WelcardResult<()> {
        if !width.is_finite() || width <= 0.0 {
            return Err(WelcardError::Other(anyhow::anyhow!(
                "stroke width must be finite and > 0"
            )));
        }
        let outline = kurbo::stroke(
            path.iter(),
            &kurbo::Stroke::new(width),
            &kurbo::StrokeOpts::default(),
            STROKE_TOLERANCE,
        );
        let coverage = self.path_coverage(&outline, Vec2::ZERO);
        let layer = self.paint_layer(paint, &coverage);
        self.commit(layer)
    }

    fn draw_image(&mut self, image: &PreparedImage, dst: Rect) -> WelcardResult<()> {
        if dst.width() <= 0.0 || dst.height() <= 0.0 {
            return Ok(());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let (iw, ih) = (f64::from(image.width), f64::from(image.height));
        let transform = Affine::translate((dst.x0, dst.y0))
            * Affine::scale_non_uniform(dst.width() / iw, dst.height() / ih);

        let layer = self.rasterize(|ctx| {
            ctx.set_transform(affine_to_cpu(transform));
            ctx.set_paint(paint);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, iw, ih));
        });
        self.commit(layer)
    }

    fn read_pixels(&mut self, rect: PixelRect) -> WelcardResult<PixelRegion> {
        self.check_rect(rect)?;
        let stride = usize::from(self.width) * 4;
        let row_len = rect.width as usize * 4;
        let src = self.target.data_as_u8_slice();
        let mut data = Vec::with_capacity(row_len * rect.height as usize);
        for y in rect.y..rect.y + rect.height {
            let start = y as usize * stride + rect.x as usize * 4;
            data.extend_from_slice(&src[start..start + row_len]);
        }
        Ok(PixelRegion { rect, data })
    }

    fn write_pixels(&mut self, region: &PixelRegion) -> WelcardResult<()> {
        let rect = region.rect;
        self.check_rect(rect)?;
        let row_len = rect.width as usize * 4;
        if region.data.len() != row_len * rect.height as usize {
            return Err(WelcardError::Other(anyhow::anyhow!(
                "pixel region holds {} bytes, expected {}",
                region.data.len(),
                row_len * rect.height as usize
            )));
        }
        let stride = usize::from(self.width) * 4;
        let dst = self.target.data_as_u8_slice_mut();
        for (row, chunk) in region.data.chunks_exact(row_len.max(1)).enumerate() {
            let start = (rect.y as usize + row) * stride + rect.x as usize * 4;
            dst[start..start + row_len].copy_from_slice(chunk);
        }
        Ok(())
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> WelcardResult<f64> {
        Ok(self.text_engine()?.shape(text, font)?.width())
    }

    fn fill_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> WelcardResult<()> {
        let shaped = self.text_engine()?.shape(text, &style.font)?;
        let x = match style.align {
            TextAlign::Left => origin.x,
            TextAlign::Center => origin.x - shaped.width() / 2.0,
        };
        let y = match style.baseline {
            TextBaseline::Top => origin.y,
            TextBaseline::Middle => origin.y - shaped.height() / 2.0,
        };
        let top_left = Point::new(x, y);

        if style.shadow.is_visible() {
            let coverage = self.glyph_coverage(&shaped, top_left + style.shadow.offset);
            let layer = self.shadow_layer(&style.shadow, &coverage)?;
            self.commit(layer)?;
        }
        let coverage = self.glyph_coverage(&shaped, top_left);
        let layer = self.paint_layer(&Paint::Solid(style.fill), &coverage);
        self.commit(layer)
    }

    fn encode_png(&mut self) -> WelcardResult<Vec<u8>> {
        let mut rgba = self.target.data_as_u8_slice().to_vec();
        debug_assert_eq!(rgba.len(), self.pixel_count() * 4);
        unpremultiply_in_place(&mut rgba);

        let img = image::RgbaImage::from_raw(u32::from(self.width), u32::from(self.height), rgba)
            .ok_or_else(|| WelcardError::Other(anyhow::anyhow!("surface buffer size mismatch")))?;
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .map_err(|e| WelcardError::Other(anyhow::Error::new(e).context("encode png")))?;
        Ok(out.into_inner())
    }
}

/// Piecewise-linear gradient lookup in premultiplied space.
struct GradientSampler {
    start: Point,
    axis: Vec2,
    inv_len2: f64,
    stops: Vec<(f32, [u8; 4])>,
}

impl GradientSampler {
    fn new(gradient: &LinearGradient) -> Self {
        let axis = gradient.end - gradient.start;
        let len2 = axis.hypot2();
        Self {
            start: gradient.start,
            axis,
            inv_len2: if len2 > 0.0 { 1.0 / len2 } else { 0.0 },
            stops: gradient
                .stops
                .iter()
                .map(|s| (s.offset, s.color.to_premul()))
                .collect(),
        }
    }

    fn sample(&self, p: Point) -> [u8; 4] {
        let t = ((p - self.start).dot(self.axis) * self.inv_len2).clamp(0.0, 1.0) as f32;
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return Rgba8::TRANSPARENT.to_premul();
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }
        for pair in self.stops.windows(2) {
            let (o0, c0) = pair[0];
            let (o1, c1) = pair[1];
            if t > o1 {
                continue;
            }
            let span = o1 - o0;
            let f = if span > 0.0 { (t - o0) / span } else { 1.0 };
            let lerp = |a: u8, b: u8| -> u8 {
                (f32::from(a) + (f32::from(b) - f32::from(a)) * f)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            return [
                lerp(c0[0], c1[0]),
                lerp(c0[1], c1[1]),
                lerp(c0[2], c1[2]),
                lerp(c0[3], c1[3]),
            ];
        }
        last.1
    }
}

fn alpha_channel(layer: &[u8]) -> Vec<u8> {
    layer.chunks_exact(4).map(|px| px[3]).collect()
}

fn scale_px(px: [u8; 4], cov: u8) -> [u8; 4] {
    match cov {
        0 => [0; 4],
        255 => px,
        _ => px.map(|c| mul_div255(c, cov)),
    }
}

fn mul_div255(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> WelcardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| WelcardError::surface("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| WelcardError::surface("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(WelcardError::surface("image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
