use crate::assets::decode::PreparedImage;
use crate::foundation::core::{BezPath, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::WelcardResult;

/// Fill or stroke paint.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Single color.
    Solid(Rgba8),
    /// Linear gradient in surface coordinates.
    Linear(LinearGradient),
}

/// Linear gradient between two points with explicit color stops.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearGradient {
    /// Gradient start (offset 0).
    pub start: Point,
    /// Gradient end (offset 1).
    pub end: Point,
    /// Stops in increasing offset order.
    pub stops: Vec<GradientStop>,
}

/// One gradient color stop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis in `0..=1`.
    pub offset: f32,
    /// Stop color.
    pub color: Rgba8,
}

/// Drop shadow applied to a fill.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Shadow {
    /// Shadow color; a zero alpha disables the shadow.
    pub color: Rgba8,
    /// Shadow offset in surface units.
    pub offset: Vec2,
    /// Blur amount; the gaussian sigma is half of this value.
    pub blur: f64,
}

impl Shadow {
    /// No shadow: transparent color, zero offset, zero blur.
    pub const NONE: Self = Self {
        color: Rgba8::TRANSPARENT,
        offset: Vec2::ZERO,
        blur: 0.0,
    };

    /// Return `true` when drawing this shadow can change any pixel.
    pub fn is_visible(&self) -> bool {
        self.color.a != 0
    }
}

/// Font weight selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontWeight {
    /// Regular face.
    #[default]
    Regular,
    /// Bold face.
    Bold,
}

/// Font used for a text draw or measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FontSpec {
    /// Font size in pixels.
    pub size_px: f32,
    /// Weight.
    pub weight: FontWeight,
}

/// Horizontal anchoring of text relative to its origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Origin is the left edge.
    #[default]
    Left,
    /// Origin is the horizontal center.
    Center,
}

/// Vertical anchoring of text relative to its origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    /// Origin is the top of the line box.
    #[default]
    Top,
    /// Origin is the vertical center of the line box.
    Middle,
}

/// Complete text drawing state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font.
    pub font: FontSpec,
    /// Fill color.
    pub fill: Rgba8,
    /// Horizontal anchoring.
    pub align: TextAlign,
    /// Vertical anchoring.
    pub baseline: TextBaseline,
    /// Drop shadow.
    pub shadow: Shadow,
}

/// Integer pixel rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Rectangular block of premultiplied RGBA8 pixels read from a surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelRegion {
    /// Where the pixels came from (and where they are written back).
    pub rect: PixelRect,
    /// Row-major premultiplied RGBA8 bytes, `width * height * 4` long.
    pub data: Vec<u8>,
}

/// Drawing surface the card compositor paints onto.
///
/// Every draw call carries its complete paint and shadow state, so nothing set by one call can
/// leak into the next. Clips are the only scoped state: each [`Surface::push_clip`] intersects
/// with the clips already active until the matching [`Surface::pop_clip`].
pub trait Surface {
    /// Surface size in pixels.
    fn size(&self) -> (u32, u32);

    /// Intersect the active clip with `path`.
    fn push_clip(&mut self, path: &BezPath);

    /// Drop the most recently pushed clip.
    fn pop_clip(&mut self);

    /// Fill `path` with `paint`, casting `shadow` first.
    fn fill_path(&mut self, path: &BezPath, paint: &Paint, shadow: &Shadow) -> WelcardResult<()>;

    /// Stroke `path` centered on the outline, `width` units wide.
    fn stroke_path(&mut self, path: &BezPath, width: f64, paint: &Paint) -> WelcardResult<()>;

    /// Draw `image` stretched to fill `dst`.
    fn draw_image(&mut self, image: &PreparedImage, dst: Rect) -> WelcardResult<()>;

    /// Copy pixels out of the surface, ignoring clips.
    fn read_pixels(&mut self, rect: PixelRect) -> WelcardResult<PixelRegion>;

    /// Replace pixels in the surface, ignoring clips.
    fn write_pixels(&mut self, region: &PixelRegion) -> WelcardResult<()>;

    /// Advance width of `text` set in `font`.
    fn measure_text(&mut self, text: &str, font: &FontSpec) -> WelcardResult<f64>;

    /// Draw one line of `text` anchored at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> WelcardResult<()>;

    /// Encode the current pixels as PNG.
    fn encode_png(&mut self) -> WelcardResult<Vec<u8>>;
}

/// Run `f` with `path` pushed as a clip, popping it again even when `f` fails.
pub fn with_clip<S, R>(
    surface: &mut S,
    path: &BezPath,
    f: impl FnOnce(&mut S) -> WelcardResult<R>,
) -> WelcardResult<R>
where
    S: Surface + ?Sized,
{
    surface.push_clip(path);
    let out = f(surface);
    surface.pop_clip();
    out
}
