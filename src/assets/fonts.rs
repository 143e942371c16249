use std::path::Path;
use std::sync::Arc;

use crate::foundation::error::{WelcardError, WelcardResult};
use crate::render::surface::{FontSpec, FontWeight};

/// Family names tried, in order, when discovering system fonts.
const SYSTEM_SANS_FAMILIES: &[&str] = &[
    "Sans",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
];

/// Raw bytes of one font face.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFace {
    /// Font file contents (TTF, OTF or a collection).
    pub data: Arc<Vec<u8>>,
    /// Face index inside a collection; `0` for single-face files.
    pub index: u32,
}

impl FontFace {
    /// Wrap single-face font bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: Arc::new(data),
            index: 0,
        }
    }
}

/// Fonts used to set the card text.
///
/// The bold face is optional; bold text falls back to the regular face when it is absent.
#[derive(Clone, Debug)]
pub struct CardFonts {
    regular: FontFace,
    bold: Option<FontFace>,
}

impl CardFonts {
    /// Build from a regular face and an optional bold face.
    pub fn new(regular: FontFace, bold: Option<FontFace>) -> Self {
        Self { regular, bold }
    }

    /// Build from raw font file bytes.
    pub fn from_bytes(regular: Vec<u8>, bold: Option<Vec<u8>>) -> Self {
        Self::new(FontFace::new(regular), bold.map(FontFace::new))
    }

    /// Read font files from disk.
    pub fn from_files(regular: &Path, bold: Option<&Path>) -> WelcardResult<Self> {
        let read = |p: &Path| {
            std::fs::read(p).map_err(|e| {
                WelcardError::surface(format!("failed to read font '{}': {e}", p.display()))
            })
        };
        let regular = read(regular)?;
        let bold = bold.map(read).transpose()?;
        Ok(Self::from_bytes(regular, bold))
    }

    /// Discover a sans-serif family among the installed system fonts.
    pub fn from_system() -> WelcardResult<Self> {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();

        let regular = query_face(&db, usvg::fontdb::Weight::NORMAL).ok_or_else(|| {
            WelcardError::surface("no sans-serif system font found")
        })?;
        let bold = query_face(&db, usvg::fontdb::Weight::BOLD)
            .filter(|face| face != &regular);

        tracing::debug!(
            faces = db.faces().count(),
            has_bold = bold.is_some(),
            "resolved system fonts"
        );
        Ok(Self::new(regular, bold))
    }

    /// Face used for `weight`.
    pub fn face(&self, weight: FontWeight) -> &FontFace {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => self.bold.as_ref().unwrap_or(&self.regular),
        }
    }

    /// Return `true` when a dedicated bold face is loaded.
    pub fn has_bold(&self) -> bool {
        self.bold.is_some()
    }
}

fn query_face(db: &usvg::fontdb::Database, weight: usvg::fontdb::Weight) -> Option<FontFace> {
    let mut families = SYSTEM_SANS_FAMILIES
        .iter()
        .map(|name| usvg::fontdb::Family::Name(*name))
        .collect::<Vec<_>>();
    families.push(usvg::fontdb::Family::SansSerif);

    let query = usvg::fontdb::Query {
        families: &families,
        weight,
        stretch: usvg::fontdb::Stretch::Normal,
        style: usvg::fontdb::Style::Normal,
    };
    let id = db.query(&query)?;

    // A bold query happily matches a regular face; only accept real bold weights.
    let face_weight = db.face(id)?.weight;
    if weight == usvg::fontdb::Weight::BOLD && face_weight.0 < 600 {
        return None;
    }

    db.with_face_data(id, |data, index| FontFace {
        data: Arc::new(data.to_vec()),
        index,
    })
}

/// Shaped single line ready to draw.
pub(crate) struct ShapedText {
    pub(crate) layout: parley::Layout<()>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

impl ShapedText {
    /// Advance width including trailing whitespace.
    pub(crate) fn width(&self) -> f64 {
        f64::from(self.layout.full_width())
    }

    /// Height of the line box.
    pub(crate) fn height(&self) -> f64 {
        f64::from(self.layout.height())
    }
}

struct LoadedFace {
    font_ctx: parley::FontContext,
    family_name: String,
    attributes: parley::fontique::Attributes,
    font: vello_cpu::peniko::FontData,
}

impl LoadedFace {
    fn load(face: &FontFace) -> WelcardResult<Self> {
        // One context per face keeps family lookup unambiguous when both faces share a family name.
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(face.data.as_ref().clone()),
            None,
        );
        // A collection registers every face; shape with the one vello will draw.
        let (family_id, info) = families
            .iter()
            .find_map(|(id, fonts)| {
                fonts
                    .iter()
                    .find(|info| info.index() == face.index)
                    .map(|info| (*id, info))
            })
            .ok_or_else(|| {
                WelcardError::surface(format!(
                    "font data has no face at index {}",
                    face.index
                ))
            })?;
        let attributes =
            parley::fontique::Attributes::new(info.width(), info.style(), info.weight());
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| WelcardError::surface("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(face.data.as_ref().clone()),
            face.index,
        );
        Ok(Self {
            font_ctx,
            family_name,
            attributes,
            font,
        })
    }
}

/// Parley layout state for the card fonts, built once per surface.
pub(crate) struct TextLayoutEngine {
    regular: LoadedFace,
    bold: Option<LoadedFace>,
    layout_ctx: parley::LayoutContext<()>,
}

impl std::fmt::Debug for TextLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayoutEngine")
            .field("has_bold", &self.bold.is_some())
            .finish_non_exhaustive()
    }
}

impl TextLayoutEngine {
    pub(crate) fn new(fonts: &CardFonts) -> WelcardResult<Self> {
        let regular = LoadedFace::load(fonts.face(FontWeight::Regular))?;
        let bold = if fonts.has_bold() {
            Some(LoadedFace::load(fonts.face(FontWeight::Bold))?)
        } else {
            None
        };
        Ok(Self {
            regular,
            bold,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    /// Shape `text` as one unwrapped line.
    pub(crate) fn shape(&mut self, text: &str, font: &FontSpec) -> WelcardResult<ShapedText> {
        if !font.size_px.is_finite() || font.size_px <= 0.0 {
            return Err(WelcardError::surface("font size must be finite and > 0"));
        }

        let face = match font.weight {
            FontWeight::Bold => self.bold.as_mut().unwrap_or(&mut self.regular),
            FontWeight::Regular => &mut self.regular,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(font.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            face.attributes.weight,
        ));
        builder.push_default(parley::style::StyleProperty::FontStyle(face.attributes.style));
        builder.push_default(parley::style::StyleProperty::FontWidth(face.attributes.width));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);

        Ok(ShapedText {
            layout,
            font: face.font.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fonts.rs"]
mod tests;
