use super::*;
use crate::card::layout::badge_rect;
use crate::card::options::{BorderColor, GradientDirection};
use crate::foundation::core::{BezPath, Point, Rect, Rgba8};
use crate::foundation::error::WelcardError;
use crate::render::surface::{FontSpec, Paint, PixelRegion, TextStyle};
use kurbo::Shape;

#[derive(Clone, Debug, PartialEq)]
enum Op {
    PushClip(Rect),
    PopClip,
    Fill {
        bbox: Rect,
        paint: Paint,
        shadow: Shadow,
    },
    Stroke {
        width: f64,
        paint: Paint,
    },
    Image {
        size: (u32, u32),
        dst: Rect,
    },
    Read(PixelRect),
    Write(PixelRect),
    Measure(String, FontSpec),
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
    Encode,
}

impl Op {
    fn kind(&self) -> &'static str {
        match self {
            Op::PushClip(_) => "push_clip",
            Op::PopClip => "pop_clip",
            Op::Fill { .. } => "fill",
            Op::Stroke { .. } => "stroke",
            Op::Image { .. } => "image",
            Op::Read(_) => "read",
            Op::Write(_) => "write",
            Op::Measure(..) => "measure",
            Op::Text { .. } => "text",
            Op::Encode => "encode",
        }
    }
}

/// Records draw calls; text is measured as 8 units per character.
#[derive(Default)]
struct RecordingSurface {
    ops: Vec<Op>,
    depth: usize,
    fail_images: bool,
}

impl RecordingSurface {
    fn kinds(&self) -> Vec<&'static str> {
        self.ops.iter().map(Op::kind).collect()
    }

    fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> (u32, u32) {
        (16, 8)
    }

    fn push_clip(&mut self, path: &BezPath) {
        self.depth += 1;
        self.ops.push(Op::PushClip(path.bounding_box()));
    }

    fn pop_clip(&mut self) {
        assert!(self.depth > 0, "pop_clip without matching push_clip");
        self.depth -= 1;
        self.ops.push(Op::PopClip);
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint, shadow: &Shadow) -> WelcardResult<()> {
        self.ops.push(Op::Fill {
            bbox: path.bounding_box(),
            paint: paint.clone(),
            shadow: *shadow,
        });
        Ok(())
    }

    fn stroke_path(&mut self, _path: &BezPath, width: f64, paint: &Paint) -> WelcardResult<()> {
        self.ops.push(Op::Stroke {
            width,
            paint: paint.clone(),
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &PreparedImage, dst: Rect) -> WelcardResult<()> {
        if self.fail_images {
            return Err(WelcardError::surface("image draw failed"));
        }
        self.ops.push(Op::Image {
            size: (image.width, image.height),
            dst,
        });
        Ok(())
    }

    fn read_pixels(&mut self, rect: PixelRect) -> WelcardResult<PixelRegion> {
        self.ops.push(Op::Read(rect));
        Ok(PixelRegion {
            rect,
            data: vec![128; (rect.width * rect.height * 4) as usize],
        })
    }

    fn write_pixels(&mut self, region: &PixelRegion) -> WelcardResult<()> {
        assert_eq!(
            region.data.len(),
            (region.rect.width * region.rect.height * 4) as usize
        );
        self.ops.push(Op::Write(region.rect));
        Ok(())
    }

    fn measure_text(&mut self, text: &str, font: &FontSpec) -> WelcardResult<f64> {
        self.ops.push(Op::Measure(text.to_owned(), *font));
        Ok(text.chars().count() as f64 * 8.0)
    }

    fn fill_text(&mut self, text: &str, origin: Point, style: &TextStyle) -> WelcardResult<()> {
        self.ops.push(Op::Text {
            text: text.to_owned(),
            origin,
            style: *style,
        });
        Ok(())
    }

    fn encode_png(&mut self) -> WelcardResult<Vec<u8>> {
        self.ops.push(Op::Encode);
        Ok(format!("{} ops", self.ops.len()).into_bytes())
    }
}

fn images() -> (PreparedImage, PreparedImage) {
    let bg = PreparedImage::from_premul(4, 2, vec![255; 32]).unwrap();
    let avatar = PreparedImage::from_premul(2, 2, vec![255; 16]).unwrap();
    (bg, avatar)
}

fn opts() -> CardOptions {
    CardOptions::new(
        "Bob",
        "https://example.com/a.png",
        "https://example.com/bg.png",
    )
}

fn run(opts: &CardOptions, date: Option<&str>) -> (RecordingSurface, Vec<u8>) {
    let (bg, avatar) = images();
    let mut s = RecordingSurface::default();
    let out = compose_card(&mut s, opts, &bg, &avatar, date).unwrap();
    (s, out)
}

#[test]
fn passes_run_in_order_with_every_feature_enabled() {
    let (s, _) = run(&opts(), Some("1/2/2026"));
    assert_eq!(
        s.kinds(),
        vec![
            "push_clip", "image", "read", "write", "pop_clip", "stroke", "push_clip", "image",
            "pop_clip", "text", "text", "measure", "fill", "text", "encode",
        ]
    );
    assert_eq!(s.depth, 0);
}

#[test]
fn background_is_clipped_and_stretched_to_the_card() {
    let (s, _) = run(&opts(), None);
    assert_eq!(s.ops[0], Op::PushClip(Rect::new(0.0, 0.0, 727.0, 248.0)));
    assert_eq!(
        s.ops[1],
        Op::Image {
            size: (4, 2),
            dst: Rect::new(0.0, 0.0, 727.0, 248.0),
        }
    );
    let full = PixelRect {
        x: 0,
        y: 0,
        width: 16,
        height: 8,
    };
    assert_eq!(s.ops[2], Op::Read(full));
    assert_eq!(s.ops[3], Op::Write(full));
}

#[test]
fn unblurred_background_skips_pixel_readback() {
    let mut o = opts();
    o.blur_background = false;
    let (s, _) = run(&o, None);
    assert!(!s.kinds().contains(&"read"));
    assert!(!s.kinds().contains(&"write"));
}

#[test]
fn no_stroke_when_border_is_disabled() {
    let mut o = opts();
    o.border = false;
    o.border_color = BorderColor::Multi(vec![Rgba8::WHITE, Rgba8::TRANSPARENT]);
    let (s, _) = run(&o, None);
    assert!(!s.kinds().contains(&"stroke"));
}

#[test]
fn border_uses_gradient_paint_for_multiple_colors() {
    let mut o = opts();
    o.border_color = BorderColor::Multi(vec![
        Rgba8::new(255, 0, 0, 255),
        Rgba8::new(0, 255, 0, 255),
        Rgba8::new(0, 0, 255, 255),
    ]);
    o.gradient_direction = GradientDirection::Vertical;
    let (s, _) = run(&o, None);
    let stroke = s
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Stroke { width, paint } => Some((*width, paint.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(stroke.0, 15.0);
    let Paint::Linear(g) = stroke.1 else {
        panic!("expected gradient stroke");
    };
    assert_eq!(g.end, Point::new(0.0, 248.0));
    assert_eq!(
        g.stops.iter().map(|s| s.offset).collect::<Vec<_>>(),
        vec![0.0, 0.5, 1.0]
    );
}

#[test]
fn avatar_clip_follows_mask_shape() {
    let (s, _) = run(&opts(), None);
    let Op::PushClip(circle) = s.ops[5].clone() else {
        panic!("expected avatar clip, got {:?}", s.ops[5]);
    };
    assert!((circle.width() - 150.0).abs() < 0.5);

    let mut o = opts();
    o.circular_avatar = false;
    let (s, _) = run(&o, None);
    assert_eq!(s.ops[5], Op::PushClip(Rect::new(50.0, 48.0, 200.0, 198.0)));
    assert_eq!(
        s.ops[6],
        Op::Image {
            size: (2, 2),
            dst: Rect::new(50.0, 48.0, 200.0, 198.0),
        }
    );
}

#[test]
fn long_names_are_truncated_before_drawing() {
    let mut o = opts();
    o.username = "AlexanderTheGreat".to_owned();
    o.max_name_length = 5;
    let (s, _) = run(&o, None);
    assert_eq!(s.texts(), vec!["Alexa...".to_owned(), "Bienvenido/a".to_owned()]);

    let (s, _) = run(&opts(), None);
    assert_eq!(s.texts()[0], "Bob");
}

#[test]
fn badge_is_sized_from_measured_date_and_drawn_without_shadow() {
    let (s, _) = run(&opts(), Some("1/2/2026"));
    let expected = badge_rect(64.0);
    let fill = s
        .ops
        .iter()
        .find_map(|op| match op {
            Op::Fill { bbox, paint, shadow } => Some((*bbox, paint.clone(), *shadow)),
            _ => None,
        })
        .unwrap();
    assert_eq!(fill.0.y0, expected.y0);
    assert_eq!(fill.0.y1, expected.y1);
    assert_eq!(fill.0.x1, expected.x1);
    assert_eq!(fill.1, Paint::Solid(Rgba8::new(70, 70, 70, 179)));
    assert_eq!(fill.2, Shadow::NONE);

    let Some(Op::Text {
        text,
        origin,
        style,
    }) = s.ops.iter().rev().find(|op| matches!(op, Op::Text { .. }))
    else {
        panic!("date text missing");
    };
    assert_eq!(text, "1/2/2026");
    assert_eq!(*origin, expected.center());
    assert_eq!(style.shadow, Shadow::NONE);
    assert_eq!(style.fill, Rgba8::WHITE);
}

#[test]
fn hidden_date_skips_the_badge() {
    let mut o = opts();
    o.show_date = false;
    let (s, _) = run(&o, Some("1/2/2026"));
    assert!(!s.kinds().contains(&"measure"));
    assert!(!s.kinds().contains(&"fill"));

    let (s, _) = run(&opts(), None);
    assert!(!s.kinds().contains(&"measure"));
}

#[test]
fn text_passes_carry_their_own_shadows() {
    let (s, _) = run(&opts(), Some("1/2/2026"));
    let shadows = s
        .ops
        .iter()
        .filter_map(|op| match op {
            Op::Text { style, .. } => Some(style.shadow),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(shadows.len(), 3);
    assert_eq!(shadows[0].blur, 10.0);
    assert_eq!(shadows[1].blur, 8.0);
    assert_eq!(shadows[2], Shadow::NONE);
}

#[test]
fn same_inputs_produce_identical_output() {
    let (a, out_a) = run(&opts(), Some("1/2/2026"));
    let (b, out_b) = run(&opts(), Some("1/2/2026"));
    assert_eq!(a.ops, b.ops);
    assert_eq!(out_a, out_b);
}

#[test]
fn draw_failure_still_pops_the_clip() {
    let (bg, avatar) = images();
    let mut s = RecordingSurface {
        fail_images: true,
        ..RecordingSurface::default()
    };
    let err = compose_card(&mut s, &opts(), &bg, &avatar, None).unwrap_err();
    assert!(matches!(err, WelcardError::SurfaceCreation(_)));
    assert_eq!(s.kinds(), vec!["push_clip", "pop_clip"]);
    assert_eq!(s.depth, 0);
}
