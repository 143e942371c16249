use super::*;

fn system_fonts() -> Option<CardFonts> {
    match CardFonts::from_system() {
        Ok(fonts) => Some(fonts),
        Err(e) => {
            eprintln!("skipping: {e}");
            None
        }
    }
}

fn font(size_px: f32) -> FontSpec {
    FontSpec {
        size_px,
        weight: FontWeight::Regular,
    }
}

#[test]
fn bold_falls_back_to_regular_face() {
    let fonts = CardFonts::from_bytes(vec![1, 2, 3], None);
    assert!(!fonts.has_bold());
    assert_eq!(fonts.face(FontWeight::Bold), fonts.face(FontWeight::Regular));

    let fonts = CardFonts::from_bytes(vec![1], Some(vec![2]));
    assert!(fonts.has_bold());
    assert_eq!(fonts.face(FontWeight::Bold).data.as_slice(), &[2]);
}

#[test]
fn unreadable_font_file_is_a_surface_error() {
    let missing = std::env::temp_dir().join("welcard_missing_font_does_not_exist.ttf");
    let err = CardFonts::from_files(&missing, None).unwrap_err();
    assert!(matches!(err, WelcardError::SurfaceCreation(_)));
    assert!(err.to_string().contains("welcard_missing_font_does_not_exist.ttf"));
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let fonts = CardFonts::from_bytes(b"not a font".to_vec(), None);
    assert!(matches!(
        TextLayoutEngine::new(&fonts),
        Err(WelcardError::SurfaceCreation(_))
    ));
}

#[test]
fn shaping_width_scales_with_font_size() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    let small = engine.shape("Welcome", &font(16.0)).unwrap().width();
    let large = engine.shape("Welcome", &font(32.0)).unwrap().width();
    assert!(small > 0.0);
    assert!((large / small - 2.0).abs() < 0.1, "{small} vs {large}");
    assert_eq!(engine.shape("", &font(16.0)).unwrap().width(), 0.0);
}

#[test]
fn shaping_rejects_non_positive_sizes() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    assert!(engine.shape("x", &font(0.0)).is_err());
    assert!(engine.shape("x", &font(f32::NAN)).is_err());
}

#[test]
fn line_height_is_positive_for_text() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    let shaped = engine.shape("1/2/2026", &font(16.0)).unwrap();
    assert!(shaped.height() > 0.0);
}

#[test]
fn face_index_missing_from_the_font_data_is_rejected() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let regular = fonts.face(FontWeight::Regular);
    let bogus = FontFace {
        data: regular.data.clone(),
        index: 999,
    };
    let err = TextLayoutEngine::new(&CardFonts::new(bogus, None)).unwrap_err();
    assert!(matches!(err, WelcardError::SurfaceCreation(_)));
    assert!(err.to_string().contains("999"), "{err}");
}

#[test]
fn shaping_uses_the_face_that_gets_drawn() {
    let Some(fonts) = system_fonts() else {
        return;
    };
    let mut engine = TextLayoutEngine::new(&fonts).unwrap();
    for weight in [FontWeight::Regular, FontWeight::Bold] {
        let face = fonts.face(weight);
        let spec = FontSpec {
            size_px: 24.0,
            weight,
        };
        let shaped = engine.shape("Welcome", &spec).unwrap();
        assert_eq!(shaped.font.index, face.index);
        for line in shaped.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let used = run.run().font();
                assert_eq!(used.index, face.index, "{weight:?}");
                assert_eq!(used.data.len(), face.data.len(), "{weight:?}");
            }
        }
    }
}
