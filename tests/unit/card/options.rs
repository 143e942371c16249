use super::*;
use serde_json::json;

fn base() -> Value {
    json!({
        "username": "Bob",
        "avatarURL": "https://example.com/a.png",
        "backgroundURL": "https://example.com/bg.png",
    })
}

#[test]
fn defaults_are_applied_after_validation() {
    let opts = CardOptions::from_value(&base()).unwrap();
    assert_eq!(opts.username, "Bob");
    assert!(opts.circular_avatar);
    assert!(opts.show_date);
    assert!(opts.border);
    assert!(opts.blur_background);
    assert_eq!(opts.gradient_direction, GradientDirection::Horizontal);
    assert_eq!(opts.max_name_length, 11);
    assert_eq!(opts.welcome_text, "Bienvenido/a");
    assert_eq!(
        opts.border_color,
        BorderColor::Single(parse_color(DEFAULT_BORDER_COLOR).unwrap())
    );
}

#[test]
fn explicit_values_override_defaults() {
    let mut v = base();
    let m = v.as_object_mut().unwrap();
    m.insert("circularAvatar".into(), json!(false));
    m.insert("showDate".into(), json!(false));
    m.insert("border".into(), json!(false));
    m.insert("blurBackground".into(), json!(false));
    m.insert("gradientDirection".into(), json!("diagonal"));
    m.insert("maxNameLength".into(), json!(5));
    m.insert("welcomeText".into(), json!("Welcome"));
    m.insert("borderColor".into(), json!(["#f00", "#00ff00", "rgb(0,0,255)"]));

    let opts = CardOptions::from_value(&v).unwrap();
    assert!(!opts.circular_avatar);
    assert!(!opts.show_date);
    assert!(!opts.border);
    assert!(!opts.blur_background);
    assert_eq!(opts.gradient_direction, GradientDirection::Diagonal);
    assert_eq!(opts.max_name_length, 5);
    assert_eq!(opts.welcome_text, "Welcome");
    assert_eq!(
        opts.border_color,
        BorderColor::Multi(vec![
            Rgba8::new(255, 0, 0, 255),
            Rgba8::new(0, 255, 0, 255),
            Rgba8::new(0, 0, 255, 255),
        ])
    );
}

#[test]
fn validation_failure_prevents_defaulting() {
    let mut v = base();
    v["gradientDirection"] = json!("upward");
    let err = CardOptions::from_value(&v).unwrap_err();
    assert!(matches!(err, WelcardError::InvalidEnum { .. }));
}

#[test]
fn missing_required_keys_fail_at_resolve() {
    let err = CardOptions::from_value(&json!({"username": "Bob"})).unwrap_err();
    assert!(matches!(err, WelcardError::MissingOption { key: "avatarURL" }));
    assert!(err.is_validation());

    let err = CardOptions::from_value(&json!({})).unwrap_err();
    assert!(matches!(err, WelcardError::MissingOption { key: "username" }));
}

#[test]
fn short_border_color_sequences_stroke_solid() {
    let mut v = base();
    v["borderColor"] = json!(["#123456"]);
    let opts = CardOptions::from_value(&v).unwrap();
    assert_eq!(
        opts.border_color,
        BorderColor::Single(Rgba8::new(0x12, 0x34, 0x56, 255))
    );

    v["borderColor"] = json!([]);
    let opts = CardOptions::from_value(&v).unwrap();
    assert_eq!(opts.border_color, BorderColor::Single(default_border_color()));
}

#[test]
fn name_limit_truncates_and_clamps() {
    assert_eq!(name_limit(5.0), 5);
    assert_eq!(name_limit(5.9), 5);
    assert_eq!(name_limit(-3.0), 0);
    assert_eq!(name_limit(f64::INFINITY), usize::MAX);
}
