use super::*;

#[test]
fn type_mismatch_lists_every_expected_type() {
    let err = WelcardError::TypeMismatch {
        key: "borderColor",
        expected: vec![JsonType::String, JsonType::Array],
        actual: JsonType::Number,
    };
    assert_eq!(
        err.to_string(),
        "option 'borderColor' must be of type string or array, got: number"
    );
}

#[test]
fn invalid_color_message_depends_on_position() {
    let in_seq = WelcardError::InvalidColor {
        key: "borderColor",
        value: "notacolor".to_owned(),
        in_sequence: true,
    };
    assert_eq!(
        in_seq.to_string(),
        "one of the colors in 'borderColor' is not valid: 'notacolor'"
    );

    let scalar = WelcardError::InvalidColor {
        key: "borderColor",
        value: "blue".to_owned(),
        in_sequence: false,
    };
    assert!(scalar.to_string().contains("got: 'blue'"));
}

#[test]
fn enum_message_joins_allowed_values() {
    let err = WelcardError::InvalidEnum {
        key: "gradientDirection",
        allowed: &["horizontal", "vertical", "diagonal"],
        actual: "upward".to_owned(),
    };
    assert_eq!(
        err.to_string(),
        "'gradientDirection' must be one of: horizontal, vertical, diagonal, got: 'upward'"
    );
}

#[test]
fn validation_classification_and_key() {
    let err = WelcardError::InvalidUrl {
        key: "avatarURL",
        value: "not a url".to_owned(),
    };
    assert!(err.is_validation());
    assert_eq!(err.key(), Some("avatarURL"));

    let err = WelcardError::image("https://example.com/a.png", "404");
    assert!(!err.is_validation());
    assert_eq!(err.key(), None);
    assert!(err.to_string().contains("https://example.com/a.png"));

    assert!(
        WelcardError::surface("oom")
            .to_string()
            .contains("surface creation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WelcardError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
