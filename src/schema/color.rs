use crate::foundation::core::Rgba8;

/// Parse a CSS-style color limited to `#rgb`, `#rrggbb`, `rgb(r, g, b)` and `rgba(r, g, b, a)`.
///
/// Channels are integers in `0..=255`; the optional alpha is a decimal in `0..=1` written with a
/// leading digit (`0.5`, `1`). Both functional names accept either three or four components.
pub fn parse_color(s: &str) -> Result<Rgba8, String> {
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    if let Some(body) = s.strip_prefix("rgba(").or_else(|| s.strip_prefix("rgb(")) {
        let body = body
            .strip_suffix(')')
            .ok_or_else(|| format!("functional color \"{s}\" is missing ')'"))?;
        return parse_functional(body);
    }
    Err(format!(
        "\"{s}\" is not a '#hex', 'rgb()' or 'rgba()' color"
    ))
}

/// Return `true` when `s` satisfies the color grammar.
pub fn is_valid_color(s: &str) -> bool {
    parse_color(s).is_ok()
}

fn parse_hex(hex: &str) -> Result<Rgba8, String> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("invalid hex digits in \"#{hex}\""));
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).unwrap_or(0);
    match hex.len() {
        3 => Ok(Rgba8::new(
            nibble(0) * 17,
            nibble(1) * 17,
            nibble(2) * 17,
            255,
        )),
        6 => {
            let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
            Ok(Rgba8::new(byte(0), byte(2), byte(4), 255))
        }
        n => Err(format!("hex color must have 3 or 6 digits, got {n}")),
    }
}

fn parse_functional(body: &str) -> Result<Rgba8, String> {
    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(format!(
            "expected 3 channels and an optional alpha, got {} components",
            parts.len()
        ));
    }

    let channel = |p: &str| -> Result<u8, String> {
        if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("channel \"{p}\" must be an integer"));
        }
        p.parse::<u8>()
            .map_err(|_| format!("channel \"{p}\" must be in 0..=255"))
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;

    let a = match parts.get(3) {
        None => 1.0,
        Some(p) => parse_alpha(p)?,
    };
    Ok(Rgba8::with_alpha(r, g, b, a))
}

fn parse_alpha(p: &str) -> Result<f64, String> {
    let (int, frac) = match p.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (p, None),
    };
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(int) || frac.is_some_and(|f| !digits(f)) {
        return Err(format!("alpha \"{p}\" must be a decimal number"));
    }
    let a: f64 = p
        .parse()
        .map_err(|_| format!("alpha \"{p}\" must be a decimal number"))?;
    if !(0.0..=1.0).contains(&a) {
        return Err(format!("alpha \"{p}\" must be in 0..=1"));
    }
    Ok(a)
}

#[cfg(test)]
#[path = "../../tests/unit/schema/color.rs"]
mod tests;
