//! Color utility functions shared across the application.
//!
//! Class colors are stored as normalized `#rrggbb` strings, which is what the
//! SVG export writes verbatim. The PNG rasterizer and the fill styles need the
//! numeric form, so parsing and formatting live here.

/// Convert HSV to RGB.
///
/// # Arguments
/// * `h` - Hue in degrees (0-360)
/// * `s` - Saturation (0.0-1.0)
/// * `v` - Value/brightness (0.0-1.0)
///
/// # Returns
/// RGB tuple with values in range 0.0-1.0
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (r + m, g + m, b + m)
}

/// Parse a `#rrggbb` or `#rgb` hex color (the leading `#` is optional).
pub fn parse_hex(color: &str) -> Option<[u8; 3]> {
    let hex = color.trim().trim_start_matches('#');
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some([r, g, b])
        }
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(rgb)
        }
        _ => None,
    }
}

/// Format an RGB triple as a lowercase `#rrggbb` string.
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Normalize any accepted hex notation to lowercase `#rrggbb`.
pub fn normalize_hex(color: &str) -> Option<String> {
    parse_hex(color).map(to_hex)
}

/// Generate the n-th color of a well-spread sequence.
///
/// Successive indices step the hue by the golden angle, so neighbouring
/// classes never get similar colors.
pub fn distinct_color(index: u32) -> [u8; 3] {
    let hue = (index as f32 * 137.5) % 360.0;
    let (r, g, b) = hsv_to_rgb(hue, 0.7, 0.9);
    [
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8,
    ]
}

/// Convert a 0.0-1.0 alpha into an 8-bit channel value.
pub fn alpha_to_u8(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_to_rgb_red() {
        let (r, g, b) = hsv_to_rgb(0.0, 1.0, 1.0);
        assert!((r - 1.0).abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!(b.abs() < 0.01);
    }

    #[test]
    fn test_hsv_to_rgb_blue() {
        let (r, g, b) = hsv_to_rgb(240.0, 1.0, 1.0);
        assert!(r.abs() < 0.01);
        assert!(g.abs() < 0.01);
        assert!((b - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(parse_hex("#532ee3"), Some([0x53, 0x2e, 0xe3]));
        assert_eq!(parse_hex("532EE3"), Some([0x53, 0x2e, 0xe3]));
        assert_eq!(parse_hex("#f0a"), Some([0xff, 0x00, 0xaa]));
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#gggggg"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn test_normalize_hex() {
        assert_eq!(normalize_hex("#ABCDEF").as_deref(), Some("#abcdef"));
        assert_eq!(normalize_hex("#fff").as_deref(), Some("#ffffff"));
        assert_eq!(normalize_hex("red"), None);
    }

    #[test]
    fn test_distinct_colors_differ() {
        let colors: Vec<_> = (0..10).map(distinct_color).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
