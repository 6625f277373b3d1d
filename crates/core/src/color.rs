//! Note colour conversion.

use records::NoteColor;

const OPAQUE_BLACK: &str = "rgba(0, 0, 0, 1)";

/// Convert a note colour into an `rgba(r, g, b, opacity)` string.
///
/// Accepts `#rrggbb` strings and packed `0xRRGGBB` integers. A missing, empty or zero
/// colour is opaque black whatever the requested opacity. Unparseable hex components
/// read as 0.
pub fn hex_to_rgba(color: Option<&NoteColor>, opacity: f64) -> String {
    let (r, g, b) = match color {
        None => return OPAQUE_BLACK.into(),
        Some(NoteColor::Packed(0)) => return OPAQUE_BLACK.into(),
        Some(NoteColor::Hex(hex)) if hex.is_empty() => return OPAQUE_BLACK.into(),
        Some(NoteColor::Packed(packed)) => (
            (packed >> 16) & 0xff,
            (packed >> 8) & 0xff,
            packed & 0xff,
        ),
        Some(NoteColor::Hex(hex)) => {
            let digits = hex.replacen('#', "", 1);
            (
                hex_component(&digits, 0),
                hex_component(&digits, 2),
                hex_component(&digits, 4),
            )
        }
    };
    format!("rgba({r}, {g}, {b}, {opacity})")
}

fn hex_component(digits: &str, start: usize) -> u32 {
    let end = (start + 2).min(digits.len());
    digits
        .get(start..end)
        .and_then(|pair| u32::from_str_radix(pair, 16).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_string_with_opacity() {
        let red = NoteColor::Hex("#ff0000".into());
        assert_eq!(hex_to_rgba(Some(&red), 0.5), "rgba(255, 0, 0, 0.5)");
    }

    #[test]
    fn packed_integer() {
        let green = NoteColor::Packed(0x00ff00);
        assert_eq!(hex_to_rgba(Some(&green), 1.0), "rgba(0, 255, 0, 1)");
    }

    #[test]
    fn missing_colour_is_opaque_black() {
        assert_eq!(hex_to_rgba(None, 1.0), "rgba(0, 0, 0, 1)");
        assert_eq!(hex_to_rgba(None, 0.3), "rgba(0, 0, 0, 1)");
        assert_eq!(
            hex_to_rgba(Some(&NoteColor::Hex(String::new())), 0.7),
            "rgba(0, 0, 0, 1)"
        );
        assert_eq!(
            hex_to_rgba(Some(&NoteColor::Packed(0)), 0.7),
            "rgba(0, 0, 0, 1)"
        );
    }

    #[test]
    fn hash_prefix_is_optional() {
        let blue = NoteColor::Hex("0000ff".into());
        assert_eq!(hex_to_rgba(Some(&blue), 0.7), "rgba(0, 0, 255, 0.7)");
    }

    #[test]
    fn garbage_components_read_as_zero() {
        let odd = NoteColor::Hex("#zz10".into());
        assert_eq!(hex_to_rgba(Some(&odd), 1.0), "rgba(0, 16, 0, 1)");
    }
}
