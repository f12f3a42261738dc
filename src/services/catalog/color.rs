//! Write-time color normalization for option-value swatches.
//!
//! Admin forms submit colors as `rgb(r, g, b)` or hex. Values are stored in
//! the normalized `#rrggbb` form; reads never reinterpret the stored string.

use once_cell::sync::Lazy;
use regex::Regex;

static HEX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex pattern"));

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^rgb\s*\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
        .expect("valid rgb pattern")
});

/// Normalizes a color string to lowercase `#rrggbb`.
///
/// Accepts `#rgb` (expanded), `#rrggbb` (passed through), and
/// `rgb(r, g, b)` with components in 0..=255. Returns `None` for anything
/// else, including out-of-range rgb components.
pub fn normalize_color(input: &str) -> Option<String> {
    let trimmed = input.trim();

    if HEX_RE.is_match(trimmed) {
        let digits = &trimmed[1..];
        let expanded = if digits.len() == 3 {
            digits
                .chars()
                .flat_map(|c| [c, c])
                .collect::<String>()
        } else {
            digits.to_string()
        };
        return Some(format!("#{}", expanded.to_lowercase()));
    }

    if let Some(caps) = RGB_RE.captures(trimmed) {
        let mut channels = [0u8; 3];
        for (i, channel) in channels.iter_mut().enumerate() {
            // Regex limits to 1-3 digits, so only range can fail here
            *channel = caps[i + 1].parse::<u16>().ok().filter(|v| *v <= 255)? as u8;
        }
        return Some(format!(
            "#{:02x}{:02x}{:02x}",
            channels[0], channels[1], channels[2]
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("rgb(255, 0, 0)", "#ff0000"; "rgb red")]
    #[test_case("rgb(0,128,255)", "#0080ff"; "rgb no spaces")]
    #[test_case("rgb( 12 , 34 , 56 )", "#0c2238"; "rgb extra spaces")]
    #[test_case("#FF0000", "#ff0000"; "hex lowercased")]
    #[test_case("#fff", "#ffffff"; "short hex expanded")]
    #[test_case("#A1b", "#aa11bb"; "short hex mixed case")]
    #[test_case("  #00ff00  ", "#00ff00"; "surrounding whitespace trimmed")]
    fn normalizes(input: &str, expected: &str) {
        assert_eq!(normalize_color(input).as_deref(), Some(expected));
    }

    #[test_case("Rojo"; "plain text")]
    #[test_case("rgb(300, 0, 0)"; "component out of range")]
    #[test_case("rgb(1, 2)"; "missing component")]
    #[test_case("#ff00"; "wrong hex length")]
    #[test_case("ff0000"; "missing hash")]
    #[test_case(""; "empty")]
    fn rejects(input: &str) {
        assert_eq!(normalize_color(input), None);
    }
}
