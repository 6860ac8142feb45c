use serde::{Deserialize, Serialize};

use crate::geometry::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub const fn default_backdrop_color(self) -> Color {
        match self {
            ThemeMode::Light => Color::WHITE,
            ThemeMode::Dark => Color::BLACK,
        }
    }
}

/// Resolve the backdrop color for `mode`, applying a `#rrggbb` override when it parses.
pub fn resolve_backdrop_color(mode: ThemeMode, override_hex: Option<&str>) -> Color {
    let Some(hex) = override_hex else {
        return mode.default_backdrop_color();
    };
    parse_hex_color(hex).unwrap_or_else(|| {
        tracing::warn!(hex, ?mode, "invalid backdrop color override; using theme default");
        mode.default_backdrop_color()
    })
}

fn parse_hex_color(value: &str) -> Option<Color> {
    let digits = value.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    Some(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_color_follows_theme_mode() {
        assert_eq!(resolve_backdrop_color(ThemeMode::Light, None), Color::WHITE);
        assert_eq!(resolve_backdrop_color(ThemeMode::Dark, None), Color::BLACK);
    }

    #[test]
    fn backdrop_color_override_applies_when_valid() {
        assert_eq!(
            resolve_backdrop_color(ThemeMode::Dark, Some("#1a2B3c")),
            Color::new(0x1a, 0x2b, 0x3c)
        );
    }

    #[test]
    fn backdrop_color_override_falls_back_when_malformed() {
        assert_eq!(
            resolve_backdrop_color(ThemeMode::Dark, Some("1a2b3c")),
            Color::BLACK
        );
        assert_eq!(
            resolve_backdrop_color(ThemeMode::Light, Some("#12345")),
            Color::WHITE
        );
        assert_eq!(
            resolve_backdrop_color(ThemeMode::Light, Some("#gg0000")),
            Color::WHITE
        );
    }

    #[test]
    fn theme_mode_parses_lowercase_names() {
        let mode: ThemeMode = serde_json::from_str("\"dark\"").expect("dark should parse");
        assert_eq!(mode, ThemeMode::Dark);
        assert!(serde_json::from_str::<ThemeMode>("\"system\"").is_err());
    }
}
