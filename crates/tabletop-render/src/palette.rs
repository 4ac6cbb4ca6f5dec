//! Colors used by the renderer.

use peniko::Color;

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
pub fn parse_css_color(value: &str) -> Option<Color> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Color::from_rgba8(rgb[0], rgb[1], rgb[2], 255))
        }
        6 => Some(Color::from_rgba8(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            255,
        )),
        8 => Some(Color::from_rgba8(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

/// Parse a stored color, falling back when it is not understood.
pub fn color_or(value: &str, fallback: Color) -> Color {
    parse_css_color(value).unwrap_or_else(|| {
        log::debug!("unrecognized color {:?}", value);
        fallback
    })
}

/// Renderer colors.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Behind the map.
    pub clear: Color,
    pub grid: Color,
    pub fog: Color,
    pub selection: Color,
    pub label: Color,
    pub hp_track: Color,
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub badge: Color,
    pub badge_text: Color,
    /// Used when a stored color cannot be parsed.
    pub fallback: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            clear: Color::from_rgba8(17, 24, 39, 255),
            grid: Color::from_rgba8(255, 255, 255, 60),
            fog: Color::from_rgba8(0, 0, 0, 200),
            selection: Color::from_rgba8(59, 130, 246, 255),
            label: Color::from_rgba8(255, 255, 255, 255),
            hp_track: Color::from_rgba8(31, 41, 55, 220),
            success: Color::from_rgba8(34, 197, 94, 255),
            warning: Color::from_rgba8(245, 158, 11, 255),
            danger: Color::from_rgba8(239, 68, 68, 255),
            badge: Color::from_rgba8(124, 58, 237, 255),
            badge_text: Color::from_rgba8(255, 255, 255, 255),
            fallback: Color::from_rgba8(128, 128, 128, 255),
        }
    }
}

impl Palette {
    /// HP bar color: success above 50%, warning above 25%, danger otherwise.
    pub fn hp_color(&self, ratio: f64) -> Color {
        if ratio > 0.5 {
            self.success
        } else if ratio > 0.25 {
            self.warning
        } else {
            self.danger
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(color: Color) -> [u8; 4] {
        let c = color.to_rgba8();
        [c.r, c.g, c.b, c.a]
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(parse_css_color("#ef4444").map(rgba), Some([239, 68, 68, 255]));
        assert_eq!(parse_css_color("#fff").map(rgba), Some([255, 255, 255, 255]));
        assert_eq!(parse_css_color("#00000080").map(rgba), Some([0, 0, 0, 128]));
        assert!(parse_css_color("red").is_none());
        assert!(parse_css_color("#12345").is_none());
        assert!(parse_css_color("#zzzzzz").is_none());
    }

    #[test]
    fn test_hp_thresholds() {
        let palette = Palette::default();
        assert_eq!(rgba(palette.hp_color(0.51)), rgba(palette.success));
        assert_eq!(rgba(palette.hp_color(0.5)), rgba(palette.warning));
        assert_eq!(rgba(palette.hp_color(0.26)), rgba(palette.warning));
        assert_eq!(rgba(palette.hp_color(0.25)), rgba(palette.danger));
        assert_eq!(rgba(palette.hp_color(0.0)), rgba(palette.danger));
    }
}
