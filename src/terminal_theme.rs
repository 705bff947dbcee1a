//! Concrete RGB values for the terminal's system colors.
//!
//! Standard colors (indices 0-15) and the default foreground/background are
//! chosen by the terminal. A [`TerminalTheme`] pins them to fixed triplets so
//! they can be rendered at the truecolor tier.

use crate::color::ColorTriplet;
use crate::palette::Palette;

/// The background, foreground and 16 ANSI colors of a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalTheme {
    pub background: ColorTriplet,
    pub foreground: ColorTriplet,
    pub ansi_colors: [ColorTriplet; 16],
}

impl TerminalTheme {
    /// Build a theme from the 8 normal colors and, optionally, the 8 bright ones.
    ///
    /// Without a bright set the normal colors are repeated.
    #[must_use]
    pub const fn new(
        background: ColorTriplet,
        foreground: ColorTriplet,
        normal: [ColorTriplet; 8],
        bright: Option<[ColorTriplet; 8]>,
    ) -> Self {
        let bright = match bright {
            Some(bright) => bright,
            None => normal,
        };
        let mut ansi_colors = [ColorTriplet::new(0, 0, 0); 16];
        let mut i = 0;
        while i < 8 {
            ansi_colors[i] = normal[i];
            ansi_colors[i + 8] = bright[i];
            i += 1;
        }
        Self {
            background,
            foreground,
            ansi_colors,
        }
    }

    /// Build a theme whose 16 ANSI colors come from an existing palette.
    ///
    /// Missing entries (palettes shorter than 16) are black.
    #[must_use]
    pub fn from_palette(background: ColorTriplet, foreground: ColorTriplet, palette: &Palette) -> Self {
        let mut ansi_colors = [ColorTriplet::default(); 16];
        for (slot, color) in ansi_colors.iter_mut().zip(palette.iter()) {
            *slot = *color;
        }
        Self {
            background,
            foreground,
            ansi_colors,
        }
    }

    /// The triplet for standard color `index`; out-of-range indices wrap.
    #[must_use]
    pub const fn ansi_color(&self, index: usize) -> ColorTriplet {
        self.ansi_colors[index % 16]
    }
}

impl Default for TerminalTheme {
    fn default() -> Self {
        DEFAULT_TERMINAL_THEME
    }
}

const fn rgb(red: u8, green: u8, blue: u8) -> ColorTriplet {
    ColorTriplet::new(red, green, blue)
}

/// Black on white with xterm's standard colors.
pub const DEFAULT_TERMINAL_THEME: TerminalTheme = TerminalTheme::new(
    rgb(255, 255, 255),
    rgb(0, 0, 0),
    [
        rgb(0, 0, 0),
        rgb(128, 0, 0),
        rgb(0, 128, 0),
        rgb(128, 128, 0),
        rgb(0, 0, 128),
        rgb(128, 0, 128),
        rgb(0, 128, 128),
        rgb(192, 192, 192),
    ],
    Some([
        rgb(128, 128, 128),
        rgb(255, 0, 0),
        rgb(0, 255, 0),
        rgb(255, 255, 0),
        rgb(0, 0, 255),
        rgb(255, 0, 255),
        rgb(0, 255, 255),
        rgb(255, 255, 255),
    ]),
);

/// Monokai, a dark theme.
pub const MONOKAI: TerminalTheme = TerminalTheme::new(
    rgb(12, 12, 12),
    rgb(217, 217, 217),
    [
        rgb(26, 26, 26),
        rgb(244, 0, 95),
        rgb(152, 224, 36),
        rgb(253, 151, 31),
        rgb(157, 101, 255),
        rgb(244, 0, 95),
        rgb(88, 209, 235),
        rgb(196, 197, 181),
    ],
    Some([
        rgb(98, 94, 76),
        rgb(244, 0, 95),
        rgb(152, 224, 36),
        rgb(224, 213, 97),
        rgb(157, 101, 255),
        rgb(244, 0, 95),
        rgb(88, 209, 235),
        rgb(246, 246, 239),
    ]),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::STANDARD_PALETTE;

    #[test]
    fn test_default_theme_matches_standard_palette() {
        for i in 0..16 {
            assert_eq!(DEFAULT_TERMINAL_THEME.ansi_color(i), STANDARD_PALETTE[i]);
        }
        assert_eq!(TerminalTheme::default(), DEFAULT_TERMINAL_THEME);
    }

    #[test]
    fn test_new_without_bright_repeats_normal() {
        let normal = [rgb(1, 1, 1); 8];
        let theme = TerminalTheme::new(rgb(0, 0, 0), rgb(255, 255, 255), normal, None);
        assert_eq!(theme.ansi_color(3), rgb(1, 1, 1));
        assert_eq!(theme.ansi_color(11), rgb(1, 1, 1));
    }

    #[test]
    fn test_from_palette() {
        let theme = TerminalTheme::from_palette(rgb(0, 0, 0), rgb(255, 255, 255), &STANDARD_PALETTE);
        assert_eq!(theme.ansi_colors, DEFAULT_TERMINAL_THEME.ansi_colors);
    }

    #[test]
    fn test_ansi_color_wraps() {
        assert_eq!(MONOKAI.ansi_color(17), MONOKAI.ansi_color(1));
    }
}
