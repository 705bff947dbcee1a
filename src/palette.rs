//! Fixed color palettes and nearest-color search.
//!
//! Three tables back every downgrade:
//! - [`STANDARD_PALETTE`]: the 16 ANSI colors with xterm's default values
//! - [`WINDOWS_PALETTE`]: the legacy Windows console's 16 colors
//! - [`EIGHT_BIT_PALETTE`]: the 256-color table (standard 16, 6x6x6 cube,
//!   24-step grayscale ramp)

use std::ops::{Index, Range};

use crate::color::ColorTriplet;

/// An immutable, indexable list of colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    colors: &'static [ColorTriplet],
}

impl Palette {
    #[must_use]
    pub const fn new(colors: &'static [ColorTriplet]) -> Self {
        Self { colors }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<ColorTriplet> {
        self.colors.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorTriplet> {
        self.colors.iter()
    }

    /// Index of the entry closest to `color` by weighted distance.
    ///
    /// Ties resolve to the lowest index.
    #[must_use]
    pub fn match_color(&self, color: ColorTriplet) -> u8 {
        self.match_in_range(color, 0..self.colors.len())
            .unwrap_or_default()
    }

    /// Like [`match_color`](Self::match_color), restricted to `range`.
    ///
    /// The range is clipped to the palette; `None` when nothing is left.
    #[must_use]
    pub fn match_in_range(&self, color: ColorTriplet, range: Range<usize>) -> Option<u8> {
        let end = range.end.min(self.colors.len());
        let start = range.start.min(end);

        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in self.colors[start..end].iter().enumerate() {
            let distance = color.weighted_distance(candidate);
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((start + index, distance));
            }
        }
        best.and_then(|(index, _)| u8::try_from(index).ok())
    }
}

impl Index<usize> for Palette {
    type Output = ColorTriplet;

    fn index(&self, index: usize) -> &Self::Output {
        &self.colors[index]
    }
}

const fn rgb(red: u8, green: u8, blue: u8) -> ColorTriplet {
    ColorTriplet::new(red, green, blue)
}

const STANDARD_COLORS: [ColorTriplet; 16] = [
    rgb(0, 0, 0),
    rgb(128, 0, 0),
    rgb(0, 128, 0),
    rgb(128, 128, 0),
    rgb(0, 0, 128),
    rgb(128, 0, 128),
    rgb(0, 128, 128),
    rgb(192, 192, 192),
    rgb(128, 128, 128),
    rgb(255, 0, 0),
    rgb(0, 255, 0),
    rgb(255, 255, 0),
    rgb(0, 0, 255),
    rgb(255, 0, 255),
    rgb(0, 255, 255),
    rgb(255, 255, 255),
];

const WINDOWS_COLORS: [ColorTriplet; 16] = [
    rgb(12, 12, 12),
    rgb(197, 15, 31),
    rgb(19, 161, 14),
    rgb(193, 156, 0),
    rgb(0, 55, 218),
    rgb(136, 23, 152),
    rgb(58, 150, 221),
    rgb(204, 204, 204),
    rgb(118, 118, 118),
    rgb(231, 72, 86),
    rgb(22, 198, 12),
    rgb(249, 241, 165),
    rgb(59, 120, 255),
    rgb(180, 0, 158),
    rgb(97, 214, 214),
    rgb(242, 242, 242),
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const fn build_eight_bit() -> [ColorTriplet; 256] {
    let mut colors = [rgb(0, 0, 0); 256];

    let mut i = 0;
    while i < 16 {
        colors[i] = STANDARD_COLORS[i];
        i += 1;
    }

    let mut r = 0;
    while r < 6 {
        let mut g = 0;
        while g < 6 {
            let mut b = 0;
            while b < 6 {
                colors[16 + 36 * r + 6 * g + b] =
                    rgb(CUBE_LEVELS[r], CUBE_LEVELS[g], CUBE_LEVELS[b]);
                b += 1;
            }
            g += 1;
        }
        r += 1;
    }

    let mut step = 0;
    while step < 24 {
        #[expect(clippy::cast_possible_truncation, reason = "at most 238")]
        let level = (8 + 10 * step) as u8;
        colors[232 + step] = rgb(level, level, level);
        step += 1;
    }

    colors
}

const EIGHT_BIT_COLORS: [ColorTriplet; 256] = build_eight_bit();

/// The 16 standard ANSI colors.
pub static STANDARD_PALETTE: Palette = Palette::new(&STANDARD_COLORS);

/// The legacy Windows console colors.
pub static WINDOWS_PALETTE: Palette = Palette::new(&WINDOWS_COLORS);

/// The 256-color palette.
pub static EIGHT_BIT_PALETTE: Palette = Palette::new(&EIGHT_BIT_COLORS);
