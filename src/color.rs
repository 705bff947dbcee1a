//! Color system for terminal rendering.
//!
//! This module provides:
//! - [`ColorTriplet`], an RGB value with the color math used for palette matching
//! - [`Color`], a tagged color in one of four tiers (standard 16, 256, truecolor,
//!   legacy Windows console) or the terminal default
//! - parsing from the color grammar and downgrading to a coarser tier
//!
//! # Examples
//!
//! ## Parsing Colors
//!
//! ```
//! use rich_core::color::Color;
//!
//! let red = Color::parse("red").unwrap();
//! let bright_blue = Color::parse("bright_blue").unwrap();
//! let orange = Color::parse("#ff8800").unwrap();
//! let custom = Color::parse("rgb(100, 150, 200)").unwrap();
//! let color196 = Color::parse("color(196)").unwrap();
//! assert!(Color::parse("#f80").is_err());
//! ```
//!
//! ## Color Downgrading
//!
//! ```
//! use rich_core::color::{Color, ColorSystem};
//!
//! let orange = Color::parse("#ff5500").unwrap();
//! assert_eq!(orange.downgrade(ColorSystem::EightBit).number, Some(202));
//! ```
//!
//! ## ANSI Code Generation
//!
//! ```
//! use rich_core::color::Color;
//!
//! let red = Color::from_ansi(1);
//! assert_eq!(red.get_ansi_codes(true), vec!["31"]);
//! assert_eq!(red.get_ansi_codes(false), vec!["41"]);
//!
//! let rgb = Color::from_rgb(255, 0, 0);
//! assert_eq!(rgb.get_ansi_codes(true), vec!["38", "2", "255", "0", "0"]);
//! ```

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::cache::RenderCache;
use crate::palette::{EIGHT_BIT_PALETTE, STANDARD_PALETTE, WINDOWS_PALETTE};
use crate::terminal_theme::{DEFAULT_TERMINAL_THEME, TerminalTheme};

/// RGB color triplet with values 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorTriplet {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl ColorTriplet {
    /// Create a new color triplet from RGB components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Create a triplet from wide integers, clamping each component to 0-255.
    #[must_use]
    pub fn clamped(red: i64, green: i64, blue: i64) -> Self {
        Self::new(clamp_channel(red), clamp_channel(green), clamp_channel(blue))
    }

    /// Parse exactly six hex digits, with an optional leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`ColorParseError::InvalidHex`] for any other length or for
    /// non-hex characters.
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidHex(hex.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::InvalidHex(hex.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Build a triplet from hue (degrees, taken mod 360), saturation and
    /// lightness (both percentages 0-100).
    #[must_use]
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0);
        let s = (saturation / 100.0).clamp(0.0, 1.0);
        let l = (lightness / 100.0).clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let sector = h / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let m = l - chroma / 2.0;

        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "sector is in 0..6"
        )]
        let (r, g, b) = match sector.floor() as u8 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };

        let to_channel = |v: f64| {
            #[expect(clippy::cast_possible_truncation, reason = "rounded and clamped first")]
            let rounded = ((v + m) * 255.0).round() as i64;
            clamp_channel(rounded)
        };
        Self::new(to_channel(r), to_channel(g), to_channel(b))
    }

    /// Returns CSS-style hex format `#rrggbb`.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// Returns CSS-style rgb format `rgb(r,g,b)`.
    #[must_use]
    pub fn rgb(&self) -> String {
        format!("rgb({},{},{})", self.red, self.green, self.blue)
    }

    /// Returns normalized RGB as floats in range 0.0-1.0.
    #[must_use]
    pub fn normalized(&self) -> (f64, f64, f64) {
        (
            f64::from(self.red) / 255.0,
            f64::from(self.green) / 255.0,
            f64::from(self.blue) / 255.0,
        )
    }

    /// Convert to (hue, lightness, saturation), each in 0.0-1.0.
    #[must_use]
    pub fn to_hls(&self) -> (f64, f64, f64) {
        let (r, g, b) = self.normalized();
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let lightness = f64::midpoint(max, min);

        if (max - min).abs() < f64::EPSILON {
            return (0.0, lightness, 0.0);
        }

        let delta = max - min;
        let saturation = if lightness <= 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };

        let hue = if (max - r).abs() < f64::EPSILON {
            (g - b) / delta
        } else if (max - g).abs() < f64::EPSILON {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };

        ((hue / 6.0).rem_euclid(1.0), lightness, saturation)
    }

    /// WCAG relative luminance.
    #[must_use]
    pub fn luminance(&self) -> f64 {
        let linear = |c: f64| {
            if c <= 0.039_28 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        let (r, g, b) = self.normalized();
        0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
    }

    /// True if the luminance is below 0.5.
    #[must_use]
    pub fn is_dark(&self) -> bool {
        self.luminance() < 0.5
    }

    /// Plain Euclidean distance in RGB space.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dr = f64::from(self.red) - f64::from(other.red);
        let dg = f64::from(self.green) - f64::from(other.green);
        let db = f64::from(self.blue) - f64::from(other.blue);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Red-mean weighted distance, closer to perceived difference than
    /// [`distance`](Self::distance). Used for every palette match.
    #[must_use]
    pub fn weighted_distance(&self, other: &Self) -> f64 {
        let mean_red = f64::midpoint(f64::from(self.red), f64::from(other.red));
        let dr = f64::from(self.red) - f64::from(other.red);
        let dg = f64::from(self.green) - f64::from(other.green);
        let db = f64::from(self.blue) - f64::from(other.blue);

        let weight_red = 2.0 + mean_red / 256.0;
        let weight_green = 4.0;
        let weight_blue = 2.0 + (255.0 - mean_red) / 256.0;

        (weight_red * dr * dr + weight_green * dg * dg + weight_blue * db * db).sqrt()
    }

    /// Linear blend towards `other`; `cross_fade` 0.0 keeps `self`, 1.0 gives `other`.
    #[must_use]
    pub fn blend(&self, other: &Self, cross_fade: f64) -> Self {
        let fade = cross_fade.clamp(0.0, 1.0);
        let mix = |from: u8, to: u8| {
            let from = f64::from(from);
            #[expect(clippy::cast_possible_truncation, reason = "stays within the two inputs")]
            let mixed = (from + (f64::from(to) - from) * fade) as i64;
            clamp_channel(mixed)
        };
        Self::new(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
        )
    }
}

fn clamp_channel(value: i64) -> u8 {
    u8::try_from(value.clamp(0, 255)).unwrap_or(u8::MAX)
}

impl From<(u8, u8, u8)> for ColorTriplet {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

impl From<[u8; 3]> for ColorTriplet {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::new(red, green, blue)
    }
}

impl fmt::Display for ColorTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Terminal color tier a render call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ColorSystem {
    /// 4-bit ANSI colors (16 colors).
    #[default]
    Standard = 1,
    /// 8-bit colors (256 colors).
    EightBit = 2,
    /// 24-bit RGB colors.
    TrueColor = 3,
    /// Legacy Windows console palette (16 colors).
    Windows = 4,
}

impl ColorSystem {
    /// Get the name of this color system.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::EightBit => "256",
            Self::TrueColor => "truecolor",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for ColorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorSystem {
    type Err = UnknownColorSystem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" | "16" => Ok(Self::Standard),
            "256" | "eight_bit" | "8bit" => Ok(Self::EightBit),
            "truecolor" | "24bit" => Ok(Self::TrueColor),
            "windows" | "legacy_windows" => Ok(Self::Windows),
            _ => Err(UnknownColorSystem(s.to_string())),
        }
    }
}

/// A color system name that is not one of `standard`, `256`, `truecolor`, `windows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColorSystem(pub String);

impl fmt::Display for UnknownColorSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown color system: {}", self.0)
    }
}

impl std::error::Error for UnknownColorSystem {}

/// Type of color stored in a [`Color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ColorType {
    /// Default terminal color (no RGB/number).
    #[default]
    Default = 0,
    /// 4-bit ANSI standard color (0-15).
    Standard = 1,
    /// 8-bit color (0-255).
    EightBit = 2,
    /// 24-bit RGB color.
    TrueColor = 3,
    /// Legacy Windows console color (0-15).
    Windows = 4,
}

/// A terminal color.
///
/// `number` is set for `Standard`, `EightBit` and `Windows`; `triplet` only for
/// `TrueColor`; neither for `Default`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color {
    /// Name of the color (the input that was parsed).
    pub name: String,
    /// Type of color.
    pub color_type: ColorType,
    /// Palette index.
    pub number: Option<u8>,
    /// RGB components.
    pub triplet: Option<ColorTriplet>,
}

impl Default for Color {
    fn default() -> Self {
        Self::default_color()
    }
}

impl Color {
    /// The terminal's default color.
    #[must_use]
    pub fn default_color() -> Self {
        Self {
            name: "default".to_string(),
            color_type: ColorType::Default,
            number: None,
            triplet: None,
        }
    }

    /// Create a color from a 256-palette index. Indices below 16 are standard colors.
    #[must_use]
    pub fn from_ansi(number: u8) -> Self {
        let color_type = if number < 16 {
            ColorType::Standard
        } else {
            ColorType::EightBit
        };
        Self {
            name: indexed_name(color_type, number),
            color_type,
            number: Some(number),
            triplet: None,
        }
    }

    /// Create a legacy Windows console color (index taken mod 16).
    #[must_use]
    pub fn from_windows(number: u8) -> Self {
        let number = number % 16;
        Self {
            name: indexed_name(ColorType::Windows, number),
            color_type: ColorType::Windows,
            number: Some(number),
            triplet: None,
        }
    }

    /// Create a truecolor color from a triplet.
    #[must_use]
    pub fn from_triplet(triplet: ColorTriplet) -> Self {
        Self {
            name: triplet.hex(),
            color_type: ColorType::TrueColor,
            number: None,
            triplet: Some(triplet),
        }
    }

    /// Create a truecolor color from RGB components.
    #[must_use]
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::from_triplet(ColorTriplet::new(red, green, blue))
    }

    /// A palette color of the given type, named so it parses back to itself.
    pub(crate) fn indexed(color_type: ColorType, number: u8) -> Self {
        Self {
            name: indexed_name(color_type, number),
            color_type,
            number: Some(number),
            triplet: None,
        }
    }

    /// The color system this color natively belongs to.
    #[must_use]
    pub const fn system(&self) -> ColorSystem {
        match self.color_type {
            ColorType::Default | ColorType::Standard => ColorSystem::Standard,
            ColorType::EightBit => ColorSystem::EightBit,
            ColorType::TrueColor => ColorSystem::TrueColor,
            ColorType::Windows => ColorSystem::Windows,
        }
    }

    /// True for colors whose RGB value is decided by the terminal (Standard, Windows).
    #[must_use]
    pub const fn is_system_defined(&self) -> bool {
        matches!(self.color_type, ColorType::Standard | ColorType::Windows)
    }

    /// Returns true if this is the default color.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self.color_type, ColorType::Default)
    }

    /// Resolve to a concrete RGB triplet.
    ///
    /// Standard colors and the default color are looked up in `theme`;
    /// `foreground` picks between the theme's default foreground and background.
    #[must_use]
    pub fn get_truecolor(&self, theme: &TerminalTheme, foreground: bool) -> ColorTriplet {
        let index = usize::from(self.number.unwrap_or(0));
        match self.color_type {
            ColorType::TrueColor => self.triplet.unwrap_or_default(),
            ColorType::EightBit => EIGHT_BIT_PALETTE[index],
            ColorType::Standard => theme.ansi_color(index),
            ColorType::Windows => WINDOWS_PALETTE[index % 16],
            ColorType::Default => {
                if foreground {
                    theme.foreground
                } else {
                    theme.background
                }
            }
        }
    }

    /// SGR parameters selecting this color as foreground or background.
    #[must_use]
    pub fn get_ansi_codes(&self, foreground: bool) -> Vec<String> {
        match self.color_type {
            ColorType::Default => vec![if foreground { "39" } else { "49" }.to_string()],
            ColorType::Standard | ColorType::Windows => {
                let number = self.number.unwrap_or(0) % 16;
                let code = match (number < 8, foreground) {
                    (true, true) => 30 + number,
                    (true, false) => 40 + number,
                    (false, true) => 90 + (number - 8),
                    (false, false) => 100 + (number - 8),
                };
                vec![code.to_string()]
            }
            ColorType::EightBit => vec![
                if foreground { "38" } else { "48" }.to_string(),
                "5".to_string(),
                self.number.unwrap_or(0).to_string(),
            ],
            ColorType::TrueColor => {
                let triplet = self.triplet.unwrap_or_default();
                vec![
                    if foreground { "38" } else { "48" }.to_string(),
                    "2".to_string(),
                    triplet.red.to_string(),
                    triplet.green.to_string(),
                    triplet.blue.to_string(),
                ]
            }
        }
    }

    /// Downgrade to a lower-capability color system (memoized in the global cache).
    ///
    /// A no-op for the default color and for colors already at or below `system`.
    #[must_use]
    pub fn downgrade(&self, system: ColorSystem) -> Self {
        RenderCache::global().downgrade(self, system)
    }

    /// Compute a downgrade without consulting any cache.
    #[must_use]
    pub fn downgrade_uncached(&self, system: ColorSystem) -> Self {
        match self.downgraded_index(system) {
            Some((color_type, number)) => Self::indexed(color_type, number),
            None => self.clone(),
        }
    }

    /// The `(type, index)` this color becomes in `system`, or `None` if it is
    /// kept unchanged.
    pub(crate) fn downgraded_index(&self, system: ColorSystem) -> Option<(ColorType, u8)> {
        if self.is_default() || self.color_type as u8 == system as u8 {
            return None;
        }

        let index = usize::from(self.number.unwrap_or(0));
        match (system, self.color_type) {
            (ColorSystem::EightBit, ColorType::TrueColor) => {
                let triplet = self.triplet.unwrap_or_default();
                Some((ColorType::EightBit, rgb_to_eight_bit(triplet)))
            }
            (ColorSystem::Standard, ColorType::TrueColor) => {
                let triplet = self.triplet.unwrap_or_default();
                Some((ColorType::Standard, STANDARD_PALETTE.match_color(triplet)))
            }
            (ColorSystem::Standard, ColorType::EightBit | ColorType::Windows) => {
                let triplet = EIGHT_BIT_PALETTE[index];
                Some((ColorType::Standard, STANDARD_PALETTE.match_color(triplet)))
            }
            (ColorSystem::Windows, ColorType::TrueColor) => {
                let triplet = self.triplet.unwrap_or_default();
                Some((ColorType::Windows, WINDOWS_PALETTE.match_color(triplet)))
            }
            (ColorSystem::Windows, ColorType::Standard) => {
                Some((ColorType::Windows, self.number.unwrap_or(0) % 16))
            }
            (ColorSystem::Windows, ColorType::EightBit) => {
                let triplet = EIGHT_BIT_PALETTE[index];
                Some((ColorType::Windows, WINDOWS_PALETTE.match_color(triplet)))
            }
            _ => None,
        }
    }

    /// The color actually emitted when rendering for `system`.
    ///
    /// Lower tiers delegate to [`downgrade`](Self::downgrade). At the truecolor
    /// tier, system-defined colors are expanded to their RGB value in `theme`,
    /// so truecolor output does not depend on the terminal's own palette.
    #[must_use]
    pub fn resolve(&self, system: ColorSystem, theme: &TerminalTheme, foreground: bool) -> Self {
        self.resolve_with(system, theme, foreground, RenderCache::global())
    }

    pub(crate) fn resolve_with(
        &self,
        system: ColorSystem,
        theme: &TerminalTheme,
        foreground: bool,
        cache: &RenderCache,
    ) -> Self {
        if system == ColorSystem::TrueColor && self.is_system_defined() {
            return Self::from_triplet(self.get_truecolor(theme, foreground));
        }
        cache.downgrade(self, system)
    }

    /// Parse a color string (memoized in the global cache).
    ///
    /// Supported formats, case-insensitive and whitespace-trimmed:
    /// - `default`
    /// - Named colors: `red`, `bright_blue`, `dark_orange3`, `grey50`
    /// - Hex: `#ff0000`
    /// - Color number: `color(196)`
    /// - Legacy console color: `windows(3)`
    /// - RGB: `rgb(255,0,0)`
    ///
    /// # Errors
    ///
    /// Returns a [`ColorParseError`] naming the offending literal.
    pub fn parse(color: &str) -> Result<Self, ColorParseError> {
        RenderCache::global().parse_color(color)
    }

    /// Parse without consulting any cache. `color` must already be trimmed
    /// and lowercased.
    pub(crate) fn parse_uncached(color: &str, original: &str) -> Result<Self, ColorParseError> {
        static COLOR_NUM_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^color\((\d{1,3})\)$").expect("valid regex"));
        static WINDOWS_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"^windows\((\d{1,2})\)$").expect("valid regex"));
        static RGB_RE: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
                .expect("valid regex")
        });

        if color.is_empty() {
            return Err(ColorParseError::Empty);
        }

        if color == "default" {
            return Ok(Self::default_color());
        }

        if color.starts_with('#') {
            let triplet = ColorTriplet::from_hex(color)
                .map_err(|_| ColorParseError::InvalidHex(original.to_string()))?;
            return Ok(Self {
                name: color.to_string(),
                ..Self::from_triplet(triplet)
            });
        }

        if let Some(caps) = COLOR_NUM_RE.captures(color) {
            return match caps[1].parse::<u8>() {
                Ok(number) => Ok(Self {
                    name: color.to_string(),
                    ..Self::from_ansi(number)
                }),
                Err(_) => Err(ColorParseError::InvalidColorNumber(original.to_string())),
            };
        }

        if let Some(caps) = WINDOWS_RE.captures(color) {
            return match caps[1].parse::<u8>() {
                Ok(number) if number < 16 => Ok(Self::from_windows(number)),
                _ => Err(ColorParseError::InvalidColorNumber(original.to_string())),
            };
        }

        if let Some(caps) = RGB_RE.captures(color) {
            let component = |i: usize| caps[i].parse::<u8>();
            return match (component(1), component(2), component(3)) {
                (Ok(r), Ok(g), Ok(b)) => Ok(Self {
                    name: color.to_string(),
                    ..Self::from_rgb(r, g, b)
                }),
                _ => Err(ColorParseError::InvalidRgb(original.to_string())),
            };
        }

        if let Some(number) = lookup_named_color(color) {
            return Ok(Self {
                name: color.to_string(),
                ..Self::from_ansi(number)
            });
        }

        Err(ColorParseError::UnknownColor(original.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<ColorTriplet> for Color {
    fn from(triplet: ColorTriplet) -> Self {
        Self::from_triplet(triplet)
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl TryFrom<&str> for Color {
    type Error = ColorParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value.as_str())
    }
}

/// A color given either as an already parsed [`Color`] or as raw text.
///
/// Resolved once at the API boundary so internal code only sees `Color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorLike {
    Parsed(Color),
    Raw(String),
}

impl ColorLike {
    /// Parse the raw form, or hand back the parsed one.
    ///
    /// # Errors
    ///
    /// Returns the [`ColorParseError`] of the raw text.
    pub fn resolve(self) -> Result<Color, ColorParseError> {
        match self {
            Self::Parsed(color) => Ok(color),
            Self::Raw(text) => Color::parse(&text),
        }
    }
}

impl From<Color> for ColorLike {
    fn from(color: Color) -> Self {
        Self::Parsed(color)
    }
}

impl From<&str> for ColorLike {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_string())
    }
}

impl From<String> for ColorLike {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

/// Error type for color parsing. Every variant carries the offending literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    Empty,
    InvalidHex(String),
    InvalidColorNumber(String),
    InvalidRgb(String),
    UnknownColor(String),
}

impl ColorParseError {
    /// The input that failed to parse.
    #[must_use]
    pub fn literal(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::InvalidHex(s)
            | Self::InvalidColorNumber(s)
            | Self::InvalidRgb(s)
            | Self::UnknownColor(s) => s,
        }
    }
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Empty color string"),
            Self::InvalidHex(s) => write!(f, "Invalid hex color: {s:?}"),
            Self::InvalidColorNumber(s) => write!(f, "Invalid color number: {s:?}"),
            Self::InvalidRgb(s) => write!(f, "Invalid RGB color: {s:?}"),
            Self::UnknownColor(s) => write!(f, "Unknown color: {s:?}"),
        }
    }
}

impl std::error::Error for ColorParseError {}

// ============================================================================
// Color Conversion Algorithms
// ============================================================================

/// Map a truecolor value onto the 256-color palette.
///
/// Near-gray inputs (HLS saturation below 0.15) go to the grayscale ramp,
/// with its ends snapped to the cube's black (16) and white (231); everything
/// else is quantized per channel onto the 6x6x6 cube.
#[must_use]
pub fn rgb_to_eight_bit(triplet: ColorTriplet) -> u8 {
    let (_, lightness, saturation) = triplet.to_hls();

    if saturation < 0.15 {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "lightness is in 0..=1 so the result is in 0..=25"
        )]
        let gray = (lightness * 25.0).round_ties_even() as u8;
        return match gray {
            0 => 16,
            25.. => 231,
            n => 231 + n,
        };
    }

    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "values are in 0..=5"
    )]
    let quantize = |v: u8| -> u8 {
        let v = f64::from(v);
        let six = if v < 95.0 { v / 95.0 } else { 1.0 + (v - 95.0) / 40.0 };
        (six.round_ties_even() as u8).min(5)
    };

    16 + 36 * quantize(triplet.red) + 6 * quantize(triplet.green) + quantize(triplet.blue)
}

// ============================================================================
// Named Colors
// ============================================================================

fn lookup_named_color(name: &str) -> Option<u8> {
    static NAMED_COLORS: LazyLock<HashMap<&'static str, u8>> =
        LazyLock::new(|| ANSI_COLOR_NAMES.iter().copied().collect());

    if let Some(&number) = NAMED_COLORS.get(name) {
        return Some(number);
    }
    if name.contains("gray") {
        return NAMED_COLORS.get(name.replace("gray", "grey").as_str()).copied();
    }
    None
}

/// Display name of a palette color, in a form [`Color::parse`] accepts.
fn indexed_name(color_type: ColorType, number: u8) -> String {
    match color_type {
        ColorType::Windows => format!("windows({number})"),
        _ => format!("color({number})"),
    }
}

/// Color names and their 256-palette index. `gray` spellings are accepted as
/// aliases of `grey` at lookup time.
const ANSI_COLOR_NAMES: &[(&str, u8)] = &[
    ("black", 0),
    ("red", 1),
    ("green", 2),
    ("yellow", 3),
    ("blue", 4),
    ("magenta", 5),
    ("cyan", 6),
    ("white", 7),
    ("bright_black", 8),
    ("bright_red", 9),
    ("bright_green", 10),
    ("bright_yellow", 11),
    ("bright_blue", 12),
    ("bright_magenta", 13),
    ("bright_cyan", 14),
    ("bright_white", 15),
    ("grey0", 16),
    ("navy_blue", 17),
    ("dark_blue", 18),
    ("blue3", 20),
    ("blue1", 21),
    ("dark_green", 22),
    ("deep_sky_blue4", 25),
    ("dodger_blue3", 26),
    ("dodger_blue2", 27),
    ("green4", 28),
    ("spring_green4", 29),
    ("turquoise4", 30),
    ("deep_sky_blue3", 32),
    ("dodger_blue1", 33),
    ("dark_cyan", 36),
    ("light_sea_green", 37),
    ("deep_sky_blue2", 38),
    ("deep_sky_blue1", 39),
    ("green3", 40),
    ("spring_green3", 41),
    ("cyan3", 43),
    ("dark_turquoise", 44),
    ("turquoise2", 45),
    ("green1", 46),
    ("spring_green2", 47),
    ("spring_green1", 48),
    ("medium_spring_green", 49),
    ("cyan2", 50),
    ("cyan1", 51),
    ("purple4", 55),
    ("purple3", 56),
    ("blue_violet", 57),
    ("grey37", 59),
    ("medium_purple4", 60),
    ("slate_blue3", 62),
    ("royal_blue1", 63),
    ("chartreuse4", 64),
    ("pale_turquoise4", 66),
    ("steel_blue", 67),
    ("steel_blue3", 68),
    ("cornflower_blue", 69),
    ("dark_sea_green4", 71),
    ("cadet_blue", 73),
    ("sky_blue3", 74),
    ("chartreuse3", 76),
    ("sea_green3", 78),
    ("aquamarine3", 79),
    ("medium_turquoise", 80),
    ("steel_blue1", 81),
    ("sea_green2", 83),
    ("sea_green1", 85),
    ("dark_slate_gray2", 87),
    ("dark_red", 88),
    ("dark_magenta", 91),
    ("orange4", 94),
    ("light_pink4", 95),
    ("plum4", 96),
    ("medium_purple3", 98),
    ("slate_blue1", 99),
    ("wheat4", 101),
    ("grey53", 102),
    ("light_slate_grey", 103),
    ("medium_purple", 104),
    ("light_slate_blue", 105),
    ("yellow4", 106),
    ("dark_sea_green", 108),
    ("light_sky_blue3", 110),
    ("sky_blue2", 111),
    ("chartreuse2", 112),
    ("pale_green3", 114),
    ("dark_slate_gray3", 116),
    ("sky_blue1", 117),
    ("chartreuse1", 118),
    ("light_green", 120),
    ("aquamarine1", 122),
    ("dark_slate_gray1", 123),
    ("deep_pink4", 125),
    ("medium_violet_red", 126),
    ("dark_violet", 128),
    ("purple", 129),
    ("medium_orchid3", 133),
    ("medium_orchid", 134),
    ("dark_goldenrod", 136),
    ("rosy_brown", 138),
    ("grey63", 139),
    ("medium_purple2", 140),
    ("medium_purple1", 141),
    ("dark_khaki", 143),
    ("navajo_white3", 144),
    ("grey69", 145),
    ("light_steel_blue3", 146),
    ("light_steel_blue", 147),
    ("dark_olive_green3", 149),
    ("dark_sea_green3", 150),
    ("light_cyan3", 152),
    ("light_sky_blue1", 153),
    ("green_yellow", 154),
    ("dark_olive_green2", 155),
    ("pale_green1", 156),
    ("dark_sea_green2", 157),
    ("pale_turquoise1", 159),
    ("red3", 160),
    ("deep_pink3", 162),
    ("magenta3", 164),
    ("dark_orange3", 166),
    ("indian_red", 167),
    ("hot_pink3", 168),
    ("hot_pink2", 169),
    ("orchid", 170),
    ("orange3", 172),
    ("light_salmon3", 173),
    ("light_pink3", 174),
    ("pink3", 175),
    ("plum3", 176),
    ("violet", 177),
    ("gold3", 178),
    ("light_goldenrod3", 179),
    ("tan", 180),
    ("misty_rose3", 181),
    ("thistle3", 182),
    ("plum2", 183),
    ("yellow3", 184),
    ("khaki3", 185),
    ("light_yellow3", 187),
    ("grey84", 188),
    ("light_steel_blue1", 189),
    ("yellow2", 190),
    ("dark_olive_green1", 192),
    ("dark_sea_green1", 193),
    ("honeydew2", 194),
    ("light_cyan1", 195),
    ("red1", 196),
    ("deep_pink2", 197),
    ("deep_pink1", 199),
    ("magenta2", 200),
    ("magenta1", 201),
    ("orange_red1", 202),
    ("indian_red1", 204),
    ("hot_pink", 206),
    ("medium_orchid1", 207),
    ("dark_orange", 208),
    ("salmon1", 209),
    ("light_coral", 210),
    ("pale_violet_red1", 211),
    ("orchid2", 212),
    ("orchid1", 213),
    ("orange1", 214),
    ("sandy_brown", 215),
    ("light_salmon1", 216),
    ("light_pink1", 217),
    ("pink1", 218),
    ("plum1", 219),
    ("gold1", 220),
    ("light_goldenrod2", 222),
    ("navajo_white1", 223),
    ("misty_rose1", 224),
    ("thistle1", 225),
    ("yellow1", 226),
    ("light_goldenrod1", 227),
    ("khaki1", 228),
    ("wheat1", 229),
    ("cornsilk1", 230),
    ("grey100", 231),
    ("grey3", 232),
    ("grey7", 233),
    ("grey11", 234),
    ("grey15", 235),
    ("grey19", 236),
    ("grey23", 237),
    ("grey27", 238),
    ("grey30", 239),
    ("grey35", 240),
    ("grey39", 241),
    ("grey42", 242),
    ("grey46", 243),
    ("grey50", 244),
    ("grey54", 245),
    ("grey58", 246),
    ("grey62", 247),
    ("grey66", 248),
    ("grey70", 249),
    ("grey74", 250),
    ("grey78", 251),
    ("grey82", 252),
    ("grey85", 253),
    ("grey89", 254),
    ("grey93", 255),
];
