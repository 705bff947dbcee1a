//! Style system for terminal text attributes.
//!
//! A [`Style`] bundles an optional foreground and background [`Color`], a set
//! of text attributes, an optional hyperlink and optional metadata. Styles are
//! values: combining two styles builds a new one, and [`Style::combine`] is
//! associative with the blank style as identity.
//!
//! Each attribute is tri-state. The `set_attributes` mask records which
//! attributes a style has an opinion about, and the `attributes` mask holds the
//! opinion. That is what lets `"not bold"` switch bold off in a combination
//! instead of leaving whatever came before.
//!
//! ```
//! use rich_core::color::ColorSystem;
//! use rich_core::style::Style;
//!
//! let style = Style::parse("bold red on blue").unwrap();
//! assert_eq!(style.render(ColorSystem::EightBit), "\x1b[1;31;44m");
//! assert_eq!(style.render(ColorSystem::TrueColor), "\x1b[1;38;2;128;0;0;48;2;0;0;128m");
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::cache::RenderCache;
use crate::color::{Color, ColorParseError, ColorSystem};
use crate::terminal_theme::{DEFAULT_TERMINAL_THEME, TerminalTheme};

bitflags! {
    /// Text attribute flags, one bit per [`Attribute`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u16 {
        const BOLD       = 1 << 0;
        const DIM        = 1 << 1;
        const ITALIC     = 1 << 2;
        const UNDERLINE  = 1 << 3;
        const BLINK      = 1 << 4;
        const BLINK2     = 1 << 5;
        const REVERSE    = 1 << 6;
        const CONCEAL    = 1 << 7;
        const STRIKE     = 1 << 8;
        const UNDERLINE2 = 1 << 9;
        const FRAME      = 1 << 10;
        const ENCIRCLE   = 1 << 11;
        const OVERLINE   = 1 << 12;
    }
}

impl Attributes {
    /// SGR codes for the enabled flags, in table order.
    #[must_use]
    pub fn to_sgr_codes(&self) -> Vec<u8> {
        Attribute::ALL
            .iter()
            .filter(|attr| self.contains(attr.flag()))
            .map(|attr| attr.sgr_code())
            .collect()
    }
}

/// A single text attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Bold,
    Dim,
    Italic,
    Underline,
    Blink,
    /// Rapid blink.
    Blink2,
    Reverse,
    Conceal,
    Strike,
    /// Double underline.
    Underline2,
    Frame,
    Encircle,
    Overline,
}

impl Attribute {
    /// Every attribute, in bit and render order.
    pub const ALL: [Self; 13] = [
        Self::Bold,
        Self::Dim,
        Self::Italic,
        Self::Underline,
        Self::Blink,
        Self::Blink2,
        Self::Reverse,
        Self::Conceal,
        Self::Strike,
        Self::Underline2,
        Self::Frame,
        Self::Encircle,
        Self::Overline,
    ];

    #[must_use]
    pub const fn flag(self) -> Attributes {
        match self {
            Self::Bold => Attributes::BOLD,
            Self::Dim => Attributes::DIM,
            Self::Italic => Attributes::ITALIC,
            Self::Underline => Attributes::UNDERLINE,
            Self::Blink => Attributes::BLINK,
            Self::Blink2 => Attributes::BLINK2,
            Self::Reverse => Attributes::REVERSE,
            Self::Conceal => Attributes::CONCEAL,
            Self::Strike => Attributes::STRIKE,
            Self::Underline2 => Attributes::UNDERLINE2,
            Self::Frame => Attributes::FRAME,
            Self::Encircle => Attributes::ENCIRCLE,
            Self::Overline => Attributes::OVERLINE,
        }
    }

    /// The SGR parameter that switches this attribute on.
    #[must_use]
    pub const fn sgr_code(self) -> u8 {
        match self {
            Self::Bold => 1,
            Self::Dim => 2,
            Self::Italic => 3,
            Self::Underline => 4,
            Self::Blink => 5,
            Self::Blink2 => 6,
            Self::Reverse => 7,
            Self::Conceal => 8,
            Self::Strike => 9,
            Self::Underline2 => 21,
            Self::Frame => 51,
            Self::Encircle => 52,
            Self::Overline => 53,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Dim => "dim",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Blink => "blink",
            Self::Blink2 => "blink2",
            Self::Reverse => "reverse",
            Self::Conceal => "conceal",
            Self::Strike => "strike",
            Self::Underline2 => "underline2",
            Self::Frame => "frame",
            Self::Encircle => "encircle",
            Self::Overline => "overline",
        }
    }

    /// Look up an attribute by full name or short alias (`b`, `i`, `uu`, ...).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "bold" | "b" => Some(Self::Bold),
            "dim" | "d" => Some(Self::Dim),
            "italic" | "i" => Some(Self::Italic),
            "underline" | "u" => Some(Self::Underline),
            "blink" => Some(Self::Blink),
            "blink2" => Some(Self::Blink2),
            "reverse" | "r" => Some(Self::Reverse),
            "conceal" | "c" => Some(Self::Conceal),
            "strike" | "s" => Some(Self::Strike),
            "underline2" | "uu" => Some(Self::Underline2),
            "frame" => Some(Self::Frame),
            "encircle" => Some(Self::Encircle),
            "overline" | "o" => Some(Self::Overline),
            _ => None,
        }
    }
}

/// A terminal text style.
///
/// `Style::default()` is the blank style: it sets nothing and renders to
/// an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    /// Foreground color.
    pub color: Option<Color>,
    /// Background color.
    pub bgcolor: Option<Color>,
    attributes: Attributes,
    set_attributes: Attributes,
    /// Hyperlink target. Carried through combination, never rendered.
    pub link: Option<String>,
    meta: Option<BTreeMap<String, String>>,
}

impl Style {
    /// Create a blank style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the style sets nothing at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.color.is_none()
            && self.bgcolor.is_none()
            && self.set_attributes.is_empty()
            && self.link.is_none()
            && self.meta.is_none()
    }

    /// Attributes switched on.
    #[must_use]
    pub const fn attributes(&self) -> Attributes {
        self.attributes
    }

    /// Attributes this style has an opinion about (on or off).
    #[must_use]
    pub const fn set_attributes(&self) -> Attributes {
        self.set_attributes
    }

    #[must_use]
    pub const fn meta(&self) -> Option<&BTreeMap<String, String>> {
        self.meta.as_ref()
    }

    /// `Some(enabled)` if the style sets `attr`, `None` if it leaves it alone.
    #[must_use]
    pub const fn get(&self, attr: Attribute) -> Option<bool> {
        let flag = attr.flag();
        if self.set_attributes.contains(flag) {
            Some(self.attributes.contains(flag))
        } else {
            None
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the foreground color from a color string.
    ///
    /// # Errors
    ///
    /// Returns an error if the color cannot be parsed.
    pub fn color_str(self, color: &str) -> Result<Self, StyleParseError> {
        Ok(self.color(Color::parse(color)?))
    }

    /// Set the background color.
    #[must_use]
    pub fn bgcolor(mut self, color: Color) -> Self {
        self.bgcolor = Some(color);
        self
    }

    /// Set the background color from a color string.
    ///
    /// # Errors
    ///
    /// Returns an error if the color cannot be parsed.
    pub fn bgcolor_str(self, color: &str) -> Result<Self, StyleParseError> {
        Ok(self.bgcolor(Color::parse(color)?))
    }

    /// Switch `attr` on or off explicitly.
    #[must_use]
    pub fn set(mut self, attr: Attribute, enabled: bool) -> Self {
        let flag = attr.flag();
        self.set_attributes.insert(flag);
        self.attributes.set(flag, enabled);
        self
    }

    /// Switch `attr` on.
    #[must_use]
    pub fn with(self, attr: Attribute) -> Self {
        self.set(attr, true)
    }

    /// Explicitly switch `attr` off, overriding it in combinations.
    #[must_use]
    pub fn not(self, attr: Attribute) -> Self {
        self.set(attr, false)
    }

    #[must_use]
    pub fn bold(self) -> Self {
        self.with(Attribute::Bold)
    }

    #[must_use]
    pub fn dim(self) -> Self {
        self.with(Attribute::Dim)
    }

    #[must_use]
    pub fn italic(self) -> Self {
        self.with(Attribute::Italic)
    }

    #[must_use]
    pub fn underline(self) -> Self {
        self.with(Attribute::Underline)
    }

    #[must_use]
    pub fn underline2(self) -> Self {
        self.with(Attribute::Underline2)
    }

    #[must_use]
    pub fn blink(self) -> Self {
        self.with(Attribute::Blink)
    }

    #[must_use]
    pub fn blink2(self) -> Self {
        self.with(Attribute::Blink2)
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        self.with(Attribute::Reverse)
    }

    #[must_use]
    pub fn conceal(self) -> Self {
        self.with(Attribute::Conceal)
    }

    #[must_use]
    pub fn strike(self) -> Self {
        self.with(Attribute::Strike)
    }

    #[must_use]
    pub fn frame(self) -> Self {
        self.with(Attribute::Frame)
    }

    #[must_use]
    pub fn encircle(self) -> Self {
        self.with(Attribute::Encircle)
    }

    #[must_use]
    pub fn overline(self) -> Self {
        self.with(Attribute::Overline)
    }

    /// Set the hyperlink target.
    #[must_use]
    pub fn link(mut self, url: impl Into<String>) -> Self {
        self.link = Some(url.into());
        self
    }

    /// Add one metadata entry.
    #[must_use]
    pub fn meta_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace the metadata. An empty map clears it.
    #[must_use]
    pub fn with_meta(mut self, meta: BTreeMap<String, String>) -> Self {
        self.meta = (!meta.is_empty()).then_some(meta);
        self
    }

    /// Combine this style with another; `other` wins wherever it sets something.
    #[must_use]
    pub fn combine(&self, other: &Style) -> Style {
        if other.is_blank() {
            return self.clone();
        }
        if self.is_blank() {
            return other.clone();
        }

        let meta = match (&self.meta, &other.meta) {
            (None, None) => None,
            (Some(meta), None) | (None, Some(meta)) => Some(meta.clone()),
            (Some(base), Some(over)) => {
                let mut merged = base.clone();
                merged.extend(over.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(merged)
            }
        };

        Style {
            color: other.color.clone().or_else(|| self.color.clone()),
            bgcolor: other.bgcolor.clone().or_else(|| self.bgcolor.clone()),
            attributes: (self.attributes & !other.set_attributes)
                | (other.attributes & other.set_attributes),
            set_attributes: self.set_attributes | other.set_attributes,
            link: other.link.clone().or_else(|| self.link.clone()),
            meta,
        }
    }

    /// Combine a sequence of styles left to right.
    #[must_use]
    pub fn chain<'a>(styles: impl IntoIterator<Item = &'a Style>) -> Style {
        styles
            .into_iter()
            .fold(Style::default(), |acc, style| acc.combine(style))
    }

    /// The same style with both colors removed.
    #[must_use]
    pub fn without_color(&self) -> Style {
        Style {
            color: None,
            bgcolor: None,
            ..self.clone()
        }
    }

    /// A style holding only this style's background color.
    #[must_use]
    pub fn background_style(&self) -> Style {
        Style {
            bgcolor: self.bgcolor.clone(),
            ..Style::default()
        }
    }

    /// SGR parameters for this style, joined with `;`.
    #[must_use]
    pub fn make_ansi_codes(&self, color_system: ColorSystem) -> String {
        self.make_ansi_codes_with(color_system, &DEFAULT_TERMINAL_THEME, RenderCache::global())
    }

    /// [`make_ansi_codes`](Self::make_ansi_codes) with an explicit theme and cache.
    #[must_use]
    pub fn make_ansi_codes_with(
        &self,
        color_system: ColorSystem,
        theme: &TerminalTheme,
        cache: &RenderCache,
    ) -> String {
        let mut codes: Vec<String> = (self.attributes & self.set_attributes)
            .to_sgr_codes()
            .iter()
            .map(u8::to_string)
            .collect();

        if let Some(color) = &self.color {
            let resolved = color.resolve_with(color_system, theme, true, cache);
            codes.extend(resolved.get_ansi_codes(true));
        }
        if let Some(bgcolor) = &self.bgcolor {
            let resolved = bgcolor.resolve_with(color_system, theme, false, cache);
            codes.extend(resolved.get_ansi_codes(false));
        }

        codes.join(";")
    }

    /// The SGR escape sequence selecting this style, or `""` if it sets nothing
    /// renderable.
    #[must_use]
    pub fn render(&self, color_system: ColorSystem) -> String {
        self.render_with(color_system, &DEFAULT_TERMINAL_THEME, RenderCache::global())
    }

    /// [`render`](Self::render) with an explicit theme and cache.
    #[must_use]
    pub fn render_with(
        &self,
        color_system: ColorSystem,
        theme: &TerminalTheme,
        cache: &RenderCache,
    ) -> String {
        let codes = self.make_ansi_codes_with(color_system, theme, cache);
        if codes.is_empty() {
            String::new()
        } else {
            format!("\x1b[{codes}m")
        }
    }

    /// Wrap `text` in this style's escape sequence and a reset.
    #[must_use]
    pub fn apply(&self, text: &str, color_system: ColorSystem) -> String {
        let sgr = self.render(color_system);
        if sgr.is_empty() {
            return text.to_string();
        }
        format!("{sgr}{text}\x1b[0m")
    }

    /// Parse a style definition, memoized in the global cache.
    ///
    /// Tokens, case-insensitive and whitespace separated:
    /// - attribute names and aliases: `bold`, `b`, `italic`, `uu`, ...
    /// - `not <attribute>`: explicitly off
    /// - a color: foreground
    /// - `on <color>`: background
    /// - `link <url>`
    /// - `none` or empty: the blank style
    ///
    /// Tokens that are neither attributes nor colors are dropped with a
    /// warning through the `log` facade.
    ///
    /// # Errors
    ///
    /// Returns [`StyleParseError::InvalidFormat`] when `on`, `not` or `link`
    /// is missing its operand.
    pub fn parse(style: &str) -> Result<Self, StyleParseError> {
        RenderCache::global().parse_style(style)
    }

    /// Parse like [`parse`](Self::parse), but reject unknown tokens.
    ///
    /// # Errors
    ///
    /// Returns [`StyleParseError::UnknownToken`] for a token that is neither an
    /// attribute nor a color, [`StyleParseError::ColorError`] for a bad
    /// background color, and [`StyleParseError::InvalidFormat`] for a
    /// missing operand.
    pub fn parse_strict(style: &str) -> Result<Self, StyleParseError> {
        Self::parse_with(style.trim(), RenderCache::global(), true)
    }

    pub(crate) fn parse_with(
        definition: &str,
        cache: &RenderCache,
        strict: bool,
    ) -> Result<Self, StyleParseError> {
        if definition.is_empty() || definition.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }

        let reject = |token: &str, error: StyleParseError| -> Result<(), StyleParseError> {
            if strict {
                return Err(error);
            }
            log::warn!(
                target: "rich_core::style",
                "ignoring unknown style token {token:?} in {definition:?}"
            );
            Ok(())
        };

        let mut style = Self::default();
        let mut words = definition.split_whitespace();

        while let Some(original) = words.next() {
            let word = original.to_lowercase();
            match word.as_str() {
                "on" => {
                    let operand = words.next().ok_or_else(|| {
                        StyleParseError::InvalidFormat("color expected after 'on'".to_string())
                    })?;
                    match cache.parse_color(operand) {
                        Ok(color) => style.bgcolor = Some(color),
                        Err(err) => reject(operand, err.into())?,
                    }
                }
                "not" => {
                    let operand = words.next().ok_or_else(|| {
                        StyleParseError::InvalidFormat(
                            "attribute expected after 'not'".to_string(),
                        )
                    })?;
                    match Attribute::from_name(&operand.to_lowercase()) {
                        Some(attr) => style = style.not(attr),
                        None => {
                            let token = format!("not {operand}");
                            reject(&token, StyleParseError::UnknownToken(token.clone()))?;
                        }
                    }
                }
                "link" => {
                    let url = words.next().ok_or_else(|| {
                        StyleParseError::InvalidFormat("URL expected after 'link'".to_string())
                    })?;
                    style.link = Some(url.to_string());
                }
                _ => {
                    if let Some(attr) = Attribute::from_name(&word) {
                        style = style.with(attr);
                    } else if let Ok(color) = cache.parse_color(&word) {
                        style.color = Some(color);
                    } else {
                        reject(original, StyleParseError::UnknownToken(original.to_string()))?;
                    }
                }
            }
        }

        Ok(style)
    }
}

impl std::ops::Add for Style {
    type Output = Style;

    fn add(self, rhs: Style) -> Self::Output {
        self.combine(&rhs)
    }
}

impl std::ops::Add<&Style> for Style {
    type Output = Style;

    fn add(self, rhs: &Style) -> Self::Output {
        self.combine(rhs)
    }
}

impl std::ops::Add<&Style> for &Style {
    type Output = Style;

    fn add(self, rhs: &Style) -> Self::Output {
        self.combine(rhs)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        for attr in Attribute::ALL {
            match self.get(attr) {
                Some(true) => parts.push(attr.name().to_string()),
                Some(false) => parts.push(format!("not {}", attr.name())),
                None => {}
            }
        }
        if let Some(color) = &self.color {
            parts.push(color.to_string());
        }
        if let Some(bgcolor) = &self.bgcolor {
            parts.push(format!("on {bgcolor}"));
        }
        if let Some(link) = &self.link {
            parts.push(format!("link {link}"));
        }

        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

impl FromStr for Style {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Color> for Style {
    fn from(color: Color) -> Self {
        Self::new().color(color)
    }
}

/// A style given either parsed or as a style definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleLike {
    Parsed(Style),
    Raw(String),
}

impl StyleLike {
    /// # Errors
    ///
    /// Returns the [`StyleParseError`] of a raw definition.
    pub fn resolve(self) -> Result<Style, StyleParseError> {
        match self {
            Self::Parsed(style) => Ok(style),
            Self::Raw(definition) => Style::parse(&definition),
        }
    }

    /// Resolve, falling back to the blank style if the definition is malformed.
    #[must_use]
    pub fn resolve_or_blank(self) -> Style {
        self.resolve().unwrap_or_else(|err| {
            log::warn!(target: "rich_core::style", "{err}; using blank style");
            Style::default()
        })
    }
}

impl From<Style> for StyleLike {
    fn from(style: Style) -> Self {
        Self::Parsed(style)
    }
}

impl From<&Style> for StyleLike {
    fn from(style: &Style) -> Self {
        Self::Parsed(style.clone())
    }
}

impl From<&str> for StyleLike {
    fn from(definition: &str) -> Self {
        Self::Raw(definition.to_string())
    }
}

impl From<String> for StyleLike {
    fn from(definition: String) -> Self {
        Self::Raw(definition)
    }
}

/// Nested style application: each pushed style is combined onto the current one.
#[derive(Debug, Clone, Default)]
pub struct StyleStack {
    base: Style,
    stack: Vec<Style>,
}

impl StyleStack {
    #[must_use]
    pub fn new(base: Style) -> Self {
        Self {
            base,
            stack: Vec::new(),
        }
    }

    /// The combined style at the top of the stack.
    #[must_use]
    pub fn current(&self) -> &Style {
        self.stack.last().unwrap_or(&self.base)
    }

    pub fn push(&mut self, style: &Style) {
        let combined = self.current().combine(style);
        self.stack.push(combined);
    }

    /// Pop the top style. The base style is never popped.
    pub fn pop(&mut self) -> Option<Style> {
        self.stack.pop()
    }

    /// Number of pushed styles (the base is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// Error type for style parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleParseError {
    /// A keyword is missing its operand.
    InvalidFormat(String),
    /// A token is neither an attribute nor a color.
    UnknownToken(String),
    ColorError(ColorParseError),
}

impl fmt::Display for StyleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat(msg) => write!(f, "Invalid style format: {msg}"),
            Self::UnknownToken(token) => write!(f, "Unknown style token: {token:?}"),
            Self::ColorError(err) => write!(f, "Color error: {err}"),
        }
    }
}

impl std::error::Error for StyleParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ColorError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ColorParseError> for StyleParseError {
    fn from(err: ColorParseError) -> Self {
        Self::ColorError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorType;

    #[test]
    fn test_blank_style() {
        let style = Style::default();
        assert!(style.is_blank());
        assert_eq!(style.render(ColorSystem::TrueColor), "");
        assert_eq!(style.to_string(), "none");
    }

    #[test]
    fn test_builder() {
        let style = Style::new().bold().italic().color(Color::from_ansi(1));
        assert_eq!(style.get(Attribute::Bold), Some(true));
        assert_eq!(style.get(Attribute::Italic), Some(true));
        assert_eq!(style.get(Attribute::Dim), None);
        assert!(!style.is_blank());
    }

    #[test]
    fn test_not_sets_mask_without_value() {
        let style = Style::new().not(Attribute::Bold);
        assert_eq!(style.get(Attribute::Bold), Some(false));
        assert!(style.set_attributes().contains(Attributes::BOLD));
        assert!(!style.attributes().contains(Attributes::BOLD));
        assert_eq!(style.render(ColorSystem::Standard), "");
    }

    #[test]
    fn test_value_mask_subset_of_set_mask() {
        let style = Style::new().bold().not(Attribute::Bold).underline().set(Attribute::Dim, false);
        assert!(style.set_attributes().contains(style.attributes()));
    }

    #[test]
    fn test_combine_precedence() {
        let base = Style::new().bold().color(Color::from_ansi(1));
        let over = Style::new().italic().color(Color::from_ansi(4));
        let combined = base.combine(&over);
        assert_eq!(combined.get(Attribute::Bold), Some(true));
        assert_eq!(combined.get(Attribute::Italic), Some(true));
        assert_eq!(combined.color.unwrap().number, Some(4));
    }

    #[test]
    fn test_combine_not_overrides() {
        let combined = Style::new().bold().combine(&Style::new().not(Attribute::Bold));
        assert_eq!(combined.get(Attribute::Bold), Some(false));
        assert_eq!(combined.render(ColorSystem::Standard), "");
    }

    #[test]
    fn test_combine_blank_identity() {
        let style = Style::parse("bold red on white link https://example.com").unwrap();
        assert_eq!(style.combine(&Style::default()), style);
        assert_eq!(Style::default().combine(&style), style);
    }

    #[test]
    fn test_combine_associative() {
        let a = Style::parse("bold red").unwrap();
        let b = Style::parse("not bold on blue").unwrap();
        let c = Style::parse("italic green link x").unwrap();
        assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
    }

    #[test]
    fn test_combine_meta_right_wins() {
        let a = Style::new().meta_entry("k", "a").meta_entry("only_a", "1");
        let b = Style::new().meta_entry("k", "b");
        let combined = a.combine(&b);
        let meta = combined.meta().unwrap();
        assert_eq!(meta.get("k").map(String::as_str), Some("b"));
        assert_eq!(meta.get("only_a").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_chain_and_add() {
        let a = Style::new().bold();
        let b = Style::new().color(Color::from_ansi(2));
        assert_eq!(Style::chain([&a, &b]), a.combine(&b));
        assert_eq!(a.clone() + b.clone(), a.combine(&b));
        assert_eq!(&a + &b, a.combine(&b));
    }

    #[test]
    fn test_render_order() {
        let style = Style::new()
            .overline()
            .bold()
            .underline2()
            .color(Color::from_ansi(2))
            .bgcolor(Color::from_ansi(3));
        assert_eq!(style.render(ColorSystem::Standard), "\x1b[1;21;53;32;43m");
    }

    #[test]
    fn test_render_tiers() {
        let style = Style::parse("bold red on blue").unwrap();
        assert_eq!(style.render(ColorSystem::Standard), "\x1b[1;31;44m");
        assert_eq!(
            style.render(ColorSystem::TrueColor),
            "\x1b[1;38;2;128;0;0;48;2;0;0;128m"
        );
        let tc = Style::parse("#ff5500").unwrap();
        assert_eq!(tc.render(ColorSystem::EightBit), "\x1b[38;5;202m");
        assert_eq!(tc.render(ColorSystem::TrueColor), "\x1b[38;2;255;85;0m");
    }

    #[test]
    fn test_apply() {
        let style = Style::new().bold();
        assert_eq!(style.apply("hi", ColorSystem::Standard), "\x1b[1mhi\x1b[0m");
        assert_eq!(Style::default().apply("hi", ColorSystem::Standard), "hi");
    }

    #[test]
    fn test_link_not_rendered() {
        let style = Style::parse("link https://example.com").unwrap();
        assert_eq!(style.link.as_deref(), Some("https://example.com"));
        assert_eq!(style.render(ColorSystem::TrueColor), "");
    }

    #[test]
    fn test_parse_link_keeps_case() {
        let style = Style::parse("LINK https://Example.com/Path").unwrap();
        assert_eq!(style.link.as_deref(), Some("https://Example.com/Path"));
    }

    #[test]
    fn test_parse_aliases() {
        let style = Style::parse("b i u d s r c o uu").unwrap();
        for attr in [
            Attribute::Bold,
            Attribute::Italic,
            Attribute::Underline,
            Attribute::Dim,
            Attribute::Strike,
            Attribute::Reverse,
            Attribute::Conceal,
            Attribute::Overline,
            Attribute::Underline2,
        ] {
            assert_eq!(style.get(attr), Some(true), "{attr:?}");
        }
    }

    #[test]
    fn test_parse_none_and_empty() {
        assert!(Style::parse("").unwrap().is_blank());
        assert!(Style::parse("none").unwrap().is_blank());
        assert!(Style::parse("  NONE ").unwrap().is_blank());
    }

    #[test]
    fn test_parse_drops_unknown_tokens() {
        let style = Style::parse("bold sparkly red").unwrap();
        assert_eq!(style, Style::parse("bold red").unwrap());
        let style = Style::parse("bold on sparkly").unwrap();
        assert_eq!(style, Style::new().bold());
    }

    #[test]
    fn test_parse_strict_rejects_unknown_tokens() {
        assert_eq!(
            Style::parse_strict("bold sparkly"),
            Err(StyleParseError::UnknownToken("sparkly".to_string()))
        );
        assert!(matches!(
            Style::parse_strict("on sparkly"),
            Err(StyleParseError::ColorError(_))
        ));
        assert_eq!(
            Style::parse_strict("not shiny"),
            Err(StyleParseError::UnknownToken("not shiny".to_string()))
        );
        assert!(Style::parse_strict("bold red on white").is_ok());
    }

    #[test]
    fn test_parse_missing_operands() {
        for input in ["on", "bold not", "link"] {
            assert!(
                matches!(Style::parse(input), Err(StyleParseError::InvalidFormat(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        for input in [
            "bold red",
            "not italic on blue",
            "underline2 frame #102030 on color(200)",
            "strike link https://example.com",
        ] {
            let style = Style::parse(input).unwrap();
            let reparsed = Style::parse(&style.to_string()).unwrap();
            assert_eq!(reparsed, style, "{input}");
        }
    }

    #[test]
    fn test_without_color_and_background_style() {
        let style = Style::parse("bold red on blue").unwrap();
        let plain = style.without_color();
        assert!(plain.color.is_none() && plain.bgcolor.is_none());
        assert_eq!(plain.get(Attribute::Bold), Some(true));

        let bg = style.background_style();
        assert_eq!(bg.bgcolor, style.bgcolor);
        assert!(bg.color.is_none());
        assert_eq!(bg.get(Attribute::Bold), None);
    }

    #[test]
    fn test_style_like() {
        let parsed = StyleLike::from(Style::new().bold()).resolve().unwrap();
        assert_eq!(parsed, Style::new().bold());
        let raw = StyleLike::from("italic").resolve().unwrap();
        assert_eq!(raw, Style::new().italic());
        assert!(StyleLike::from("link").resolve_or_blank().is_blank());
    }

    #[test]
    fn test_style_stack() {
        let mut stack = StyleStack::new(Style::new().bold());
        stack.push(&Style::new().color(Color::from_ansi(1)));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.current().get(Attribute::Bold), Some(true));
        assert_eq!(stack.current().color.as_ref().map(|c| c.color_type), Some(ColorType::Standard));
        assert!(stack.pop().is_some());
        assert!(stack.pop().is_none());
        assert_eq!(stack.current(), &Style::new().bold());
    }

    #[test]
    fn test_attribute_table() {
        let codes: Vec<u8> = Attribute::ALL.iter().map(|a| a.sgr_code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 21, 51, 52, 53]);
        for attr in Attribute::ALL {
            assert_eq!(Attribute::from_name(attr.name()), Some(attr));
        }
        assert_eq!(Attributes::all().to_sgr_codes(), codes);
    }

    #[test]
    fn test_parse_error_display() {
        let err = StyleParseError::from(ColorParseError::UnknownColor("x".to_string()));
        assert!(err.to_string().contains("Unknown color"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
