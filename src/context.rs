//! Render configuration.
//!
//! A [`RenderContext`] bundles everything the serializer needs to know about
//! the destination: the declared color tier, the terminal theme used to expand
//! system colors at the truecolor tier, and which [`RenderCache`] backs
//! parsing and downgrading.
//!
//! ```
//! use rich_core::context::RenderContext;
//! use rich_core::color::ColorSystem;
//! use rich_core::text::Text;
//!
//! let ctx = RenderContext::new().color_system(ColorSystem::EightBit);
//! let mut text = Text::new("hello");
//! text.stylize_all("bold");
//! assert_eq!(ctx.render_text(&text), "\x1b[1mhello\x1b[0m");
//! ```

use std::sync::Arc;

use crate::cache::RenderCache;
use crate::color::{Color, ColorParseError, ColorSystem};
use crate::segment::{self, Segment};
use crate::style::{Style, StyleParseError};
use crate::terminal_theme::{DEFAULT_TERMINAL_THEME, TerminalTheme};
use crate::text::Text;

#[derive(Debug, Clone)]
enum CacheHandle {
    Global,
    Owned(Arc<RenderCache>),
}

/// Destination settings for rendering segments and text.
#[derive(Debug, Clone)]
pub struct RenderContext {
    color_system: Option<ColorSystem>,
    theme: TerminalTheme,
    cache: CacheHandle,
    tab_size: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// Truecolor output, the default theme and the global cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            color_system: Some(ColorSystem::TrueColor),
            theme: DEFAULT_TERMINAL_THEME,
            cache: CacheHandle::Global,
            tab_size: 8,
        }
    }

    /// Declare the destination's color tier.
    #[must_use]
    pub fn color_system(mut self, system: ColorSystem) -> Self {
        self.color_system = Some(system);
        self
    }

    /// Render without any escape sequences for styles.
    #[must_use]
    pub fn no_color(mut self) -> Self {
        self.color_system = None;
        self
    }

    #[must_use]
    pub fn theme(mut self, theme: TerminalTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Use a private cache instead of the process-wide one.
    #[must_use]
    pub fn cache(mut self, cache: Arc<RenderCache>) -> Self {
        self.cache = CacheHandle::Owned(cache);
        self
    }

    /// Tab stop width used by [`render_text`](Self::render_text).
    #[must_use]
    pub fn tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }

    /// The declared tier, or `None` for plain output.
    #[must_use]
    pub fn get_color_system(&self) -> Option<ColorSystem> {
        self.color_system
    }

    #[must_use]
    pub fn get_theme(&self) -> &TerminalTheme {
        &self.theme
    }

    #[must_use]
    pub fn get_tab_size(&self) -> usize {
        self.tab_size
    }

    /// The cache backing this context.
    #[must_use]
    pub fn render_cache(&self) -> &RenderCache {
        match &self.cache {
            CacheHandle::Global => RenderCache::global(),
            CacheHandle::Owned(cache) => cache.as_ref(),
        }
    }

    /// Serialize segments for this destination.
    #[must_use]
    pub fn render(&self, segments: &[Segment]) -> String {
        match self.color_system {
            Some(system) => segment::render_with(segments, system, &self.theme, self.render_cache()),
            None => segment::render_plain(segments),
        }
    }

    /// Expand tabs, lower to segments and serialize. The text's `end` is not
    /// appended.
    #[must_use]
    pub fn render_text(&self, text: &Text) -> String {
        let expanded = text.expand_tabs(self.tab_size);
        self.render(&expanded.to_segments())
    }

    /// Parse a style through this context's cache.
    ///
    /// # Errors
    ///
    /// See [`Style::parse`].
    pub fn parse_style(&self, definition: &str) -> Result<Style, StyleParseError> {
        self.render_cache().parse_style(definition)
    }

    /// Parse a color through this context's cache.
    ///
    /// # Errors
    ///
    /// See [`Color::parse`].
    pub fn parse_color(&self, color: &str) -> Result<Color, ColorParseError> {
        self.render_cache().parse_color(color)
    }
}
