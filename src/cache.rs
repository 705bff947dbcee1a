//! Memo tables for the pure, hot functions of the rendering core.
//!
//! A [`RenderCache`] owns four bounded LRU tables:
//!
//! | Table | Key | Value |
//! |-------|-----|-------|
//! | colors | normalized color text | [`Color`] |
//! | styles | trimmed style text | [`Style`] |
//! | downgrades | color + target system | palette index |
//! | widths | strings of 8+ bytes | cell width |
//!
//! The convenience functions ([`Color::parse`], [`Style::parse`],
//! [`Color::downgrade`], [`crate::cells::cell_len`]) use the process-wide
//! instance from [`RenderCache::global`]. Callers wanting isolation (tests,
//! embedders with their own memory limits) build one with [`CacheConfig`] and
//! hand it to a [`crate::context::RenderContext`].
//!
//! Only successful parses are stored, and entries are pure function results,
//! so eviction or a poisoned lock can never produce a wrong answer.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use lru::LruCache;

use crate::cells::{CACHE_MIN_LEN, cell_len_uncached};
use crate::color::{Color, ColorParseError, ColorSystem, ColorTriplet, ColorType};
use crate::style::{Style, StyleParseError};
use crate::sync::lock_recover;

const fn capacity(n: usize) -> NonZeroUsize {
    match NonZeroUsize::new(n) {
        Some(n) => n,
        None => NonZeroUsize::MIN,
    }
}

/// Capacities of the four memo tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub colors: NonZeroUsize,
    pub styles: NonZeroUsize,
    pub downgrades: NonZeroUsize,
    pub widths: NonZeroUsize,
}

impl CacheConfig {
    pub const DEFAULT: Self = Self {
        colors: capacity(1024),
        styles: capacity(512),
        downgrades: capacity(1024),
        widths: capacity(4096),
    };

    #[must_use]
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Set the color table capacity (0 is raised to 1).
    #[must_use]
    pub const fn colors(mut self, entries: usize) -> Self {
        self.colors = capacity(entries);
        self
    }

    #[must_use]
    pub const fn styles(mut self, entries: usize) -> Self {
        self.styles = capacity(entries);
        self
    }

    #[must_use]
    pub const fn downgrades(mut self, entries: usize) -> Self {
        self.downgrades = capacity(entries);
        self
    }

    #[must_use]
    pub const fn widths(mut self, entries: usize) -> Self {
        self.widths = capacity(entries);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DowngradeKey {
    color_type: ColorType,
    number: Option<u8>,
    triplet: Option<ColorTriplet>,
    system: ColorSystem,
}

/// Number of entries currently held by each table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub colors: usize,
    pub styles: usize,
    pub downgrades: usize,
    pub widths: usize,
}

/// The memo tables. See the [module docs](self).
pub struct RenderCache {
    config: CacheConfig,
    colors: Mutex<LruCache<String, Color>>,
    styles: Mutex<LruCache<String, Style>>,
    downgrades: Mutex<LruCache<DowngradeKey, Option<(ColorType, u8)>>>,
    widths: Mutex<LruCache<String, usize>>,
}

static GLOBAL_CACHE: LazyLock<RenderCache> = LazyLock::new(RenderCache::default);

impl RenderCache {
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            colors: Mutex::new(LruCache::new(config.colors)),
            styles: Mutex::new(LruCache::new(config.styles)),
            downgrades: Mutex::new(LruCache::new(config.downgrades)),
            widths: Mutex::new(LruCache::new(config.widths)),
        }
    }

    /// The process-wide cache.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_CACHE
    }

    #[must_use]
    pub const fn config(&self) -> CacheConfig {
        self.config
    }

    /// Parse a color, consulting the color table first.
    ///
    /// # Errors
    ///
    /// Returns the [`ColorParseError`] for the input. Failures are not cached.
    pub fn parse_color(&self, input: &str) -> Result<Color, ColorParseError> {
        let original = input.trim();
        let normalized = original.to_lowercase();

        if let Some(color) = lock_recover(&self.colors).get(&normalized) {
            return Ok(color.clone());
        }

        let color = Color::parse_uncached(&normalized, original)?;
        log::trace!(target: "rich_core::cache", "color cache fill: {normalized:?}");
        lock_recover(&self.colors).put(normalized, color.clone());
        Ok(color)
    }

    /// Leniently parse a style, consulting the style table first.
    ///
    /// # Errors
    ///
    /// Returns [`StyleParseError::InvalidFormat`] for a keyword missing its
    /// operand. Failures are not cached.
    pub fn parse_style(&self, input: &str) -> Result<Style, StyleParseError> {
        let key = input.trim();

        if let Some(style) = lock_recover(&self.styles).get(key) {
            return Ok(style.clone());
        }

        let style = Style::parse_with(key, self, false)?;
        log::trace!(target: "rich_core::cache", "style cache fill: {key:?}");
        lock_recover(&self.styles).put(key.to_string(), style.clone());
        Ok(style)
    }

    /// Downgrade `color` to `system`, consulting the downgrade table first.
    #[must_use]
    pub fn downgrade(&self, color: &Color, system: ColorSystem) -> Color {
        if color.is_default() {
            return color.clone();
        }

        let key = DowngradeKey {
            color_type: color.color_type,
            number: color.number,
            triplet: color.triplet,
            system,
        };

        let cached = lock_recover(&self.downgrades).get(&key).copied();
        let target = match cached {
            Some(target) => target,
            None => {
                let target = color.downgraded_index(system);
                lock_recover(&self.downgrades).put(key, target);
                target
            }
        };

        match target {
            Some((color_type, number)) => Color::indexed(color_type, number),
            None => color.clone(),
        }
    }

    /// Cell width of `text`. Strings under 8 bytes bypass the table.
    #[must_use]
    pub fn cell_len(&self, text: &str) -> usize {
        if text.len() < CACHE_MIN_LEN {
            return cell_len_uncached(text);
        }

        if let Some(&width) = lock_recover(&self.widths).get(text) {
            return width;
        }

        let width = cell_len_uncached(text);
        lock_recover(&self.widths).put(text.to_string(), width);
        width
    }

    /// Drop every entry from every table.
    pub fn clear(&self) {
        lock_recover(&self.colors).clear();
        lock_recover(&self.styles).clear();
        lock_recover(&self.downgrades).clear();
        lock_recover(&self.widths).clear();
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            colors: lock_recover(&self.colors).len(),
            styles: lock_recover(&self.styles).len(),
            downgrades: lock_recover(&self.downgrades).len(),
            widths: lock_recover(&self.widths).len(),
        }
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(CacheConfig::DEFAULT)
    }
}

impl fmt::Debug for RenderCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderCache")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}
