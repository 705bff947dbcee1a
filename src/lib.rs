//! # rich_core
//!
//! The rendering core of a styled terminal output library: colors, styles,
//! cell widths, styled text and segments, serialized to minimal ANSI SGR
//! sequences.
//!
//! ## Quick Start
//!
//! ```rust
//! use rich_core::prelude::*;
//!
//! let mut text = Text::new("Hello World");
//! text.stylize(0, 5, "bold red");
//!
//! let ctx = RenderContext::new().color_system(ColorSystem::Standard);
//! assert_eq!(ctx.render_text(&text), "\x1b[1;31mHello\x1b[0m World");
//! ```
//!
//! ## Core Concepts
//!
//! - **Color**: default, 16-color, 256-color, truecolor or legacy console,
//!   with downgrading to coarser tiers
//! - **Style**: optional colors plus tri-state attributes, combined
//!   right-biased
//! - **Text**: a string with overlapping style spans, wrapped by cell width
//! - **Segment**: the atomic rendering unit (text + style, or control codes)
//! - **RenderContext**: the color tier, theme and cache a render targets

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod cells;
pub mod color;
pub mod context;
pub mod logging;
pub mod palette;
pub mod segment;
pub mod style;
pub mod sync;
pub mod terminal_theme;
pub mod text;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::cache::{CacheConfig, RenderCache};
    pub use crate::cells::cell_len;
    pub use crate::color::{Color, ColorLike, ColorSystem, ColorTriplet, ColorType};
    pub use crate::context::RenderContext;
    pub use crate::segment::{ControlCode, ControlType, Segment};
    pub use crate::style::{Attribute, Attributes, Style, StyleLike, StyleStack};
    pub use crate::terminal_theme::{DEFAULT_TERMINAL_THEME, TerminalTheme};
    pub use crate::text::{JustifyMethod, OverflowMethod, Span, Text};
}

// Re-export key types at crate root
pub use color::{Color, ColorParseError, ColorSystem, ColorTriplet, ColorType};
pub use context::RenderContext;
pub use logging::StyledLogger;
pub use segment::{Segment, SegmentError};
pub use style::{Attribute, Attributes, Style, StyleParseError};
pub use text::{Span, Text};
