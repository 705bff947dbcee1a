//! Segment - the atomic rendering unit.
//!
//! A `Segment` is either a piece of text with one style (or none) or a list of
//! terminal control codes. Everything the crate draws is lowered to a stream of
//! segments, and [`render`] is the one place that stream becomes ANSI text.

use std::fmt;

use smallvec::SmallVec;

use crate::cache::RenderCache;
use crate::cells::{cell_len, split_text_at_cell};
use crate::color::ColorSystem;
use crate::style::Style;
use crate::terminal_theme::{DEFAULT_TERMINAL_THEME, TerminalTheme};

const RESET: &str = "\x1b[0m";

/// Control codes for terminal manipulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlType {
    Bell = 1,
    CarriageReturn = 2,
    Home = 3,
    Clear = 4,
    ShowCursor = 5,
    HideCursor = 6,
    EnableAltScreen = 7,
    DisableAltScreen = 8,
    CursorUp = 9,
    CursorDown = 10,
    CursorForward = 11,
    CursorBackward = 12,
    CursorMoveToColumn = 13,
    CursorMoveTo = 14,
    EraseInLine = 15,
}

/// A control code with up to two integer parameters inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ControlCode {
    pub control_type: ControlType,
    pub params: SmallVec<[i32; 2]>,
}

impl ControlCode {
    #[must_use]
    pub fn new(control_type: ControlType) -> Self {
        Self {
            control_type,
            params: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_params(control_type: ControlType, params: impl IntoIterator<Item = i32>) -> Self {
        Self {
            control_type,
            params: params.into_iter().collect(),
        }
    }

    fn param(&self, index: usize, default: i32) -> i32 {
        self.params.get(index).copied().unwrap_or(default)
    }

    /// The escape sequence this code stands for.
    ///
    /// Cursor positions are zero-based here and one-based on the wire.
    #[must_use]
    pub fn escape_sequence(&self) -> String {
        match self.control_type {
            ControlType::Bell => "\x07".to_string(),
            ControlType::CarriageReturn => "\r".to_string(),
            ControlType::Home => "\x1b[H".to_string(),
            ControlType::Clear => "\x1b[2J".to_string(),
            ControlType::ShowCursor => "\x1b[?25h".to_string(),
            ControlType::HideCursor => "\x1b[?25l".to_string(),
            ControlType::EnableAltScreen => "\x1b[?1049h".to_string(),
            ControlType::DisableAltScreen => "\x1b[?1049l".to_string(),
            ControlType::CursorUp => format!("\x1b[{}A", self.param(0, 1)),
            ControlType::CursorDown => format!("\x1b[{}B", self.param(0, 1)),
            ControlType::CursorForward => format!("\x1b[{}C", self.param(0, 1)),
            ControlType::CursorBackward => format!("\x1b[{}D", self.param(0, 1)),
            ControlType::CursorMoveToColumn => format!("\x1b[{}G", self.param(0, 0) + 1),
            ControlType::CursorMoveTo => {
                format!("\x1b[{};{}H", self.param(1, 0) + 1, self.param(0, 0) + 1)
            }
            ControlType::EraseInLine => format!("\x1b[{}K", self.param(0, 0)),
        }
    }
}

/// Errors from building a segment out of raw parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    /// A segment carries control codes and non-empty text at the same time.
    ControlWithText(String),
}

impl fmt::Display for SegmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlWithText(text) => {
                write!(f, "control segment cannot carry text: {text:?}")
            }
        }
    }
}

impl std::error::Error for SegmentError {}

/// The atomic unit of rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segment {
    text: String,
    style: Option<Style>,
    control: Option<Vec<ControlCode>>,
}

impl Segment {
    /// Create a text segment with an optional style.
    #[must_use]
    pub fn new(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
            control: None,
        }
    }

    #[must_use]
    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::new(text, Some(style))
    }

    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    /// A newline segment.
    #[must_use]
    pub fn line() -> Self {
        Self::new("\n", None)
    }

    /// A control segment.
    #[must_use]
    pub fn control(control_codes: Vec<ControlCode>) -> Self {
        Self {
            text: String::new(),
            style: None,
            control: Some(control_codes),
        }
    }

    /// Build a segment from raw parts.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::ControlWithText`] if `control` is set and `text`
    /// is not empty.
    pub fn try_new(
        text: impl Into<String>,
        style: Option<Style>,
        control: Option<Vec<ControlCode>>,
    ) -> Result<Self, SegmentError> {
        let text = text.into();
        if control.is_some() && !text.is_empty() {
            return Err(SegmentError::ControlWithText(text));
        }
        Ok(Self {
            text,
            style,
            control,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn style(&self) -> Option<&Style> {
        self.style.as_ref()
    }

    #[must_use]
    pub fn control_codes(&self) -> Option<&[ControlCode]> {
        self.control.as_deref()
    }

    #[must_use]
    pub fn into_parts(self) -> (String, Option<Style>, Option<Vec<ControlCode>>) {
        (self.text, self.style, self.control)
    }

    #[must_use]
    pub const fn is_control(&self) -> bool {
        self.control.is_some()
    }

    /// Cell width of the text. Control segments have zero width.
    #[must_use]
    pub fn cell_length(&self) -> usize {
        if self.is_control() {
            0
        } else {
            cell_len(&self.text)
        }
    }

    /// True for a text segment with no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.control.is_none()
    }

    /// The same segment with `style` replacing its style.
    #[must_use]
    pub fn with_style(mut self, style: Option<Style>) -> Self {
        if !self.is_control() {
            self.style = style;
        }
        self
    }

    /// Split at a cell position; the left part is exactly `cut` cells wide.
    ///
    /// A double-width character straddling the cut is replaced by a space on
    /// each side. Cuts past the end clamp, leaving an empty right part.
    #[must_use]
    pub fn split_cells(&self, cut: usize) -> (Self, Self) {
        if self.is_control() {
            return (self.clone(), Self::new("", None));
        }
        let (left, right) = split_text_at_cell(&self.text, cut);
        (
            Self::new(left, self.style.clone()),
            Self::new(right, self.style.clone()),
        )
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for Segment {
    fn from(text: &str) -> Self {
        Self::plain(text)
    }
}

impl From<String> for Segment {
    fn from(text: String) -> Self {
        Self::plain(text)
    }
}

// ============================================================================
// Segment Operations
// ============================================================================

/// Apply styles to segments: `style` underneath each segment's own style and
/// `post_style` on top. Control segments pass through.
pub fn apply_style<'a, I>(
    segments: I,
    style: Option<&'a Style>,
    post_style: Option<&'a Style>,
) -> impl Iterator<Item = Segment> + 'a
where
    I: IntoIterator<Item = Segment>,
    I::IntoIter: 'a,
{
    segments.into_iter().map(move |mut seg| {
        if seg.is_control() {
            return seg;
        }
        if let Some(pre) = style {
            seg.style = Some(match seg.style {
                Some(s) => pre.combine(&s),
                None => pre.clone(),
            });
        }
        if let Some(post) = post_style {
            seg.style = Some(match seg.style {
                Some(s) => s.combine(post),
                None => post.clone(),
            });
        }
        seg
    })
}

/// Split segments into lines at newline characters.
///
/// Empty pieces are dropped and a trailing newline does not open a new line.
#[must_use]
pub fn split_lines(segments: impl IntoIterator<Item = Segment>) -> Vec<Vec<Segment>> {
    let mut lines = Vec::new();
    let mut line: Vec<Segment> = Vec::new();

    for segment in segments {
        if segment.is_control() || !segment.text.contains('\n') {
            line.push(segment);
            continue;
        }
        let mut parts = segment.text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                line.push(Segment::new(part, segment.style.clone()));
            }
            if parts.peek().is_some() {
                lines.push(std::mem::take(&mut line));
            }
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split into lines and crop or pad each to `length` cells.
///
/// With `include_new_lines`, each line that ended in a newline keeps a
/// trailing newline segment.
#[must_use]
pub fn split_and_crop_lines(
    segments: impl IntoIterator<Item = Segment>,
    length: usize,
    style: Option<&Style>,
    pad: bool,
    include_new_lines: bool,
) -> Vec<Vec<Segment>> {
    let mut lines = Vec::new();
    let mut line: Vec<Segment> = Vec::new();

    for segment in segments {
        if segment.is_control() {
            line.push(segment);
            continue;
        }
        let mut parts = segment.text.split('\n').peekable();
        while let Some(part) = parts.next() {
            if !part.is_empty() {
                line.push(Segment::new(part, segment.style.clone()));
            }
            if parts.peek().is_some() {
                let mut cropped =
                    adjust_line_length(std::mem::take(&mut line), length, style, pad);
                if include_new_lines {
                    cropped.push(Segment::line());
                }
                lines.push(cropped);
            }
        }
    }

    if !line.is_empty() {
        lines.push(adjust_line_length(line, length, style, pad));
    }
    lines
}

/// Crop a line to at most `max_width` cells.
///
/// The segment that crosses the limit is split with [`Segment::split_cells`];
/// everything after it is dropped.
#[must_use]
pub fn crop_line(line: Vec<Segment>, max_width: usize) -> Vec<Segment> {
    let mut result = Vec::with_capacity(line.len());
    let mut remaining = max_width;

    for segment in line {
        let width = segment.cell_length();
        if width <= remaining {
            remaining -= width;
            result.push(segment);
            continue;
        }
        if remaining > 0 {
            let (left, _) = segment.split_cells(remaining);
            result.push(left);
        }
        break;
    }

    result
}

/// Crop a line to `length` cells, or pad it with one blank segment when it is
/// shorter and `pad` is set.
#[must_use]
pub fn adjust_line_length(
    mut line: Vec<Segment>,
    length: usize,
    style: Option<&Style>,
    pad: bool,
) -> Vec<Segment> {
    let current = line_length(&line);
    if current < length {
        if pad {
            line.push(Segment::new(" ".repeat(length - current), style.cloned()));
        }
        line
    } else if current > length {
        crop_line(line, length)
    } else {
        line
    }
}

/// Merge runs of adjacent text segments that share a style.
///
/// Empty text segments are dropped; a control segment always ends a run.
#[must_use]
pub fn simplify(segments: impl IntoIterator<Item = Segment>) -> Vec<Segment> {
    let mut result: Vec<Segment> = Vec::new();

    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        if !segment.is_control()
            && let Some(last) = result.last_mut()
            && !last.is_control()
            && last.style == segment.style
        {
            last.text.push_str(&segment.text);
            continue;
        }
        result.push(segment);
    }

    result
}

/// Divide a line at the given cell offsets.
///
/// Returns `cuts.len()` pieces; the piece `i` covers cells up to `cuts[i]`.
/// Content past the last cut is dropped.
#[must_use]
pub fn divide(segments: impl IntoIterator<Item = Segment>, cuts: &[usize]) -> Vec<Vec<Segment>> {
    let mut result: Vec<Vec<Segment>> = vec![Vec::new(); cuts.len()];
    if cuts.is_empty() {
        return result;
    }

    let mut cut_index = 0;
    let mut position = 0;

    'segments: for segment in segments {
        if segment.is_control() {
            result[cut_index].push(segment);
            continue;
        }

        let mut remaining = segment;
        loop {
            let cut = cuts[cut_index];
            let end = position + remaining.cell_length();
            if end <= cut {
                position = end;
                if !remaining.text.is_empty() {
                    result[cut_index].push(remaining);
                }
                if end == cut {
                    cut_index += 1;
                    if cut_index == cuts.len() {
                        break 'segments;
                    }
                }
                continue 'segments;
            }

            let (left, right) = remaining.split_cells(cut.saturating_sub(position));
            if !left.text.is_empty() {
                result[cut_index].push(left);
            }
            position = cut;
            cut_index += 1;
            if cut_index == cuts.len() {
                break 'segments;
            }
            remaining = right;
        }
    }

    result
}

/// Total cell length of a line of segments.
#[must_use]
pub fn line_length(line: &[Segment]) -> usize {
    line.iter().map(Segment::cell_length).sum()
}

/// `(width, height)` of a block of lines, width being the longest line.
#[must_use]
pub fn get_shape(lines: &[Vec<Segment>]) -> (usize, usize) {
    let width = lines.iter().map(|line| line_length(line)).max().unwrap_or(0);
    (width, lines.len())
}

/// Resize a block of lines to exactly `width` x `height`, cropping or padding
/// each line and adding blank lines at the bottom.
#[must_use]
pub fn set_shape(
    lines: Vec<Vec<Segment>>,
    width: usize,
    height: usize,
    style: Option<&Style>,
) -> Vec<Vec<Segment>> {
    let mut shaped: Vec<Vec<Segment>> = lines
        .into_iter()
        .take(height)
        .map(|line| adjust_line_length(line, width, style, true))
        .collect();
    while shaped.len() < height {
        shaped.push(blank_line(width, style));
    }
    shaped
}

fn blank_line(width: usize, style: Option<&Style>) -> Vec<Segment> {
    vec![Segment::new(" ".repeat(width), style.cloned())]
}

fn pad_lines(lines: Vec<Vec<Segment>>, width: usize, style: Option<&Style>) -> Vec<Vec<Segment>> {
    lines
        .into_iter()
        .map(|line| adjust_line_length(line, width, style, true))
        .collect()
}

/// Pad lines to `width` and add blank lines below to reach `height`.
#[must_use]
pub fn align_top(
    lines: Vec<Vec<Segment>>,
    width: usize,
    height: usize,
    style: Option<&Style>,
) -> Vec<Vec<Segment>> {
    let mut result = pad_lines(lines, width, style);
    while result.len() < height {
        result.push(blank_line(width, style));
    }
    result
}

/// Pad lines to `width` and add blank lines above to reach `height`.
#[must_use]
pub fn align_bottom(
    lines: Vec<Vec<Segment>>,
    width: usize,
    height: usize,
    style: Option<&Style>,
) -> Vec<Vec<Segment>> {
    let padding = height.saturating_sub(lines.len());
    let mut result: Vec<Vec<Segment>> = (0..padding).map(|_| blank_line(width, style)).collect();
    result.extend(pad_lines(lines, width, style));
    result
}

/// Pad lines to `width` and center them vertically in `height`.
///
/// An odd leftover line goes below.
#[must_use]
pub fn align_middle(
    lines: Vec<Vec<Segment>>,
    width: usize,
    height: usize,
    style: Option<&Style>,
) -> Vec<Vec<Segment>> {
    let total = height.saturating_sub(lines.len());
    let top = total / 2;
    let bottom = total - top;

    let mut result: Vec<Vec<Segment>> = (0..top).map(|_| blank_line(width, style)).collect();
    result.extend(pad_lines(lines, width, style));
    result.extend((0..bottom).map(|_| blank_line(width, style)));
    result
}

/// Remove all styles, keeping text and control segments.
pub fn strip_styles(segments: impl IntoIterator<Item = Segment>) -> impl Iterator<Item = Segment> {
    segments.into_iter().map(|mut seg| {
        seg.style = None;
        seg
    })
}

/// Remove hyperlinks from styles.
pub fn strip_links(segments: impl IntoIterator<Item = Segment>) -> impl Iterator<Item = Segment> {
    segments.into_iter().map(|mut seg| {
        if let Some(style) = seg.style.as_mut() {
            style.link = None;
        }
        seg
    })
}

/// Remove foreground and background colors, keeping attributes.
pub fn remove_color(segments: impl IntoIterator<Item = Segment>) -> impl Iterator<Item = Segment> {
    segments.into_iter().map(|mut seg| {
        seg.style = seg.style.map(|style| style.without_color());
        seg
    })
}

/// Keep only control segments (`is_control == true`) or only text segments.
pub fn filter_control(
    segments: impl IntoIterator<Item = Segment>,
    is_control: bool,
) -> impl Iterator<Item = Segment> {
    segments
        .into_iter()
        .filter(move |seg| seg.is_control() == is_control)
}

/// Serialize segments to ANSI text for `color_system`.
///
/// A style is emitted only when it differs from the previous text segment's
/// style, a reset precedes every change away from an active style, and one
/// final reset closes the output. Control segments are written verbatim and
/// leave the style state alone.
#[must_use]
pub fn render(segments: &[Segment], color_system: ColorSystem) -> String {
    render_with(
        segments,
        color_system,
        &DEFAULT_TERMINAL_THEME,
        RenderCache::global(),
    )
}

/// [`render`] with an explicit theme and cache.
#[must_use]
pub fn render_with(
    segments: &[Segment],
    color_system: ColorSystem,
    theme: &TerminalTheme,
    cache: &RenderCache,
) -> String {
    let mut output = String::new();
    let mut current: Option<&Style> = None;
    let mut active = false;

    for segment in segments {
        if let Some(codes) = &segment.control {
            for code in codes {
                output.push_str(&code.escape_sequence());
            }
            continue;
        }
        if segment.text.is_empty() {
            continue;
        }

        if segment.style.as_ref() != current {
            if active {
                output.push_str(RESET);
                active = false;
            }
            if let Some(style) = &segment.style {
                let sgr = style.render_with(color_system, theme, cache);
                if !sgr.is_empty() {
                    output.push_str(&sgr);
                    active = true;
                }
            }
            current = segment.style.as_ref();
        }
        output.push_str(&segment.text);
    }

    if active {
        output.push_str(RESET);
    }
    output
}

/// Concatenate the text of all text segments, ignoring styles and controls.
#[must_use]
pub fn render_plain(segments: &[Segment]) -> String {
    segments
        .iter()
        .filter(|seg| !seg.is_control())
        .map(Segment::text)
        .collect()
}
