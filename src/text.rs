//! Rich text with styled spans.
//!
//! A [`Text`] is a plain string plus an ordered list of [`Span`]s, each
//! styling a half-open range of character indices. Spans may overlap; where
//! they do, later spans are layered over earlier ones. A `Text` is lowered to
//! [`Segment`]s with [`Text::to_segments`] or [`Text::render`].

use std::fmt;
use std::ops::{Add, AddAssign};

use regex::Regex;

use crate::cells::{cell_len, get_character_cell_size};
use crate::segment::Segment;
use crate::style::{Style, StyleLike};

/// Text justification method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyMethod {
    /// Leave lines as they are.
    #[default]
    Default,
    Left,
    Center,
    Right,
    /// Stretch the spaces between words so every line but the last fills the width.
    Full,
}

/// What to do with content wider than the available width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowMethod {
    /// Break over-long words across lines.
    #[default]
    Fold,
    Crop,
    /// Crop and mark the cut with `…`.
    Ellipsis,
    /// Let it overflow.
    Ignore,
}

const ELLIPSIS: &str = "…";

/// A styled range of characters, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub style: Style,
}

impl Span {
    /// Create a span; reversed bounds are swapped.
    #[must_use]
    pub fn new(start: usize, end: usize, style: Style) -> Self {
        Self {
            start: start.min(end),
            end: end.max(start),
            style,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// The span shifted right by `offset` characters.
    #[must_use]
    pub fn move_right(&self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
            style: self.style.clone(),
        }
    }

    /// The part of the span inside `[start, end)`, re-based to `start`.
    #[must_use]
    pub fn clip(&self, start: usize, end: usize) -> Option<Self> {
        let clipped_start = self.start.max(start);
        let clipped_end = self.end.min(end);
        (clipped_start < clipped_end).then(|| Self {
            start: clipped_start - start,
            end: clipped_end - start,
            style: self.style.clone(),
        })
    }
}

/// Text with styled spans and display hints.
#[derive(Debug, Clone)]
pub struct Text {
    plain: String,
    spans: Vec<Span>,
    /// Length in characters.
    length: usize,
    /// Base style under every span.
    style: Style,
    pub justify: JustifyMethod,
    pub overflow: OverflowMethod,
    /// Only break at newlines in [`wrap`](Self::wrap).
    pub no_wrap: bool,
    /// Appended by [`render`](Self::render).
    pub end: String,
    pub tab_size: usize,
}

impl Default for Text {
    fn default() -> Self {
        Self::new("")
    }
}

impl Text {
    /// Create unstyled text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        let plain: String = text.into();
        let length = plain.chars().count();
        Self {
            plain,
            spans: Vec::new(),
            length,
            style: Style::default(),
            justify: JustifyMethod::Default,
            overflow: OverflowMethod::Fold,
            no_wrap: false,
            end: String::from("\n"),
            tab_size: 8,
        }
    }

    /// Create text with a base style.
    #[must_use]
    pub fn styled(text: impl Into<String>, style: impl Into<StyleLike>) -> Self {
        let mut result = Self::new(text);
        result.style = style.into().resolve_or_blank();
        result
    }

    /// Concatenate pieces, each optionally styled.
    #[must_use]
    pub fn assemble(pieces: &[(&str, Option<Style>)]) -> Self {
        let mut text = Self::new("");
        for (content, style) in pieces {
            match style {
                Some(style) => text.append_styled(content, style),
                None => text.append(content),
            }
        }
        text
    }

    /// New text sharing this text's base style and hints.
    fn derive(&self, plain: String, spans: Vec<Span>) -> Self {
        Self {
            length: plain.chars().count(),
            plain,
            spans,
            style: self.style.clone(),
            justify: self.justify,
            overflow: self.overflow,
            no_wrap: self.no_wrap,
            end: self.end.clone(),
            tab_size: self.tab_size,
        }
    }

    #[must_use]
    pub fn plain(&self) -> &str {
        &self.plain
    }

    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Length in characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.length
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Width in terminal cells.
    #[must_use]
    pub fn cell_len(&self) -> usize {
        cell_len(&self.plain)
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.plain
            .char_indices()
            .nth(char_index)
            .map_or(self.plain.len(), |(i, _)| i)
    }

    /// Append unstyled text.
    pub fn append(&mut self, text: &str) {
        self.plain.push_str(text);
        self.length += text.chars().count();
    }

    /// Append text covered by a new span.
    ///
    /// A style definition that fails to parse leaves the text unstyled.
    pub fn append_styled(&mut self, text: &str, style: impl Into<StyleLike>) {
        let start = self.length;
        self.append(text);
        let style = style.into().resolve_or_blank();
        if !style.is_blank() && self.length > start {
            self.spans.push(Span::new(start, self.length, style));
        }
    }

    /// Append another text; its base style becomes a span over the appended range.
    pub fn append_text(&mut self, other: &Text) {
        let offset = self.length;
        if !other.style.is_blank() && other.length > 0 {
            self.spans
                .push(Span::new(offset, offset + other.length, other.style.clone()));
        }
        self.extend_with(other);
    }

    /// Append plain text and spans, ignoring `other`'s base style.
    fn extend_with(&mut self, other: &Text) {
        let offset = self.length;
        self.plain.push_str(&other.plain);
        self.length += other.length;
        self.spans
            .extend(other.spans.iter().map(|span| span.move_right(offset)));
    }

    /// Style the characters in `[start, end)`; bounds are clamped to the text.
    pub fn stylize(&mut self, start: usize, end: usize, style: impl Into<StyleLike>) {
        let end = end.min(self.length);
        let start = start.min(end);
        if start == end {
            return;
        }
        let style = style.into().resolve_or_blank();
        if !style.is_blank() {
            self.spans.push(Span::new(start, end, style));
        }
    }

    /// Style the whole text with a new span.
    pub fn stylize_all(&mut self, style: impl Into<StyleLike>) {
        self.stylize(0, self.length, style);
    }

    /// Add a span for every match of `pattern`. Returns the number of matches.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error for an invalid pattern.
    pub fn highlight_regex(&mut self, pattern: &str, style: &Style) -> Result<usize, regex::Error> {
        let re = Regex::new(pattern)?;
        Ok(self.highlight_matches(&re, style))
    }

    /// Add a span for every occurrence of any of `words`. Returns the number
    /// of matches.
    ///
    /// # Errors
    ///
    /// Returns an error only if the combined pattern exceeds the regex size limit.
    pub fn highlight_words(
        &mut self,
        words: &[&str],
        style: &Style,
        case_sensitive: bool,
    ) -> Result<usize, regex::Error> {
        let alternatives: Vec<String> = words
            .iter()
            .filter(|word| !word.is_empty())
            .map(|word| regex::escape(word))
            .collect();
        if alternatives.is_empty() {
            return Ok(0);
        }
        let flags = if case_sensitive { "" } else { "(?i)" };
        let re = Regex::new(&format!("{flags}(?:{})", alternatives.join("|")))?;
        Ok(self.highlight_matches(&re, style))
    }

    fn highlight_matches(&mut self, re: &Regex, style: &Style) -> usize {
        let char_starts: Vec<usize> = self.plain.char_indices().map(|(i, _)| i).collect();
        let to_char = |byte: usize| char_starts.partition_point(|&b| b < byte);

        let mut count = 0;
        for found in re.find_iter(&self.plain) {
            let start = to_char(found.start());
            let end = to_char(found.end());
            if start < end {
                self.spans.push(Span::new(start, end, style.clone()));
                count += 1;
            }
        }
        count
    }

    /// Characters `[start, end)` as new text; bounds are clamped and spans
    /// clipped and re-based.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Self {
        let end = end.min(self.length);
        let start = start.min(end);
        let plain = self.plain[self.byte_offset(start)..self.byte_offset(end)].to_string();
        let spans = self
            .spans
            .iter()
            .filter_map(|span| span.clip(start, end))
            .collect();
        self.derive(plain, spans)
    }

    /// Join `items` with this text as the separator.
    #[must_use]
    pub fn join<'a, I>(&self, items: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut result = Self::new("");
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                result.append_text(self);
            }
            result.append_text(item);
        }
        result
    }

    /// Split at newlines. The newline characters are dropped, and so is a
    /// trailing empty line. Empty text gives one empty line.
    #[must_use]
    pub fn split_lines(&self) -> Vec<Self> {
        let mut lines = self.split_on_newlines();
        if lines.len() > 1 && lines.last().is_some_and(Text::is_empty) {
            lines.pop();
        }
        lines
    }

    fn split_on_newlines(&self) -> Vec<Self> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (index, c) in self.plain.chars().enumerate() {
            if c == '\n' {
                lines.push(self.slice(start, index));
                start = index + 1;
            }
        }
        lines.push(self.slice(start, self.length));
        lines
    }

    /// Divide at character offsets, giving `offsets.len() + 1` pieces.
    #[must_use]
    pub fn divide(&self, offsets: &[usize]) -> Vec<Self> {
        let mut result = Vec::with_capacity(offsets.len() + 1);
        let mut previous = 0;
        for &offset in offsets {
            let clamped = offset.clamp(previous, self.length);
            result.push(self.slice(previous, clamped));
            previous = clamped;
        }
        result.push(self.slice(previous, self.length));
        result
    }

    /// Replace tabs with spaces up to the next multiple of `tab_size` columns.
    #[must_use]
    pub fn expand_tabs(&self, tab_size: usize) -> Self {
        if tab_size == 0 || !self.plain.contains('\t') {
            return self.clone();
        }

        let mut plain = String::with_capacity(self.plain.len());
        // new_start[i] = index of old char i in the expanded text
        let mut new_start: Vec<usize> = Vec::with_capacity(self.length + 1);
        let mut new_len = 0;
        let mut column = 0;

        for c in self.plain.chars() {
            new_start.push(new_len);
            match c {
                '\t' => {
                    let spaces = tab_size - (column % tab_size);
                    plain.extend(std::iter::repeat_n(' ', spaces));
                    new_len += spaces;
                    column += spaces;
                }
                '\n' => {
                    plain.push(c);
                    new_len += 1;
                    column = 0;
                }
                _ => {
                    plain.push(c);
                    new_len += 1;
                    column += get_character_cell_size(c);
                }
            }
        }
        new_start.push(new_len);

        let spans = self
            .spans
            .iter()
            .filter_map(|span| {
                let start = new_start[span.start.min(self.length)];
                let end = new_start[span.end.min(self.length)];
                (start < end).then(|| Span::new(start, end, span.style.clone()))
            })
            .collect();
        self.derive(plain, spans)
    }

    /// Index of the first character that would overflow `max_width` cells,
    /// and the width of everything before it.
    fn fit_point(&self, max_width: usize) -> (usize, usize) {
        let mut width = 0;
        for (index, c) in self.plain.chars().enumerate() {
            let char_width = get_character_cell_size(c);
            if width + char_width > max_width {
                return (index, width);
            }
            width += char_width;
        }
        (self.length, width)
    }

    /// Crop or pad to exactly `width` cells.
    fn set_cell_width(&mut self, width: usize) {
        let (cut, fitted) = self.fit_point(width);
        *self = self.slice(0, cut);
        if fitted < width {
            self.pad_right(width - fitted);
        }
    }

    /// Fit the text into `max_width` cells according to `overflow`, padding
    /// with spaces afterwards if `pad` is set.
    pub fn truncate(&mut self, max_width: usize, overflow: OverflowMethod, pad: bool) {
        if overflow != OverflowMethod::Ignore && self.cell_len() > max_width {
            if overflow == OverflowMethod::Ellipsis && max_width > 0 {
                self.set_cell_width(max_width - 1);
                self.append(ELLIPSIS);
            } else {
                self.set_cell_width(max_width);
            }
        }
        if pad {
            let width = self.cell_len();
            if width < max_width {
                self.pad_right(max_width - width);
            }
        }
    }

    /// Pad to `width` cells with spaces placed according to `align`.
    pub fn pad(&mut self, width: usize, align: JustifyMethod) {
        let current = self.cell_len();
        if current >= width {
            return;
        }
        let padding = width - current;
        match align {
            JustifyMethod::Right => self.pad_left(padding),
            JustifyMethod::Center => {
                self.pad_left(padding / 2);
                self.pad_right(padding - padding / 2);
            }
            JustifyMethod::Default | JustifyMethod::Left | JustifyMethod::Full => {
                self.pad_right(padding);
            }
        }
    }

    /// Insert `count` spaces at the start, shifting spans.
    pub fn pad_left(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.plain.insert_str(0, &" ".repeat(count));
        self.length += count;
        for span in &mut self.spans {
            span.start += count;
            span.end += count;
        }
    }

    /// Append `count` unstyled spaces.
    pub fn pad_right(&mut self, count: usize) {
        if count > 0 {
            self.append(&" ".repeat(count));
        }
    }

    /// Remove `amount` characters from the end.
    pub fn right_crop(&mut self, amount: usize) {
        if amount > 0 {
            *self = self.slice(0, self.length.saturating_sub(amount));
        }
    }

    /// Strip leading and trailing whitespace.
    #[must_use]
    pub fn strip(&self) -> Self {
        let start = self
            .plain
            .chars()
            .position(|c| !c.is_whitespace())
            .unwrap_or(self.length);
        let end = self.content_end();
        self.slice(start, end.max(start))
    }

    /// Strip trailing whitespace.
    #[must_use]
    pub fn rstrip(&self) -> Self {
        self.slice(0, self.content_end())
    }

    fn content_end(&self) -> usize {
        let trailing = self
            .plain
            .chars()
            .rev()
            .take_while(|c| c.is_whitespace())
            .count();
        self.length - trailing
    }

    /// Word-wrap to `width` cells.
    ///
    /// Lines break at whitespace; whitespace at a break is consumed, so no
    /// line but the first starts with whitespace and no wrapped line ends
    /// with it. Words wider than `width` are broken by column when
    /// `overflow` is [`OverflowMethod::Fold`] and cropped otherwise. Newlines
    /// always break. A `width` of 0, or text that already fits on one line,
    /// gives the text back unchanged.
    #[must_use]
    pub fn wrap(&self, width: usize) -> Vec<Self> {
        if width == 0 || (!self.plain.contains('\n') && self.cell_len() <= width) {
            return vec![self.clone()];
        }

        let mut lines = Vec::new();
        for line in self.split_on_newlines() {
            if self.no_wrap {
                lines.push(line);
                continue;
            }
            let offsets = line.break_offsets(width, self.overflow == OverflowMethod::Fold);
            lines.extend(line.divide(&offsets).iter().map(Text::rstrip));
        }

        justify_lines(&mut lines, width, self.justify, self.overflow);
        if self.overflow != OverflowMethod::Ignore {
            for line in &mut lines {
                line.truncate(width, self.overflow, false);
            }
        }
        lines
    }

    /// Character offsets where a single line should break to fit `width`.
    fn break_offsets(&self, width: usize, fold: bool) -> Vec<usize> {
        let chars: Vec<char> = self.plain.chars().collect();
        let mut columns = Vec::with_capacity(chars.len() + 1);
        columns.push(0);
        for &c in &chars {
            let last = columns.last().copied().unwrap_or(0);
            columns.push(last + get_character_cell_size(c));
        }
        let cells = |start: usize, end: usize| columns[end] - columns[start];

        let mut breaks = Vec::new();
        let mut line_position = 0;

        for (start, content_end, end) in word_ranges(&chars) {
            let word_width = cells(start, content_end);
            let fits = line_position <= width && word_width <= width - line_position;

            if fits {
                line_position += cells(start, end);
            } else if word_width > width {
                if fold {
                    let mut chunk_start = start;
                    for index in start..content_end {
                        if cells(chunk_start, index + 1) > width && index > chunk_start {
                            if chunk_start > 0 {
                                breaks.push(chunk_start);
                            }
                            chunk_start = index;
                        }
                    }
                    if chunk_start > 0 {
                        breaks.push(chunk_start);
                    }
                    line_position = cells(chunk_start, end);
                } else {
                    if start > 0 {
                        breaks.push(start);
                    }
                    line_position = cells(start, end);
                }
            } else if start > 0 {
                breaks.push(start);
                line_position = cells(start, end);
            }
        }

        breaks.dedup();
        breaks
    }

    /// Lower to segments: one per maximal run of characters covered by the
    /// same set of spans. Each run's style is the base style combined with
    /// the covering spans in the order they were added.
    #[must_use]
    pub fn to_segments(&self) -> Vec<Segment> {
        if self.plain.is_empty() {
            return Vec::new();
        }

        let style_for = |active: &[usize]| -> Option<Style> {
            let combined = Style::chain(
                std::iter::once(&self.style).chain(active.iter().map(|&i| &self.spans[i].style)),
            );
            (!combined.is_blank()).then_some(combined)
        };

        if self.spans.is_empty() {
            return vec![Segment::new(self.plain.clone(), style_for(&[]))];
        }

        // (offset, is_start, span index); ends sort before starts at one offset
        let mut events: Vec<(usize, bool, usize)> = Vec::with_capacity(self.spans.len() * 2);
        for (index, span) in self.spans.iter().enumerate() {
            let end = span.end.min(self.length);
            if span.start < end {
                events.push((span.start, true, index));
                events.push((end, false, index));
            }
        }
        events.sort_unstable();

        let mut byte_offsets: Vec<usize> = self.plain.char_indices().map(|(i, _)| i).collect();
        byte_offsets.push(self.plain.len());

        let mut segments = Vec::with_capacity(events.len() + 1);
        let mut active: Vec<usize> = Vec::new();
        let mut cursor = 0;

        for (offset, is_start, index) in events {
            if offset > cursor {
                let text = &self.plain[byte_offsets[cursor]..byte_offsets[offset]];
                segments.push(Segment::new(text, style_for(&active)));
                cursor = offset;
            }
            if is_start {
                let position = active.partition_point(|&i| i < index);
                active.insert(position, index);
            } else {
                active.retain(|&i| i != index);
            }
        }

        if cursor < self.length {
            let text = &self.plain[byte_offsets[cursor]..];
            segments.push(Segment::new(text, style_for(&active)));
        }

        segments
    }

    /// Segments followed by an unstyled `end` segment (if non-empty).
    #[must_use]
    pub fn render(&self, end: &str) -> Vec<Segment> {
        let mut segments = self.to_segments();
        if !end.is_empty() {
            segments.push(Segment::plain(end));
        }
        segments
    }
}

/// `(start, content_end, end)` for each word: leading whitespace (first word
/// only), the word, and its trailing whitespace.
fn word_ranges(chars: &[char]) -> Vec<(usize, usize, usize)> {
    let mut ranges = Vec::new();
    let mut index = 0;
    while index < chars.len() {
        let start = index;
        while index < chars.len() && chars[index].is_whitespace() {
            index += 1;
        }
        while index < chars.len() && !chars[index].is_whitespace() {
            index += 1;
        }
        let content_end = index;
        while index < chars.len() && chars[index].is_whitespace() {
            index += 1;
        }
        ranges.push((start, content_end, index));
    }
    ranges
}

fn justify_lines(lines: &mut [Text], width: usize, justify: JustifyMethod, overflow: OverflowMethod) {
    match justify {
        JustifyMethod::Default => {}
        JustifyMethod::Left => {
            for line in lines.iter_mut() {
                line.truncate(width, overflow, true);
            }
        }
        JustifyMethod::Center => {
            for line in lines.iter_mut() {
                *line = line.rstrip();
                line.truncate(width, overflow, false);
                let padding = width.saturating_sub(line.cell_len());
                line.pad_left(padding / 2);
                line.pad_right(padding - padding / 2);
            }
        }
        JustifyMethod::Right => {
            for line in lines.iter_mut() {
                *line = line.rstrip();
                line.truncate(width, overflow, false);
                line.pad_left(width.saturating_sub(line.cell_len()));
            }
        }
        JustifyMethod::Full => {
            let last = lines.len().saturating_sub(1);
            for line in &mut lines[..last] {
                *line = full_justify(line, width);
            }
        }
    }
}

/// Widen the gaps between words, rightmost first, until the line is `width` wide.
fn full_justify(line: &Text, width: usize) -> Text {
    let mut words = Vec::new();
    let mut start = 0;
    for (index, c) in line.plain.chars().enumerate() {
        if c == ' ' {
            words.push(line.slice(start, index));
            start = index + 1;
        }
    }
    words.push(line.slice(start, line.length));

    let gaps = words.len() - 1;
    if gaps == 0 {
        return line.clone();
    }

    let mut spaces = vec![1; gaps];
    let mut total: usize = words.iter().map(Text::cell_len).sum::<usize>() + gaps;
    let mut step = 0;
    while total < width {
        spaces[gaps - 1 - step] += 1;
        total += 1;
        step = (step + 1) % gaps;
    }

    let mut justified = line.derive(String::new(), Vec::new());
    for (index, word) in words.iter().enumerate() {
        justified.extend_with(word);
        if let Some(&count) = spaces.get(index) {
            justified.append(&" ".repeat(count));
        }
    }
    justified
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.plain)
    }
}

impl PartialEq for Text {
    fn eq(&self, other: &Self) -> bool {
        self.plain == other.plain && self.spans == other.spans
    }
}

impl Eq for Text {}

impl Add for Text {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self.append_text(&rhs);
        self
    }
}

impl AddAssign for Text {
    fn add_assign(&mut self, rhs: Self) {
        self.append_text(&rhs);
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
