//! Unicode character cell width calculations.
//!
//! Terminal layout counts columns, not bytes or chars. Each code point
//! occupies 0, 1 or 2 cells:
//! - zero: NUL, combining marks and the zero-width format characters
//! - two: East Asian Wide/Fullwidth code points and wide emoji
//! - one: everything else, including control characters such as tab and ESC

use unicode_width::UnicodeWidthChar;

use crate::cache::RenderCache;

/// Strings shorter than this many bytes skip the width cache.
pub(crate) const CACHE_MIN_LEN: usize = 8;

/// True for code points that never advance the cursor.
#[must_use]
pub const fn is_zero_width(c: char) -> bool {
    matches!(
        c,
        '\0' | '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
    )
}

/// Get the cell width of a single character.
#[must_use]
pub fn get_character_cell_size(c: char) -> usize {
    if c.is_ascii_graphic() || c == ' ' {
        return 1;
    }
    if is_zero_width(c) {
        return 0;
    }
    c.width().unwrap_or(1)
}

/// Get the total cell width of a string, memoized in the global cache.
#[must_use]
pub fn cell_len(text: &str) -> usize {
    RenderCache::global().cell_len(text)
}

/// Get the total cell width of a string without caching.
#[must_use]
pub fn cell_len_uncached(text: &str) -> usize {
    if text.bytes().all(|b| b.is_ascii_graphic() || b == b' ') {
        return text.len();
    }
    text.chars().map(get_character_cell_size).sum()
}

/// Crop or pad `text` with spaces to exactly `total` cells.
///
/// A wide character straddling the limit is dropped and replaced by padding.
#[must_use]
pub fn set_cell_size(text: &str, total: usize) -> String {
    let current = cell_len(text);
    if current == total {
        return text.to_string();
    }
    if current < total {
        return format!("{text}{}", " ".repeat(total - current));
    }

    let (left, _) = chop_cells(text, total);
    let width = cell_len(left);
    format!("{left}{}", " ".repeat(total - width))
}

/// Split a string at a cell position without breaking characters.
///
/// The left part is at most `max_size` cells; a wide character that would
/// cross the limit goes to the right part.
#[must_use]
pub fn chop_cells(text: &str, max_size: usize) -> (&str, &str) {
    let mut width = 0;
    let mut byte_pos = 0;

    for (i, c) in text.char_indices() {
        let char_width = get_character_cell_size(c);
        if width + char_width > max_size {
            break;
        }
        width += char_width;
        byte_pos = i + c.len_utf8();
    }

    (&text[..byte_pos], &text[byte_pos..])
}

/// Split a string so the left part is exactly `cut` cells wide.
///
/// When the cut falls inside a double-width character, that character is
/// replaced by a space on each side. Zero-width characters at the cut stay
/// with the character they follow. Cuts past the end return the whole text
/// on the left.
#[must_use]
pub fn split_text_at_cell(text: &str, cut: usize) -> (String, String) {
    let mut width = 0;
    for (i, c) in text.char_indices() {
        let char_width = get_character_cell_size(c);
        if width == cut && char_width > 0 {
            return (text[..i].to_string(), text[i..].to_string());
        }
        if width + char_width > cut {
            let rest = &text[i + c.len_utf8()..];
            return (format!("{} ", &text[..i]), format!(" {rest}"));
        }
        width += char_width;
    }
    (text.to_string(), String::new())
}

/// Get the cell position for each character in a string.
///
/// Returns `(char_index, cell_position)` pairs.
#[must_use]
pub fn cell_positions(text: &str) -> Vec<(usize, usize)> {
    let mut cell_pos = 0;
    text.chars()
        .enumerate()
        .map(|(index, c)| {
            let position = (index, cell_pos);
            cell_pos += get_character_cell_size(c);
            position
        })
        .collect()
}

/// Char index of the first character starting at or after `cell_pos`.
///
/// Returns `None` if `cell_pos` is beyond the string's width.
#[must_use]
pub fn cell_to_char_index(text: &str, cell_pos: usize) -> Option<usize> {
    let mut current_cell = 0;
    let mut count = 0;
    for (index, c) in text.chars().enumerate() {
        if current_cell >= cell_pos {
            return Some(index);
        }
        current_cell += get_character_cell_size(c);
        count = index + 1;
    }
    (current_cell >= cell_pos).then_some(count)
}

/// Check if a string contains any wide (2-cell) characters.
#[must_use]
pub fn has_wide_chars(text: &str) -> bool {
    text.chars().any(|c| get_character_cell_size(c) > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_width() {
        assert_eq!(cell_len("hello"), 5);
        assert_eq!(cell_len("Hello, World!"), 13);
        assert_eq!(cell_len(""), 0);
    }

    #[test]
    fn test_cjk_width() {
        assert_eq!(cell_len("日本語"), 6);
        assert_eq!(cell_len("日本語 text"), 11);
        assert_eq!(cell_len("ｈｅｌｌｏ"), 10);
    }

    #[test]
    fn test_zero_width() {
        assert_eq!(cell_len("a\u{200B}b"), 2);
        assert_eq!(cell_len("e\u{0301}"), 1);
        assert_eq!(cell_len("\u{FEFF}abc"), 3);
        assert_eq!(cell_len("\0"), 0);
        assert_eq!(cell_len("\u{2060}\u{2028}\u{202E}"), 0);
    }

    #[test]
    fn test_control_chars_count_as_one() {
        assert_eq!(get_character_cell_size('\t'), 1);
        assert_eq!(get_character_cell_size('\x1b'), 1);
        assert_eq!(cell_len("a\tb"), 3);
    }

    #[test]
    fn test_emoji_width() {
        assert_eq!(get_character_cell_size('😀'), 2);
        assert!(has_wide_chars("hi 😀"));
        assert!(!has_wide_chars("plain"));
    }

    #[test]
    fn test_cached_matches_uncached() {
        for s in ["a much longer ascii string", "日本語のテキストです", "mixed 日本 and text"] {
            assert_eq!(cell_len(s), cell_len_uncached(s));
            assert_eq!(cell_len(s), cell_len(s));
        }
    }

    #[test]
    fn test_set_cell_size() {
        assert_eq!(set_cell_size("hello", 5), "hello");
        assert_eq!(set_cell_size("hi", 5), "hi   ");
        assert_eq!(set_cell_size("hello world", 5), "hello");
        assert_eq!(set_cell_size("日本語", 3), "日 ");
        assert_eq!(set_cell_size("abc", 0), "");
    }

    #[test]
    fn test_chop_cells() {
        assert_eq!(chop_cells("hello world", 5), ("hello", " world"));
        assert_eq!(chop_cells("日本語", 3), ("日", "本語"));
        assert_eq!(chop_cells("abc", 10), ("abc", ""));
    }

    #[test]
    fn test_split_text_at_cell() {
        assert_eq!(
            split_text_at_cell("hello", 2),
            ("he".to_string(), "llo".to_string())
        );
        assert_eq!(
            split_text_at_cell("日本語", 2),
            ("日".to_string(), "本語".to_string())
        );
        // through the middle of 本
        assert_eq!(
            split_text_at_cell("日本語", 3),
            ("日 ".to_string(), " 語".to_string())
        );
        assert_eq!(split_text_at_cell("abc", 0), (String::new(), "abc".to_string()));
        assert_eq!(split_text_at_cell("abc", 9), ("abc".to_string(), String::new()));
    }

    #[test]
    fn test_split_keeps_combining_mark_with_base() {
        assert_eq!(
            split_text_at_cell("e\u{301}x", 1),
            ("e\u{301}".to_string(), "x".to_string())
        );
        assert_eq!(
            split_text_at_cell("ae\u{301}\u{308}", 2),
            ("ae\u{301}\u{308}".to_string(), String::new())
        );
        // chop_cells agrees
        assert_eq!(chop_cells("e\u{301}x", 1), ("e\u{301}", "x"));
    }

    #[test]
    fn test_cell_positions() {
        assert_eq!(cell_positions("a日b"), vec![(0, 0), (1, 1), (2, 3)]);
    }

    #[test]
    fn test_cell_to_char_index() {
        assert_eq!(cell_to_char_index("a日b", 0), Some(0));
        assert_eq!(cell_to_char_index("a日b", 1), Some(1));
        assert_eq!(cell_to_char_index("a日b", 2), Some(2));
        assert_eq!(cell_to_char_index("a日b", 4), Some(3));
        assert_eq!(cell_to_char_index("a日b", 5), None);
    }
}
