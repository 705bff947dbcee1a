//! Property-based tests for rich_core.
//!
//! These tests check invariants that must hold for every input, not just the
//! hand-picked cases in the unit tests.

use proptest::prelude::*;
use regex::Regex;

use rich_core::cells::{cell_len, cell_len_uncached};
use rich_core::color::{Color, ColorSystem, ColorType};
use rich_core::segment::{self, Segment};
use rich_core::style::{Attribute, Style};
use rich_core::text::Text;

// ============================================================================
// Custom Strategies
// ============================================================================

fn color() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::default_color()),
        (0u8..16).prop_map(Color::from_ansi),
        (16u8..=255).prop_map(Color::from_ansi),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::from_rgb(r, g, b)),
        (0u8..16).prop_map(Color::from_windows),
        (any::<u8>(), any::<u8>(), any::<u8>(), downgrade_target())
            .prop_map(|(r, g, b, system)| Color::from_rgb(r, g, b).downgrade(system)),
    ]
}

fn downgrade_target() -> impl Strategy<Value = ColorSystem> {
    prop_oneof![
        Just(ColorSystem::Standard),
        Just(ColorSystem::EightBit),
        Just(ColorSystem::Windows),
    ]
}

/// Each attribute is unset, on or off.
fn attribute_states() -> impl Strategy<Value = Vec<Option<bool>>> {
    prop::collection::vec(prop::option::of(any::<bool>()), Attribute::ALL.len())
}

fn style() -> impl Strategy<Value = Style> {
    (
        prop::option::of(color()),
        prop::option::of(color()),
        attribute_states(),
        prop::option::of("[a-z]{1,8}"),
        prop::option::of(("[a-c]", "[a-z]{0,4}")),
    )
        .prop_map(|(fg, bg, states, link, meta)| {
            let mut style = Style::new();
            if let Some(fg) = fg {
                style = style.color(fg);
            }
            if let Some(bg) = bg {
                style = style.bgcolor(bg);
            }
            for (attr, state) in Attribute::ALL.iter().zip(states) {
                if let Some(enabled) = state {
                    style = style.set(*attr, enabled);
                }
            }
            if let Some(link) = link {
                style = style.link(format!("https://{link}.example"));
            }
            if let Some((key, value)) = meta {
                style = style.meta_entry(key, value);
            }
            style
        })
}

/// Mixed ASCII, CJK, combining and zero-width text.
fn mixed_text() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof![
            4 => "[a-z ]",
            2 => "[日本語中文]",
            1 => Just("\u{0301}".to_string()),
            1 => Just("\u{200B}".to_string()),
            1 => Just("😀".to_string()),
        ],
        0..24,
    )
    .prop_map(|parts| parts.concat())
}

fn strip_sgr(rendered: &str) -> String {
    Regex::new("\x1b\\[[0-9;]*m")
        .expect("valid regex")
        .replace_all(rendered, "")
        .into_owned()
}

// ============================================================================
// Style
// ============================================================================

proptest! {
    #[test]
    fn prop_combine_is_associative(a in style(), b in style(), c in style()) {
        prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
    }

    #[test]
    fn prop_blank_is_identity(a in style()) {
        let blank = Style::new();
        prop_assert_eq!(blank.combine(&a), a.clone());
        prop_assert_eq!(a.combine(&blank), a);
    }

    #[test]
    fn prop_combine_is_right_biased(a in style(), b in style()) {
        let combined = a.combine(&b);
        for attr in Attribute::ALL {
            let expected = b.get(attr).or_else(|| a.get(attr));
            prop_assert_eq!(combined.get(attr), expected);
        }
        prop_assert_eq!(combined.color, b.color.clone().or(a.color.clone()));
        prop_assert_eq!(combined.bgcolor, b.bgcolor.clone().or(a.bgcolor.clone()));
    }

    #[test]
    fn prop_display_round_trips_through_parse(a in style()) {
        let reparsed = Style::parse(&a.to_string()).unwrap();
        prop_assert_eq!(reparsed.attributes(), a.attributes());
        prop_assert_eq!(reparsed.set_attributes(), a.set_attributes());
        prop_assert_eq!(reparsed.link, a.link);
        prop_assert_eq!(reparsed.color, a.color);
        prop_assert_eq!(reparsed.bgcolor, a.bgcolor);
    }
}

// ============================================================================
// Color
// ============================================================================

proptest! {
    #[test]
    fn prop_downgrade_is_idempotent(
        c in color(),
        system in prop_oneof![
            Just(ColorSystem::Standard),
            Just(ColorSystem::EightBit),
            Just(ColorSystem::TrueColor),
            Just(ColorSystem::Windows),
        ],
    ) {
        let once = c.downgrade(system);
        prop_assert_eq!(once.downgrade(system), once.clone());
        prop_assert_eq!(c.downgrade_uncached(system), once);
    }

    #[test]
    fn prop_truecolor_downgrades_to_eight_bit(r: u8, g: u8, b: u8) {
        let downgraded = Color::from_rgb(r, g, b).downgrade(ColorSystem::EightBit);
        prop_assert_eq!(downgraded.color_type, ColorType::EightBit);
        prop_assert!(downgraded.number.is_some_and(|n| n >= 16));
    }

    #[test]
    fn prop_hex_parses_to_triplet(r: u8, g: u8, b: u8) {
        let color = Color::parse(&format!("#{r:02X}{g:02x}{b:02x}")).unwrap();
        prop_assert_eq!(color.color_type, ColorType::TrueColor);
        prop_assert_eq!(color.triplet.map(|t| (t.red, t.green, t.blue)), Some((r, g, b)));
    }
}

// ============================================================================
// Cells and segments
// ============================================================================

proptest! {
    #[test]
    fn prop_cached_width_matches_uncached(s in mixed_text()) {
        prop_assert_eq!(cell_len(&s), cell_len_uncached(&s));
    }

    #[test]
    fn prop_split_cells_widths(s in mixed_text(), cut in 0usize..40) {
        let seg = Segment::plain(s.clone());
        let total = seg.cell_length();
        let (left, right) = seg.split_cells(cut);

        prop_assert_eq!(left.cell_length(), cut.min(total));
        prop_assert_eq!(left.cell_length() + right.cell_length(), total);

        // Only a straddled wide glyph may be replaced, by two spaces.
        let joined = format!("{}{}", left.text(), right.text());
        if joined != s {
            prop_assert_eq!(joined.chars().count() + 1, s.chars().count() + 2);
        }
    }

    #[test]
    fn prop_simplify_preserves_text(parts in prop::collection::vec(("[a-z]{0,4}", any::<bool>()), 0..10)) {
        let segments: Vec<Segment> = parts
            .iter()
            .map(|(text, bold)| Segment::new(text.clone(), bold.then(|| Style::new().bold())))
            .collect();
        let plain = segment::render_plain(&segments);
        let simplified = segment::simplify(segments);
        prop_assert_eq!(segment::render_plain(&simplified), plain);
        for pair in simplified.windows(2) {
            prop_assert_ne!(pair[0].style(), pair[1].style());
        }
    }

    #[test]
    fn prop_render_strips_back_to_plain(
        parts in prop::collection::vec(("[a-z ]{0,5}", prop::option::of(style())), 0..8),
    ) {
        let segments: Vec<Segment> = parts
            .into_iter()
            .map(|(text, style)| Segment::new(text, style))
            .collect();
        let rendered = segment::render(&segments, ColorSystem::TrueColor);
        prop_assert_eq!(strip_sgr(&rendered), segment::render_plain(&segments));

        let opened = rendered.matches("\x1b[").count() - rendered.matches("\x1b[0m").count();
        let resets = rendered.matches("\x1b[0m").count();
        prop_assert_eq!(opened, resets);
    }
}

// ============================================================================
// Text
// ============================================================================

proptest! {
    #[test]
    fn prop_wrap_respects_width(
        words in prop::collection::vec("[a-z]{1,8}", 1..12),
        width in 8usize..30,
    ) {
        let plain = words.join(" ");
        let lines = Text::new(plain.clone()).wrap(width);
        for line in &lines {
            prop_assert!(line.cell_len() <= width, "{:?} wider than {}", line.plain(), width);
            prop_assert!(!line.plain().starts_with(' '));
        }
        let rejoined = lines.iter().map(Text::plain).collect::<Vec<_>>().join(" ");
        prop_assert_eq!(rejoined, plain);
    }

    #[test]
    fn prop_wrap_keeps_words_across_space_runs_and_newlines(
        parts in prop::collection::vec(
            ("[a-z]{1,8}", prop_oneof![" {1,3}", Just("\n".to_string())]),
            1..14,
        ),
        width in 8usize..30,
    ) {
        let mut plain = String::new();
        for (i, (word, separator)) in parts.iter().enumerate() {
            if i > 0 {
                plain.push_str(separator);
            }
            plain.push_str(word);
        }
        let lines = Text::new(plain.clone()).wrap(width);

        for line in &lines {
            prop_assert!(line.cell_len() <= width, "{:?} wider than {}", line.plain(), width);
            prop_assert!(!line.plain().starts_with(' '), "{:?}", line.plain());
            prop_assert!(!line.plain().contains('\n'));
        }

        let words: Vec<&str> = plain.split_whitespace().collect();
        let wrapped: Vec<&str> = lines.iter().flat_map(|line| line.plain().split_whitespace()).collect();
        prop_assert_eq!(wrapped, words);

        let hard_lines: Vec<&str> = plain.split('\n').collect();
        prop_assert!(lines.len() >= hard_lines.len());
        if hard_lines.iter().all(|line| cell_len(line) <= width) {
            let plains: Vec<&str> = lines.iter().map(Text::plain).collect();
            prop_assert_eq!(plains, hard_lines);
        }
    }

    #[test]
    fn prop_segments_cover_plain_text(
        s in "[a-z ]{0,20}",
        spans in prop::collection::vec((0usize..25, 0usize..25, any::<bool>()), 0..6),
    ) {
        let mut text = Text::new(s.clone());
        for (start, end, bold) in spans {
            let style = if bold { Style::new().bold() } else { Style::new().italic() };
            text.stylize(start, end, style);
        }
        let segments = text.to_segments();
        prop_assert_eq!(segment::render_plain(&segments), s);
        prop_assert!(segments.iter().all(|seg| !seg.is_empty()));
    }

    #[test]
    fn prop_slice_length(s in mixed_text(), start in 0usize..30, end in 0usize..30) {
        let text = Text::new(s);
        let slice = text.slice(start, end);
        let expected = end.min(text.len()).saturating_sub(start.min(end.min(text.len())));
        prop_assert_eq!(slice.len(), expected);
    }
}
