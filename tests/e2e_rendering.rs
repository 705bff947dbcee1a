//! End-to-end rendering tests: style definitions in, escape sequences out.
//!
//! Escapes are shown as `\e` in snapshots.

use rich_core::prelude::*;
use rich_core::segment::{self, get_shape, split_and_crop_lines};
use rich_core::StyleParseError;

fn visible(rendered: &str) -> String {
    rendered.replace('\x1b', "\\e")
}

fn render_lines(lines: &[Text], system: ColorSystem) -> String {
    let ctx = RenderContext::new().color_system(system);
    lines
        .iter()
        .map(|line| visible(&ctx.render_text(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_one_style_across_tiers() {
    let style = Style::parse("bold #ff8800 on grey50").unwrap();
    let output = [ColorSystem::TrueColor, ColorSystem::EightBit, ColorSystem::Standard]
        .map(|system| format!("{system}: {}", visible(&style.render(system))))
        .join("\n");

    insta::assert_snapshot!(output, @r"
    truecolor: \e[1;38;2;255;136;0;48;5;244m
    256: \e[1;38;5;208;48;5;244m
    standard: \e[1;33;100m
    ");
}

#[test]
fn test_windows_tier_uses_console_palette() {
    let red = Style::parse("#ff0000").unwrap();
    assert_eq!(red.render(ColorSystem::Windows), "\x1b[31m");
}

#[test]
fn test_standard_colors_follow_the_theme_at_truecolor() {
    let style = Style::parse("red on default").unwrap();
    let xterm = RenderContext::new().render(&[Segment::styled("x", style.clone())]);
    let monokai = RenderContext::new()
        .theme(rich_core::terminal_theme::MONOKAI)
        .render(&[Segment::styled("x", style)]);

    insta::assert_snapshot!(visible(&xterm), @r"\e[38;2;128;0;0;49mx\e[0m");
    insta::assert_snapshot!(visible(&monokai), @r"\e[38;2;244;0;95;49mx\e[0m");
}

#[test]
fn test_wrapped_and_justified_paragraph() {
    let mut text = Text::new("The quick brown fox jumps over the lazy dog");
    text.stylize(4, 9, "bold");
    text.stylize(16, 19, "red");
    text.justify = JustifyMethod::Full;

    let lines = text.wrap(12);
    assert!(lines.iter().all(|line| line.cell_len() <= 12));

    insta::assert_snapshot!(render_lines(&lines, ColorSystem::Standard), @r"
    The    \e[1mquick\e[0m
    brown    \e[31mfox\e[0m
    jumps   over
    the lazy dog
    ");
}

#[test]
fn test_overlapping_spans_layer_in_attach_order() {
    let mut text = Text::new("abcdef");
    text.stylize(0, 4, "red");
    text.stylize(2, 6, "bold blue");

    let ctx = RenderContext::new().color_system(ColorSystem::Standard);
    insta::assert_snapshot!(
        visible(&ctx.render_text(&text)),
        @r"\e[31mab\e[0m\e[1;34mcdef\e[0m"
    );
}

#[test]
fn test_crop_lines_with_wide_glyphs() {
    let segments = vec![
        Segment::styled("Name: ", Style::new().bold()),
        Segment::styled("日本語テキスト\nok", Style::parse("red").unwrap()),
        Segment::plain("\n"),
    ];
    let lines = split_and_crop_lines(segments, 8, None, false, false);
    assert_eq!(get_shape(&lines), (8, 2));

    let output = lines
        .iter()
        .map(|line| visible(&segment::render(line, ColorSystem::Standard)))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(output, @r"
    \e[1mName: \e[0m\e[31m日\e[0m
    \e[31mok\e[0m
    ");
}

#[test]
fn test_controls_do_not_disturb_style_state() {
    let bold = Style::new().bold();
    let segments = [
        Segment::control(vec![ControlCode::new(ControlType::HideCursor)]),
        Segment::styled("x", bold.clone()),
        Segment::control(vec![ControlCode::with_params(ControlType::CursorMoveTo, [2, 3])]),
        Segment::styled("y", bold),
    ];
    let rendered = segment::render(&segments, ColorSystem::Standard);
    insta::assert_snapshot!(visible(&rendered), @r"\e[?25l\e[1mx\e[4;3Hy\e[0m");
}

#[test]
fn test_no_color_context_strips_styles() {
    let mut text = Text::new("status:\tok");
    text.highlight_words(&["ok"], &Style::parse("bold green").unwrap(), true)
        .unwrap();
    let ctx = RenderContext::new().no_color().tab_size(4);
    assert_eq!(ctx.render_text(&text), "status: ok");
}

#[test_log::test]
fn test_lenient_and_strict_parsing() {
    let lenient = Style::parse("bold sparkly red").unwrap();
    assert_eq!(lenient, Style::parse("bold red").unwrap());

    let strict = Style::parse_strict("bold sparkly red").unwrap_err();
    assert_eq!(strict, StyleParseError::UnknownToken("sparkly".to_string()));
    assert_eq!(strict.to_string(), "Unknown style token: \"sparkly\"");

    assert!(matches!(
        Style::parse("bold on"),
        Err(StyleParseError::InvalidFormat(_))
    ));
}

#[test_log::test]
fn test_unparseable_span_style_leaves_text_unstyled() {
    let mut text = Text::new("plain");
    text.stylize_all("on");
    assert!(text.spans().is_empty());
    assert_eq!(RenderContext::new().render_text(&text), "plain");
}
