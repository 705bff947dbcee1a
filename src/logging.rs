//! A `log` backend that formats records as styled text.
//!
//! Each record becomes one line: an optional timestamp column, the padded
//! level name, the message with keywords highlighted, and optionally the
//! source location. The line is built as a [`Text`], lowered to segments and
//! serialized with the logger's [`RenderContext`], so the same color tier and
//! theme rules apply as for any other output.
//!
//! Optional tracing integration is available via [`StyledTracingLayer`] when
//! the `tracing` feature is enabled.

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::OffsetDateTime;
use time::format_description::OwnedFormatItem;

use crate::color::Color;
use crate::context::RenderContext;
use crate::style::Style;
use crate::sync::lock_recover;
use crate::text::Text;

const DEFAULT_KEYWORDS: [&str; 8] = [
    "GET", "POST", "HEAD", "PUT", "DELETE", "OPTIONS", "TRACE", "PATCH",
];

const DEFAULT_TIME_FORMAT: &str = "[hour]:[minute]:[second]";

/// Styled logger for the `log` crate.
///
/// Output goes to any `Write + Send` sink. The sink and the last printed
/// timestamp are each behind a mutex, so concurrent records never interleave
/// within a line.
pub struct StyledLogger {
    sink: Mutex<Box<dyn Write + Send>>,
    context: RenderContext,
    level: LevelFilter,
    show_time: bool,
    omit_repeated_times: bool,
    show_level: bool,
    show_path: bool,
    keywords: Vec<String>,
    keyword_style: Style,
    time_format: OwnedFormatItem,
    last_time: Mutex<Option<String>>,
}

impl StyledLogger {
    /// Create a logger writing to `sink` with default settings.
    #[must_use]
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        let time_format = time::format_description::parse_owned::<2>(DEFAULT_TIME_FORMAT)
            .unwrap_or_else(|_| OwnedFormatItem::Compound(Box::default()));
        Self {
            sink: Mutex::new(Box::new(sink)),
            context: RenderContext::new(),
            level: LevelFilter::Info,
            show_time: true,
            omit_repeated_times: true,
            show_level: true,
            show_path: false,
            keywords: DEFAULT_KEYWORDS.iter().map(ToString::to_string).collect(),
            keyword_style: Style::new().bold().color(Color::from_ansi(3)),
            time_format,
            last_time: Mutex::new(None),
        }
    }

    /// Create a logger writing to standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Set the color tier, theme and cache used to serialize lines.
    #[must_use]
    pub fn context(mut self, context: RenderContext) -> Self {
        self.context = context;
        self
    }

    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    /// Blank out a timestamp identical to the previous one.
    #[must_use]
    pub fn omit_repeated_times(mut self, omit: bool) -> Self {
        self.omit_repeated_times = omit;
        self
    }

    #[must_use]
    pub fn show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    /// Append `file:line` to each record that carries a location.
    #[must_use]
    pub fn show_path(mut self, show: bool) -> Self {
        self.show_path = show;
        self
    }

    /// Replace the highlighted keyword list.
    #[must_use]
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    #[must_use]
    pub fn keyword_style(mut self, style: Style) -> Self {
        self.keyword_style = style;
        self
    }

    /// Set the timestamp format (`time` format description, version 2).
    /// An invalid description keeps the current format.
    #[must_use]
    pub fn time_format(mut self, format: &str) -> Self {
        if let Ok(parsed) = time::format_description::parse_owned::<2>(format) {
            self.time_format = parsed;
        }
        self
    }

    /// Install as the global logger.
    ///
    /// # Errors
    ///
    /// Fails if a global logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_max_level(self.level);
        log::set_boxed_logger(Box::new(self))
    }

    fn now(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.time_format)
            .unwrap_or_else(|_| now.to_string())
    }

    fn time_column(&self, time: String) -> String {
        if !self.omit_repeated_times {
            return time;
        }
        let mut last = lock_recover(&self.last_time);
        if last.as_deref() == Some(time.as_str()) {
            " ".repeat(time.chars().count())
        } else {
            *last = Some(time.clone());
            time
        }
    }

    fn level_style(level: Level) -> Style {
        match level {
            Level::Trace => Style::new().dim(),
            Level::Debug => Style::new().dim().color(Color::from_ansi(4)),
            Level::Info => Style::new().color(Color::from_ansi(2)),
            Level::Warn => Style::new().color(Color::from_ansi(3)),
            Level::Error => Style::new().bold().color(Color::from_ansi(1)),
        }
    }

    fn format_record(&self, record: &Record<'_>) -> Text {
        let mut line = Text::new("");

        if self.show_time {
            let time = self.time_column(self.now());
            line.append_styled(&time, Style::new().dim());
            line.append(" ");
        }

        if self.show_level {
            let padded = format!("{:<8}", record.level());
            line.append_styled(&padded, Self::level_style(record.level()));
            line.append(" ");
        }

        let mut message = Text::new(record.args().to_string());
        if !self.keywords.is_empty() {
            let keywords: Vec<&str> = self.keywords.iter().map(String::as_str).collect();
            let _ = message.highlight_words(&keywords, &self.keyword_style, false);
        }
        line.append_text(&message);

        if self.show_path
            && let Some(file) = record.file()
        {
            let location = match record.line() {
                Some(number) => format!(" {file}:{number}"),
                None => format!(" {file}"),
            };
            line.append_styled(&location, Style::new().dim());
        }

        line
    }

    fn emit(&self, record: &Record<'_>) {
        let text = self.format_record(record);
        let mut rendered = self.context.render_text(&text);
        rendered.push('\n');

        let mut sink = lock_recover(&self.sink);
        // a failing sink cannot be reported through the logger itself
        let _ = sink.write_all(rendered.as_bytes());
    }
}

impl fmt::Debug for StyledLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyledLogger")
            .field("context", &self.context)
            .field("level", &self.level)
            .field("show_time", &self.show_time)
            .field("show_level", &self.show_level)
            .field("show_path", &self.show_path)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

impl Log for StyledLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            self.emit(record);
        }
    }

    fn flush(&self) {
        let _ = lock_recover(&self.sink).flush();
    }
}

#[cfg(feature = "tracing")]
pub use tracing_integration::StyledTracingLayer;

#[cfg(feature = "tracing")]
mod tracing_integration {
    use super::StyledLogger;
    use log::{Level, Log};
    use std::fmt::Debug;

    use tracing::field::{Field, Visit};
    use tracing::{Event, Level as TracingLevel, Subscriber};
    use tracing_subscriber::{Layer, layer::Context};

    /// Tracing layer that formats events with a [`StyledLogger`].
    #[derive(Debug)]
    pub struct StyledTracingLayer {
        logger: StyledLogger,
    }

    impl StyledTracingLayer {
        #[must_use]
        pub fn new(logger: StyledLogger) -> Self {
            Self { logger }
        }

        /// Install as the global tracing subscriber.
        ///
        /// # Errors
        ///
        /// Fails if a global subscriber is already set.
        pub fn init(self) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
            use tracing_subscriber::prelude::*;

            let subscriber = tracing_subscriber::registry().with(self);
            tracing::subscriber::set_global_default(subscriber)
        }
    }

    #[derive(Default)]
    struct EventVisitor {
        message: Option<String>,
        fields: Vec<(String, String)>,
    }

    impl EventVisitor {
        fn into_message(self) -> String {
            let mut message = self.message.unwrap_or_default();
            for (name, value) in self.fields {
                if !message.is_empty() {
                    message.push(' ');
                }
                message.push_str(&name);
                message.push('=');
                message.push_str(&value);
            }
            message
        }
    }

    impl Visit for EventVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
            let rendered = format!("{value:?}");
            let rendered = strip_quotes(&rendered).to_string();
            if field.name() == "message" {
                self.message = Some(rendered);
            } else {
                self.fields.push((field.name().to_string(), rendered));
            }
        }
    }

    impl<S> Layer<S> for StyledTracingLayer
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let metadata = event.metadata();
            let level = map_tracing_level(*metadata.level());
            if level > self.logger.level {
                return;
            }

            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);
            let message = visitor.into_message();

            self.logger.log(
                &log::Record::builder()
                    .args(format_args!("{message}"))
                    .level(level)
                    .target(metadata.target())
                    .file(metadata.file())
                    .line(metadata.line())
                    .module_path(metadata.module_path())
                    .build(),
            );
        }
    }

    fn map_tracing_level(level: TracingLevel) -> Level {
        match level {
            TracingLevel::TRACE => Level::Trace,
            TracingLevel::DEBUG => Level::Debug,
            TracingLevel::INFO => Level::Info,
            TracingLevel::WARN => Level::Warn,
            TracingLevel::ERROR => Level::Error,
        }
    }

    fn strip_quotes(value: &str) -> &str {
        value
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            .unwrap_or(value)
    }

}
