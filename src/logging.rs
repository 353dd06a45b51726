//! Styled stderr logger for the `log` crate.
//!
//! Library code only uses the `log` macros; the binary installs [`Logger`]
//! to print them as
//!
//! ```text
//! 14:02:11 WARN     doctalk::session request #1 failed: API error 500
//! ```

use std::io::Write;
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use time::{OffsetDateTime, format_description::OwnedFormatItem};

use crate::color::ColorSystem;
use crate::style::Style;
use crate::sync::lock_recover;

const DEFAULT_TIME_FORMAT: &str = "[hour]:[minute]:[second]";

/// Logger writing styled records to stderr.
///
/// `omit_repeated_times` blanks the timestamp when it equals the previous
/// record's, which keeps bursts of records readable.
pub struct Logger {
    level: LevelFilter,
    color_system: Option<ColorSystem>,
    show_time: bool,
    omit_repeated_times: bool,
    show_target: bool,
    time_format: OwnedFormatItem,
    last_time: Mutex<Option<String>>,
}

impl Logger {
    /// Create a logger at `Warn` level with no colors.
    #[must_use]
    pub fn new() -> Self {
        let time_format = time::format_description::parse_owned::<2>(DEFAULT_TIME_FORMAT)
            .unwrap_or_else(|_| OwnedFormatItem::Literal(Vec::<u8>::new().into_boxed_slice()));
        Self {
            level: LevelFilter::Warn,
            color_system: None,
            show_time: true,
            omit_repeated_times: true,
            show_target: true,
            time_format,
            last_time: Mutex::new(None),
        }
    }

    /// Set the minimum log level.
    #[must_use]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Paint level badges with this color system (`None` for plain).
    #[must_use]
    pub fn color_system(mut self, color_system: Option<ColorSystem>) -> Self {
        self.color_system = color_system;
        self
    }

    /// Enable or disable timestamps.
    #[must_use]
    pub fn show_time(mut self, show: bool) -> Self {
        self.show_time = show;
        self
    }

    /// Omit repeated timestamps.
    #[must_use]
    pub fn omit_repeated_times(mut self, omit: bool) -> Self {
        self.omit_repeated_times = omit;
        self
    }

    /// Enable or disable the record target column.
    #[must_use]
    pub fn show_target(mut self, show: bool) -> Self {
        self.show_target = show;
        self
    }

    /// Override time format (`time` crate format description).
    ///
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
    /// Fails if another logger is already installed.
    pub fn init(self) -> Result<(), SetLoggerError> {
        log::set_max_level(self.level);
        log::set_boxed_logger(Box::new(self))
    }

    fn format_time(&self) -> String {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        now.format(&self.time_format).unwrap_or_else(|_| now.to_string())
    }

    fn level_style(level: Level) -> Style {
        let name = match level {
            Level::Trace => "dim",
            Level::Debug => "blue dim",
            Level::Info => "green",
            Level::Warn => "yellow",
            Level::Error => "bold red",
        };
        Style::parse(name).unwrap_or_default()
    }

    fn paint(&self, text: &str, style: &Style) -> String {
        match self.color_system {
            Some(system) => style.render(text, system),
            None => text.to_string(),
        }
    }

    fn format_record(&self, record: &Record<'_>) -> String {
        let mut line = String::new();

        if self.show_time {
            let time_str = self.format_time();
            if self.omit_repeated_times {
                let mut last = lock_recover(&self.last_time);
                if last.as_deref() == Some(time_str.as_str()) {
                    line.push_str(&" ".repeat(time_str.len()));
                } else {
                    line.push_str(&time_str);
                    *last = Some(time_str);
                }
            } else {
                line.push_str(&time_str);
            }
            line.push(' ');
        }

        let padded = format!("{:<8}", record.level());
        line.push_str(&self.paint(&padded, &Self::level_style(record.level())));
        line.push(' ');

        if self.show_target {
            let target = self.paint(record.target(), &Style::new().dim());
            line.push_str(&target);
            line.push(' ');
        }

        line.push_str(&record.args().to_string());
        line
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_record(record);
        let _ = writeln!(std::io::stderr().lock(), "{line}");
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Parse a `--log-level` value.
///
/// # Errors
///
/// Returns a message naming the accepted values.
pub fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.trim().parse::<LevelFilter>().map_err(|_| {
        format!("Invalid log level `{raw}` (expected off, error, warn, info, debug or trace).")
    })
}
