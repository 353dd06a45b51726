//! Output formats for rendered segments.
//!
//! - ANSI: highlights painted with their swatch, downgraded to the terminal's
//!   color system (or left unstyled when there is none).
//! - HTML: `<span>` for plain runs and `<mark title=..>` for highlights.
//! - JSON: the serialized segment list.
//! - Plain: the text itself.

use std::fmt;
use std::str::FromStr;

use crate::category::{self, Category, CategoryStyle};
use crate::cells::cell_len;
use crate::color::ColorSystem;
use crate::segment::Segment;

/// Inline CSS shared by every `<mark>`, after the swatch colors.
const MARK_LAYOUT_CSS: &str = "padding: 0 2px; border-radius: 4px";

/// Selects how segments are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Terminal escape codes.
    #[default]
    Ansi,
    /// Text only, no markup.
    Plain,
    /// HTML fragment.
    Html,
    /// JSON array of segments.
    Json,
}

impl OutputFormat {
    /// Name accepted on the command line.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ansi => "ansi",
            Self::Plain => "plain",
            Self::Html => "html",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ansi" | "terminal" => Ok(Self::Ansi),
            "plain" | "text" => Ok(Self::Plain),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "Unknown format `{other}` (expected ansi, plain, html or json)."
            )),
        }
    }
}

/// Write segments with ANSI styling.
///
/// With `color_system` of `None` the text is written unstyled.
#[must_use]
pub fn to_ansi(segments: &[Segment<'_>], color_system: Option<ColorSystem>) -> String {
    let mut out = String::new();
    for segment in segments {
        match (&segment.highlight, color_system) {
            (Some(highlight), Some(system)) => {
                out.push_str(&highlight.style.to_style().render(segment.text, system));
            }
            _ => out.push_str(segment.text),
        }
    }
    out
}

/// Write segments as an HTML fragment.
#[must_use]
pub fn to_html(segments: &[Segment<'_>]) -> String {
    let mut out = String::new();
    for segment in segments {
        let text = html_escape(segment.text);
        match &segment.highlight {
            Some(highlight) => {
                out.push_str(&format!(
                    "<mark style=\"{}\" title=\"{}\">{text}</mark>",
                    mark_css(&highlight.style),
                    html_escape(&highlight.tooltip),
                ));
            }
            None => out.push_str(&format!("<span>{text}</span>")),
        }
    }
    out
}

/// Write segments as a JSON array.
///
/// # Errors
///
/// Returns the serializer error; segment types are plain data so this only
/// happens on writer failures inside `serde_json`.
pub fn to_json(segments: &[Segment<'_>]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(segments)
}

/// Write segments in the requested format.
///
/// # Errors
///
/// Only the JSON format can fail, see [`to_json`].
pub fn write_segments(
    segments: &[Segment<'_>],
    format: OutputFormat,
    color_system: Option<ColorSystem>,
) -> Result<String, serde_json::Error> {
    Ok(match format {
        OutputFormat::Ansi => to_ansi(segments, color_system),
        OutputFormat::Plain => segments.iter().map(|s| s.text).collect(),
        OutputFormat::Html => to_html(segments),
        OutputFormat::Json => to_json(segments)?,
    })
}

/// Category legend for the terminal, wrapped to `width` cells.
///
/// Each entry is a two-cell swatch followed by the category name.
#[must_use]
pub fn legend_ansi(color_system: Option<ColorSystem>, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_width = 0;

    for (category, style) in category::legend() {
        let label = category.label();
        let entry_width = 2 + 1 + cell_len(label);
        let swatch = match color_system {
            Some(system) => style.to_style().render("  ", system),
            None => "[]".to_string(),
        };

        if line_width > 0 && line_width + 2 + entry_width > width {
            lines.push(std::mem::take(&mut line));
            line_width = 0;
        }
        if line_width > 0 {
            line.push_str("  ");
            line_width += 2;
        }
        line.push_str(&swatch);
        line.push(' ');
        line.push_str(label);
        line_width += entry_width;
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// Category legend as an HTML fragment.
#[must_use]
pub fn legend_html() -> String {
    category::legend()
        .map(|(category, style): (Category, CategoryStyle)| {
            format!(
                "<span class=\"legend\"><span style=\"display: inline-block; width: 12px; height: 12px; border-radius: 4px; background: {}; border: 1px solid #222\"></span> <small>{}</small></span>",
                style.background.hex(),
                category.label(),
            )
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn mark_css(style: &CategoryStyle) -> String {
    format!("{}; {MARK_LAYOUT_CSS}", style.to_style().css())
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
