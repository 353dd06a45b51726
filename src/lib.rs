//! # doctalk
//!
//! Span rendering for annotated clinical text.
//!
//! An annotation service returns character ranges ("spans") over a note,
//! each tagged with a category and optional metadata. This crate turns the
//! note plus its spans into an ordered list of [`Segment`]s that covers the
//! text exactly once, each either plain or highlighted with a category
//! color and tooltip.
//!
//! ## Quick Start
//!
//! ```rust
//! use doctalk::prelude::*;
//!
//! let text = "Troponin was checked.";
//! let spans = vec![Span::new(0, 7, "test").canonical("Troponin I")];
//! let segments = render(text, &spans);
//!
//! assert_eq!(segments.len(), 2);
//! assert_eq!(segments[0].text, "Troponin");
//! assert_eq!(plain_text(&segments), text);
//! ```
//!
//! ## Core Concepts
//!
//! - **Span**: an annotation over inclusive character offsets
//! - **Segment**: a run of text, plain or highlighted
//! - **Category**: the closed set of annotation kinds and their colors
//! - **Session**: text, spans and request state for one user
//! - **`DetectClient`**: the HTTP client for the annotation API (`client`
//!   feature)

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod category;
pub mod cells;
pub mod color;
pub mod config;
pub mod export;
pub mod logging;
pub mod render;
pub mod segment;
pub mod session;
pub mod span;
pub mod style;
pub mod sync;
pub mod terminal;
pub mod tooltip;

#[cfg(feature = "client")]
pub mod client;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::category::{Category, CategoryStyle, DEFAULT_STYLE, style_for};
    pub use crate::color::{Color, ColorSystem, ColorTriplet};
    pub use crate::config::Config;
    pub use crate::export::{OutputFormat, to_ansi, to_html, to_json};
    pub use crate::render::render;
    pub use crate::segment::{Highlight, Segment, plain_text};
    pub use crate::session::{API_ERROR_MESSAGE, RequestOutcome, SAMPLE_TEXT, Session};
    pub use crate::span::{Span, spans_from_value};
    pub use crate::style::Style;
    pub use crate::tooltip::format_tooltip;

    #[cfg(feature = "client")]
    pub use crate::client::{ApiError, DetectClient};
}

// Re-export key types at crate root
pub use category::Category;
pub use config::{Config, ConfigError};
pub use render::render;
pub use segment::{Highlight, Segment};
pub use session::Session;
pub use span::Span;

#[cfg(feature = "client")]
pub use client::{ApiError, DetectClient};
