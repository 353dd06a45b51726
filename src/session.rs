//! Interactive session state: the current text, its spans, and the
//! request in flight.
//!
//! Every request gets a monotonically increasing sequence number. Only the
//! response to the most recently started request is applied; anything older
//! is dropped, so a slow early response can never overwrite a later one.

use std::fmt;

use crate::render::render;
use crate::segment::Segment;
use crate::span::Span;

/// Message shown when the annotation API cannot be reached or fails.
pub const API_ERROR_MESSAGE: &str =
    "Could not explain the text. Is the annotation API running and reachable?";

/// Sample note shown before the user provides any text.
pub const SAMPLE_TEXT: &str =
    "Sample note: blood pressure was recorded. Troponin was checked in the ER.";

/// Handle for one detect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    text: String,
}

impl RequestTicket {
    /// Sequence number of the request.
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// Text snapshot to send.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// What happened to a finished request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Spans were stored.
    Applied,
    /// The request failed; the error message is set.
    Failed,
    /// A newer request was started; the result was dropped.
    Stale,
}

/// Text, spans and request state for one user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    text: String,
    spans: Vec<Span>,
    loading: bool,
    error: Option<String>,
    latest_seq: u64,
}

impl Session {
    /// Create a session holding `text` and no spans.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text. Spans are kept until the next request.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Spans from the last successful request.
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Whether a request is outstanding.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// User-facing error from the last request, if it failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the explain action should be offered.
    #[must_use]
    pub fn can_explain(&self) -> bool {
        !self.loading && !self.text.trim().is_empty()
    }

    /// Start a request: clears spans and error and marks the session loading.
    ///
    /// Any earlier ticket becomes stale.
    pub fn begin_request(&mut self) -> RequestTicket {
        self.latest_seq += 1;
        self.loading = true;
        self.error = None;
        self.spans.clear();
        log::debug!("request #{} started ({} bytes)", self.latest_seq, self.text.len());
        RequestTicket {
            seq: self.latest_seq,
            text: self.text.clone(),
        }
    }

    /// Apply the result of a request.
    ///
    /// Failures are logged and replaced by [`API_ERROR_MESSAGE`]; spans stay
    /// empty. Results for stale tickets change nothing.
    pub fn finish_request<E: fmt::Display>(
        &mut self,
        ticket: RequestTicket,
        result: Result<Vec<Span>, E>,
    ) -> RequestOutcome {
        if ticket.seq != self.latest_seq {
            log::debug!(
                "dropping result of request #{} (latest is #{})",
                ticket.seq,
                self.latest_seq
            );
            return RequestOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(spans) => {
                log::info!("request #{} returned {} spans", ticket.seq, spans.len());
                self.spans = spans;
                RequestOutcome::Applied
            }
            Err(err) => {
                log::warn!("request #{} failed: {err}", ticket.seq);
                self.spans.clear();
                self.error = Some(API_ERROR_MESSAGE.to_string());
                RequestOutcome::Failed
            }
        }
    }

    /// Render the current text with the current spans.
    #[must_use]
    pub fn segments(&self) -> Vec<Segment<'_>> {
        render(&self.text, &self.spans)
    }
}
