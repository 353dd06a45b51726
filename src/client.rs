//! HTTP client for the annotation API's detect endpoint.
//!
//! One `POST {api_url}/api/v1/detect` per call, no retries. Non-2xx
//! statuses and transport failures are errors; a 2xx body without a usable
//! `spans` array is not (it means nothing was detected).

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::session::{RequestOutcome, Session};
use crate::span::{Span, spans_from_value};

/// Characters of an error body kept for logs.
const BODY_PREVIEW_CHARS: usize = 300;

/// Request body of the detect endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectRequest<'a> {
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_uuid: Option<&'a str>,
}

/// Client for the detect endpoint.
#[derive(Debug, Clone)]
pub struct DetectClient {
    http: reqwest::Client,
    url: String,
    doc_uuid: Option<String>,
}

impl DetectClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            url: config.detect_url(),
            doc_uuid: config.doc_uuid.clone(),
        })
    }

    /// Endpoint this client posts to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `text` for annotation and return the detected spans.
    ///
    /// # Errors
    ///
    /// - `ApiError::Transport` if the request could not be completed
    /// - `ApiError::Status` for a non-2xx response
    /// - `ApiError::Decode` if a 2xx body is not JSON
    pub async fn detect(&self, text: &str) -> Result<Vec<Span>, ApiError> {
        let request = DetectRequest {
            text,
            doc_uuid: self.doc_uuid.as_deref(),
        };

        let resp = self.http.post(&self.url).json(&request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        log::debug!("POST {} -> {} ({} bytes)", self.url, status.as_u16(), body.len());

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: body.chars().take(BODY_PREVIEW_CHARS).collect(),
            });
        }

        let value: Value = serde_json::from_str(&body)?;
        Ok(spans_from_value(&value))
    }

    /// Run one explain round-trip for `session`.
    ///
    /// Returns `None` without sending anything when the session cannot
    /// explain right now (blank text or a request already in flight).
    pub async fn explain(&self, session: &mut Session) -> Option<RequestOutcome> {
        if !session.can_explain() {
            return None;
        }
        let ticket = session.begin_request();
        let result = self.detect(ticket.text()).await;
        Some(session.finish_request(ticket, result))
    }
}

/// Error type for detect requests.
#[derive(Debug)]
pub enum ApiError {
    /// Connection, timeout or client construction failure.
    Transport(reqwest::Error),
    /// The API answered with a non-2xx status.
    Status { status: u16, body: String },
    /// The API answered 2xx with a body that is not JSON.
    Decode(serde_json::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Request failed: {e}"),
            Self::Status { status, body } if body.is_empty() => write!(f, "API error {status}"),
            Self::Status { status, body } => write!(f, "API error {status}: {body}"),
            Self::Decode(e) => write!(f, "Invalid response body: {e}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}
