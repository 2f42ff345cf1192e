//! HTTP-facing errors.

use axum::http::StatusCode;
use thiserror::Error;

use super::response::ResponseWriter;

/// Failure that maps directly onto a response status and body
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{status}: {message}")]
pub struct HttpError {
    pub status: StatusCode,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 401 with an empty body
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "")
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 500 for an unexpected storage failure; the cause is logged, not returned
    pub fn database(cause: impl std::fmt::Display) -> Self {
        let message = "database operation failed";
        tracing::error!("{}: {}", message, cause);
        Self::internal(message)
    }
}

impl ResponseWriter {
    /// Write the status and message of `error`
    pub fn write_error(&mut self, error: &HttpError) {
        self.write_string(error.status, &error.message);
    }

    /// Render `error` as an out-of-band error fragment for the
    /// partial-page-update client (always 200 so the fragment is swapped in)
    pub fn display_error(&mut self, error: &HttpError) {
        let fragment = format!(
            "<div id='errors' hx-swap-oob='innerHTML'>{}</div>",
            escape_html(&error.message)
        );
        self.write_html(StatusCode::OK, fragment);
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
