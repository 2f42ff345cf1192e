//! Buffered response writer.
//!
//! Handlers and middleware record a status, headers and a body on a
//! [`ResponseWriter`]; the dispatcher turns it into an HTTP response with
//! [`ResponseWriter::commit`]. `commit` takes the writer by value, so a
//! response can only ever be committed once.
//!
//! A writer can also be switched to streaming mode with
//! [`ResponseWriter::upgrade_sse`]. In that mode the body is a bounded
//! channel: every Server-Sent Event is sent as its own body frame and reaches
//! the client without waiting for the handler to return. A client that stops
//! reading loses events once [`SSE_BUFFER`] frames are queued.

use std::{convert::Infallible, fmt, time::Duration};

use axum::{
    body::Body,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE, LOCATION},
    },
    response::Response,
};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};

/// Request header set by the partial-page-update client
pub const HX_REQUEST: &str = "HX-Request";

/// Response header carrying an in-band redirect for the partial-page-update client
pub const HX_REDIRECT: &str = "HX-Redirect";

/// Event name used when the caller does not give one
pub const DEFAULT_SSE_EVENT: &str = "message";

/// Frames queued per event stream before new events are dropped
pub const SSE_BUFFER: usize = 64;

/// Longest body echoed in the request trace
const MAX_LOGGED_BODY: usize = 512;

/// Errors raised while writing a response
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// The writer was not upgraded to a streaming response
    #[error("response writer does not have a flusher")]
    NotFlushable,

    /// The client went away; the stream receiver is gone
    #[error("event stream is closed")]
    StreamClosed,

    /// The client is not reading fast enough; the event was dropped
    #[error("event stream buffer is full")]
    StreamFull,
}

/// Whether the request came from the partial-page-update client
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST)
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// Frame one Server-Sent Event.
///
/// An empty event name falls back to `message`. Multi-line payloads are split
/// into one `data:` line per line.
pub fn format_sse(event: &str, data: &str) -> String {
    let event = if event.is_empty() {
        DEFAULT_SSE_EVENT
    } else {
        event
    };
    let mut frame = format!("event: {event}\n");
    for line in data.split('\n') {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// Handle to one open event stream.
///
/// Cloning it is cheap; every clone writes to the same client.
#[derive(Debug, Clone)]
pub struct SseSink {
    sender: mpsc::Sender<String>,
}

impl SseSink {
    /// Push one framed event to the client
    pub fn send(&self, event: &str, data: &str) -> Result<(), ResponseError> {
        self.sender
            .try_send(format_sse(event, data))
            .map_err(|e| match e {
                TrySendError::Full(_) => ResponseError::StreamFull,
                TrySendError::Closed(_) => ResponseError::StreamClosed,
            })
    }

    /// Resolves once the client side of the stream has been dropped
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

struct SseStream {
    sink: SseSink,
    receiver: mpsc::Receiver<String>,
}

/// Buffered response writer
pub struct ResponseWriter {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Vec<u8>,
    elapsed: Duration,
    stream: Option<SseStream>,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: None,
            headers: HeaderMap::new(),
            body: Vec::new(),
            elapsed: Duration::ZERO,
            stream: None,
        }
    }

    /// Status that will be committed (200 when nothing was written)
    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    /// Whether a status has been written explicitly
    pub fn is_written(&self) -> bool {
        self.status.is_some()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Record the handler duration, reported in the request trace
    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed = elapsed;
    }

    pub fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Write a status and a plain-text body
    pub fn write_string(&mut self, status: StatusCode, body: impl AsRef<str>) {
        let body = body.as_ref();
        if !body.is_empty() && !self.headers.contains_key(CONTENT_TYPE) {
            self.headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("text/plain; charset=utf-8"),
            );
        }
        self.write_header(status);
        self.body.extend_from_slice(body.as_bytes());
    }

    /// Serialize `value` as the JSON body.
    ///
    /// A serialization failure becomes a 400 with the error text as body.
    pub fn write_json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) {
        match serde_json::to_vec(value) {
            Ok(json) => {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.write_header(status);
                self.body.extend_from_slice(&json);
            }
            Err(e) => self.write_string(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }

    pub fn write_html(&mut self, status: StatusCode, html: impl AsRef<str>) {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
        self.write_string(status, html);
    }

    /// Redirect either in-band (`HX-Redirect` + 200) for the partial-page-update
    /// client or with `Location` + 303 for a full navigation.
    pub fn redirect(&mut self, location: &str, htmx: bool) {
        let Ok(value) = HeaderValue::from_str(location) else {
            tracing::error!("invalid redirect location: {}", location);
            self.write_string(StatusCode::INTERNAL_SERVER_ERROR, "invalid redirect location");
            return;
        };
        if htmx {
            self.headers.insert(HX_REDIRECT, value);
            self.write_header(StatusCode::OK);
        } else {
            self.headers.insert(LOCATION, value);
            self.write_header(StatusCode::SEE_OTHER);
        }
    }

    /// Switch to streaming mode.
    ///
    /// Sets the event-stream headers and a 200 status. Nothing reaches the
    /// client until the writer is committed.
    pub fn upgrade_sse(&mut self) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
        self.headers
            .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        self.headers
            .insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        self.write_header(StatusCode::OK);
        if self.stream.is_none() {
            let (sender, receiver) = mpsc::channel(SSE_BUFFER);
            self.stream = Some(SseStream {
                sink: SseSink { sender },
                receiver,
            });
        }
    }

    /// A detached handle to the event stream, if the writer was upgraded
    pub fn sink(&self) -> Option<SseSink> {
        self.stream.as_ref().map(|stream| stream.sink.clone())
    }

    /// Write one framed event straight to the stream
    pub fn write_sse(&self, event: &str, data: &str) -> Result<(), ResponseError> {
        let stream = self.stream.as_ref().ok_or(ResponseError::NotFlushable)?;
        stream.sink.send(event, data)
    }

    /// Turn the recorded response into an HTTP response.
    pub fn commit(self) -> Response {
        let status = self.status();
        let body = match self.stream {
            Some(SseStream { sink, receiver }) => {
                // the stream ends once every detached sink is dropped
                drop(sink);
                let frames = futures_util::stream::unfold(receiver, |mut receiver| async move {
                    receiver
                        .recv()
                        .await
                        .map(|frame| (Ok::<_, Infallible>(frame), receiver))
                });
                Body::from_stream(frames)
            }
            None => Body::from(self.body),
        };

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Request-trace summary: `status 200 (took 3ms)` plus the body when it is
/// short readable text (at most 512 bytes).
impl fmt::Display for ResponseWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "status {} (took {}ms)",
            self.status().as_u16(),
            self.elapsed.as_millis()
        )?;
        let loggable = !self.body.is_empty() && self.body.len() <= MAX_LOGGED_BODY;
        if self.stream.is_none() && loggable {
            if let Ok(text) = std::str::from_utf8(&self.body) {
                write!(f, "\n\tresponse: {text}")?;
            }
        }
        Ok(())
    }
}
