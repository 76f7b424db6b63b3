//! Sample-stream driver.
//!
//! Connects to the streaming endpoint, consumes the newline-delimited
//! JSON body, and delivers events to the coordinator one at a time, in
//! arrival order. On [`Flow::Stop`] the response stream is dropped,
//! which tears down the connection. Transport failures surface to the
//! caller; the reconnect decision (and the prompt for it) lives in the
//! binary, and a re-run against the same coordinator keeps the
//! dedup/limit state from before the disconnect.

use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::Credentials;
use crate::collector::{Coordinator, Flow};
use crate::event::{Event, Status};

/// Errors that can end one streaming connection.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The endpoint is not a parseable URL.
    #[error("invalid stream endpoint: {url}")]
    InvalidEndpoint {
        /// The offending endpoint string.
        url: String,
    },

    /// The connection could not be established.
    #[error("stream connection failed: {source}")]
    Connect {
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The service refused the stream request.
    #[error("stream rejected (HTTP {status})")]
    Rejected {
        /// The HTTP status code of the refusal.
        status: u16,
    },

    /// The established stream failed mid-flight.
    #[error("stream transport error: {source}")]
    Transport {
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// The server closed the stream before the target was reached.
    #[error("stream ended unexpectedly")]
    Disconnected,
}

/// Feeds stream events into a [`Coordinator`] until it signals stop or
/// the transport fails.
#[derive(Debug, Clone)]
pub struct StreamDriver {
    endpoint: String,
    credentials: Credentials,
    http: Client,
}

impl StreamDriver {
    /// Creates a driver for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidEndpoint`] when the endpoint is
    /// not a valid URL.
    pub fn new(
        endpoint: impl Into<String>,
        credentials: Credentials,
    ) -> Result<Self, StreamError> {
        let endpoint = endpoint.into();
        if Url::parse(&endpoint).is_err() {
            return Err(StreamError::InvalidEndpoint { url: endpoint });
        }
        Ok(Self {
            endpoint,
            credentials,
            http: Client::new(),
        })
    }

    /// Runs one streaming connection to completion.
    ///
    /// Returns `Ok(())` when the coordinator signaled stop (target
    /// reached). Any other way the stream ends is an error, and the
    /// caller decides whether to reconnect.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] describing how the connection failed.
    pub async fn run(&self, coordinator: &Arc<Coordinator>) -> Result<(), StreamError> {
        let response = self
            .http
            .get(&self.endpoint)
            .header(AUTHORIZATION, self.credentials.authorization_header())
            .send()
            .await
            .map_err(|source| StreamError::Connect { source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Rejected {
                status: status.as_u16(),
            });
        }

        info!(endpoint = %self.endpoint, "stream connected");

        let mut body = response.bytes_stream();
        let mut buffer = LineBuffer::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|source| StreamError::Transport { source })?;
            buffer.push(&chunk);

            // A chunk may carry any number of complete lines plus a
            // partial tail; dispatch the complete ones in order.
            while let Some(line) = buffer.next_line() {
                let Some(event) = parse_line(&line) else {
                    continue;
                };
                if coordinator.on_event(event) == Flow::Stop {
                    info!("target count reached; stopping stream");
                    return Ok(());
                }
            }
        }

        Err(StreamError::Disconnected)
    }
}

/// Upper bound on one buffered stream line. Statuses are a few KiB;
/// anything past this without a newline is a misbehaving server.
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Accumulates raw stream chunks and yields complete lines.
///
/// A line that exceeds [`MAX_LINE_BYTES`] before its newline arrives is
/// discarded with a warning, keeping the buffer bounded; the tail of
/// the discarded line then fails to parse and is skipped like any other
/// garbage line.
struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    fn new() -> Self {
        Self { buf: Vec::new() }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > MAX_LINE_BYTES && !self.buf.contains(&b'\n') {
            warn!(buffered = self.buf.len(), "discarding oversized stream line");
            self.buf.clear();
        }
    }

    fn next_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        Some(self.buf.drain(..=pos).collect())
    }
}

/// Parses one stream line into an event.
///
/// Returns `None` for keep-alive blank lines, non-UTF-8 data,
/// unparseable JSON, and messages without an embedded user; none of
/// these are fatal to the stream.
pub(crate) fn parse_line(line: &[u8]) -> Option<Event> {
    let Ok(text) = std::str::from_utf8(line) else {
        warn!("skipping non-UTF-8 stream line");
        return None;
    };
    let text = text.trim();
    if text.is_empty() {
        // Keep-alive newline.
        return None;
    }
    let status: Status = match serde_json::from_str(text) {
        Ok(status) => status,
        Err(error) => {
            warn!(error = %error, "skipping unparseable stream line");
            return None;
        }
    };
    let event = Event::from_status(status);
    if event.is_none() {
        debug!("skipping stream message without user");
    }
    event
}
