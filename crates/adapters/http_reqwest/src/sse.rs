//! Server-sent event stream (`/api/stream`).
//!
//! Frames are separated by a blank line. Each `data:` line contributes one
//! line of payload; comment lines (`:`) and the `event`, `id` and `retry`
//! fields are ignored.

use futures_util::{StreamExt, stream};
use reqwest::header::{ACCEPT, HeaderValue};
use url::Url;

use homesync_app::ports::{EventSource, FrameStream};
use homesync_domain::error::HomeSyncError;

use crate::client::{HubClient, ensure_success};
use crate::error::HttpError;

const EVENT_STREAM: &str = "text/event-stream";

/// Largest frame the decoder buffers before giving up on it.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Incremental decoder turning raw body chunks into frame payloads.
///
/// A frame longer than the limit is dropped up to its terminating blank
/// line; decoding resumes with the next frame.
#[derive(Debug)]
pub struct SseFrameDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already searched for a separator.
    scanned: usize,
    /// Inside an oversized frame whose head was already dropped.
    discarding: bool,
    max_frame_len: usize,
}

impl Default for SseFrameDecoder {
    fn default() -> Self {
        Self::with_max_frame_len(MAX_FRAME_LEN)
    }
}

impl SseFrameDecoder {
    #[must_use]
    pub fn with_max_frame_len(max_frame_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            scanned: 0,
            discarding: false,
            max_frame_len,
        }
    }

    /// Feed one chunk, returning the payloads of every frame it completes.
    ///
    /// Chunks may split frames, lines and UTF-8 sequences anywhere.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();
        while let Some((end, separator)) = self.next_boundary() {
            let block: Vec<u8> = self.buffer.drain(..end + separator).collect();
            self.scanned = 0;
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            if let Some(payload) = parse_block(&String::from_utf8_lossy(&block[..end])) {
                frames.push(payload);
            }
        }
        if self.buffer.len() > self.max_frame_len {
            tracing::warn!(
                buffered = self.buffer.len(),
                limit = self.max_frame_len,
                "dropping oversized event frame"
            );
            self.buffer.clear();
            self.scanned = 0;
            self.discarding = true;
        }
        frames
    }

    fn next_boundary(&mut self) -> Option<(usize, usize)> {
        // a separator may straddle the end of the previous scan
        let from = self.scanned.saturating_sub(3);
        match find_boundary(&self.buffer[from..]) {
            Some((at, len)) => Some((from + at, len)),
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }
}

/// Position and length of the first blank-line separator.
fn find_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buffer, b"\n\n").map(|at| (at, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|at| (at, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn parse_block(block: &str) -> Option<String> {
    let data: Vec<&str> = block
        .lines()
        .filter(|line| !line.starts_with(':'))
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();
    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

/// [`EventSource`] reading the hub's server-sent event stream.
#[derive(Debug, Clone)]
pub struct SseEventSource {
    http: reqwest::Client,
    base_url: Url,
}

impl SseEventSource {
    pub(crate) fn new(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }
}

impl EventSource for SseEventSource {
    async fn connect(&self) -> Result<FrameStream, HomeSyncError> {
        let url = HubClient::api_url(&self.base_url, "stream")?;
        tracing::debug!(%url, "opening event stream");
        // Streams stay open indefinitely, so no overall request timeout applies.
        let response = self
            .http
            .get(url)
            .header(ACCEPT, HeaderValue::from_static(EVENT_STREAM))
            .timeout(std::time::Duration::MAX)
            .send()
            .await
            .map_err(HttpError::from)?;
        let response = ensure_success(response).await?;

        let mut decoder = SseFrameDecoder::default();
        let frames = response
            .bytes_stream()
            .map(move |chunk| chunk.map(|bytes| decoder.push(&bytes)))
            .flat_map(|chunk| {
                let items: Vec<Result<String, HomeSyncError>> = match chunk {
                    Ok(frames) => frames.into_iter().map(Ok).collect(),
                    Err(err) => vec![Err(HttpError::from(err).into())],
                };
                stream::iter(items)
            });
        Ok(Box::pin(frames))
    }
}
