//! Live activity stream.
//!
//! A background task reads the server-sent event stream and forwards each
//! decoded [`ActivityEvent`]. When the stream ends or fails, the task waits
//! a fixed delay and reconnects. Closing the stream stops the task.

use std::time::Duration;

use nebula_proto::activity::{ActivityEvent, SseDecoder};
use tokio::sync::mpsc;

use crate::error::ApiError;

/// Handle to a running activity stream.
pub struct ActivityStream {
    events: mpsc::UnboundedReceiver<ActivityEvent>,
    abort_handle: tokio::task::AbortHandle,
}

impl ActivityStream {
    /// Start streaming from `url`, reconnecting after `retry_delay`.
    pub fn spawn(http: reqwest::Client, url: String, retry_delay: Duration) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_stream(http, url, retry_delay, tx));
        Self { events, abort_handle: handle.abort_handle() }
    }

    /// Next event, if one is waiting.
    pub fn try_recv(&mut self) -> Option<ActivityEvent> {
        self.events.try_recv().ok()
    }

    /// Wait for the next event. `None` once the stream is closed.
    pub async fn recv(&mut self) -> Option<ActivityEvent> {
        self.events.recv().await
    }

    /// Stop the stream.
    pub fn close(&self) {
        self.abort_handle.abort();
    }
}

impl Drop for ActivityStream {
    fn drop(&mut self) {
        self.close();
    }
}

async fn run_stream(
    http: reqwest::Client,
    url: String,
    retry_delay: Duration,
    tx: mpsc::UnboundedSender<ActivityEvent>,
) {
    loop {
        match stream_once(&http, &url, &tx).await {
            Ok(()) => tracing::debug!(url, "activity stream ended"),
            Err(e) => tracing::warn!(url, error = %e, "activity stream failed"),
        }
        if tx.is_closed() {
            return;
        }
        tokio::time::sleep(retry_delay).await;
    }
}

async fn stream_once(
    http: &reqwest::Client,
    url: &str,
    tx: &mpsc::UnboundedSender<ActivityEvent>,
) -> Result<(), ApiError> {
    let request_failed =
        |e: reqwest::Error| ApiError::Request { url: url.to_string(), reason: e.to_string() };

    let mut response = http
        .get(url)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(request_failed)?;
    if !response.status().is_success() {
        return Err(ApiError::Status { url: url.to_string(), status: response.status().as_u16() });
    }
    tracing::info!(url, "activity stream connected");

    let mut decoder = SseDecoder::new();
    let mut pending = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(request_failed)? {
        pending.extend_from_slice(&chunk);
        let text = take_utf8(&mut pending);
        for message in decoder.feed(&text) {
            let Some(event) = message.activity() else {
                continue;
            };
            if tx.send(event).is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Remove and return the longest valid UTF-8 prefix. A code point split
/// across chunks stays buffered.
fn take_utf8(buf: &mut Vec<u8>) -> String {
    let valid = match std::str::from_utf8(buf) {
        Ok(text) => text.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        // Invalid bytes mid-stream will never become valid; replace them.
        Err(_) => buf.len(),
    };
    let text = String::from_utf8_lossy(&buf[..valid]).into_owned();
    buf.drain(..valid);
    text
}
