//! WebSocket transport.
//!
//! Each [`Socket`] is one physical connection owned by a background task.
//! The task reports what happens through a shared channel, tagging every
//! event with the socket's [`Generation`]. Protocol logic stays in the
//! sans-IO connection manager; this layer only moves text.

use futures::{SinkExt, StreamExt};
use nebula_core::Generation;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::{
    error::TransportError,
    event::{SocketEvent, TransportEvent},
};

enum Outbound {
    Text(String),
    Close,
}

/// Handle to one socket task.
///
/// Dropping the handle closes the socket.
pub struct Socket {
    generation: Generation,
    outbound: mpsc::UnboundedSender<Outbound>,
    abort_handle: tokio::task::AbortHandle,
}

impl Socket {
    /// Start connecting to `url`. Must be called inside a tokio runtime.
    pub fn open(
        url: &str,
        generation: Generation,
        events: mpsc::UnboundedSender<SocketEvent>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_socket(url.to_string(), generation, outbound_rx, events));
        tracing::debug!(%generation, url, "socket task spawned");
        Self { generation, outbound, abort_handle: handle.abort_handle() }
    }

    /// Transport generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Queue a text message.
    ///
    /// # Errors
    ///
    /// - `TransportError::Closed` if the socket task has exited.
    pub fn send(&self, text: String) -> Result<(), TransportError> {
        self.outbound.send(Outbound::Text(text)).map_err(|_| TransportError::Closed)
    }

    /// Close gracefully. The task exits without reporting the close.
    pub fn close(self) {
        // The task may already be gone.
        let _ = self.outbound.send(Outbound::Close);
    }

    /// Kill the task immediately.
    pub fn abort(&self) {
        self.abort_handle.abort();
    }
}

async fn run_socket(
    url: String,
    generation: Generation,
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    events: mpsc::UnboundedSender<SocketEvent>,
) {
    let emit = |event: TransportEvent| {
        let _ = events.send(SocketEvent { generation, event });
    };
    let fail = |reason: String| {
        emit(TransportEvent::Error(reason));
        emit(TransportEvent::Closed { code: None });
    };

    let stream = tokio::select! {
        biased;

        command = outbound.recv() => {
            if !matches!(command, Some(Outbound::Text(_))) {
                tracing::debug!(%generation, "socket closed before handshake");
                return;
            }
            fail("send before open".to_string());
            return;
        },
        connected = connect_async(url.as_str()) => match connected {
            Ok((stream, _response)) => stream,
            Err(e) => {
                fail(e.to_string());
                return;
            },
        },
    };

    emit(TransportEvent::Opened);
    let (mut sink, mut source) = stream.split();

    loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(Outbound::Text(text)) => {
                    if let Err(e) = sink.send(Message::text(text)).await {
                        fail(e.to_string());
                        return;
                    }
                },
                Some(Outbound::Close) | None => {
                    if let Err(e) = sink.close().await {
                        tracing::debug!(%generation, error = %e, "close handshake failed");
                    }
                    return;
                },
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => emit(TransportEvent::Message(text.as_str().to_owned())),
                Some(Ok(Message::Close(frame))) => {
                    emit(TransportEvent::Closed { code: frame.map(|f| u16::from(f.code)) });
                    return;
                },
                Some(Ok(Message::Binary(bytes))) => {
                    tracing::warn!(%generation, len = bytes.len(), "ignoring binary frame");
                },
                Some(Ok(_)) => {},
                Some(Err(e)) => {
                    fail(e.to_string());
                    return;
                },
                None => {
                    emit(TransportEvent::Closed { code: None });
                    return;
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn refused_connection_reports_error_then_close() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let generation = Generation::new(3);
        let _socket = Socket::open("ws://127.0.0.1:9/ws", generation, tx);

        let first = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();
        let second = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.unwrap().unwrap();

        assert_eq!(first.generation, generation);
        assert!(matches!(first.event, TransportEvent::Error(_)));
        assert_eq!(second.event, TransportEvent::Closed { code: None });
    }

    #[tokio::test]
    async fn close_before_handshake_is_silent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Unroutable address keeps the handshake pending.
        let socket = Socket::open("ws://10.255.255.1:81/ws", Generation::new(1), tx);
        socket.close();

        let received = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(matches!(received, Ok(None) | Err(_)));
    }
}
