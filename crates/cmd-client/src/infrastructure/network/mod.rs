//! Network infrastructure for the command client.
//!
//! Architecture:
//! - [`CommandClient`] is the façade: it holds the network name and a
//!   [`SynchronizedSender`], and exposes [`CommandClient::send_unbuffered`].
//! - [`SynchronizedSender`] owns the stream slot and the [`Gate`], and writes
//!   each frame segment by segment under the gate.
//! - `cmd_core::encode_frame` turns a [`Command`] into those segments.
//!
//! ```text
//! caller ─► CommandClient::send_unbuffered(cmd)
//!             ├─ encode_frame(cmd)            (no I/O; fails early)
//!             └─ SynchronizedSender::transmit  (gate + 5× write/flush)
//! ```
//!
//! Establishing the connection is optional: [`CommandClient::connect`] opens a
//! plain TCP stream, but any `Write + Send` stream can be attached instead.

pub mod gate;
pub mod sender;

use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use cmd_core::{encode_frame, Command, ProtocolError, SegmentKind};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::storage::config::ClientConfig;

pub use gate::{Gate, GateGuard, SemaphoreGate};
pub use sender::{BoxedStream, SynchronizedSender};

/// Errors surfaced by [`CommandClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The command could not be encoded; nothing was written.
    #[error("failed to encode command: {0}")]
    Encoding(#[from] ProtocolError),

    /// A write or flush failed mid-frame.  The connection should be dropped.
    #[error("failed to transmit {segment}: {source}")]
    Transmission {
        segment: SegmentKind,
        #[source]
        source: std::io::Error,
    },

    /// `send_unbuffered` was called with no stream attached.
    #[error("no stream attached to the client")]
    NotConnected,

    /// TCP connection to the server failed.
    #[error("failed to connect to server at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The configured server address did not resolve.
    #[error("invalid server address: {0}")]
    InvalidServerAddress(String),
}

/// Synchronous remote command client.
///
/// Cheap to share behind an `Arc`: every method takes `&self`, and concurrent
/// [`send_unbuffered`](Self::send_unbuffered) calls are serialised by the gate.
pub struct CommandClient {
    network_name: String,
    sender: SynchronizedSender,
}

impl CommandClient {
    /// Creates a client with the default [`SemaphoreGate`].
    ///
    /// `stream` may be `None` when the connection is established later and
    /// supplied through [`attach_stream`](Self::attach_stream).
    pub fn new(stream: Option<BoxedStream>, network_name: impl Into<String>) -> Self {
        Self::with_gate(stream, network_name, Arc::new(SemaphoreGate::new()))
    }

    /// Creates a client with an explicit gate.
    pub fn with_gate(
        stream: Option<BoxedStream>,
        network_name: impl Into<String>,
        gate: Arc<dyn Gate>,
    ) -> Self {
        Self {
            network_name: network_name.into(),
            sender: SynchronizedSender::new(stream, gate),
        }
    }

    /// Opens a TCP connection to the configured server and returns a client
    /// with the stream attached.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidServerAddress`] if the address does not
    /// resolve and [`ClientError::ConnectFailed`] if the connection is refused
    /// or times out.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let addr = config
            .server_socket_addr()
            .map_err(|e| ClientError::InvalidServerAddress(e.to_string()))?;

        let stream = match config.server.connect_timeout_ms {
            0 => TcpStream::connect(addr),
            ms => TcpStream::connect_timeout(&addr, Duration::from_millis(ms)),
        }
        .and_then(|stream| {
            stream.set_nodelay(config.server.nodelay)?;
            Ok(stream)
        })
        .map_err(|source| ClientError::ConnectFailed { addr, source })?;

        info!(%addr, network_name = %config.client.network_name, "connected to server");
        Ok(Self::new(Some(Box::new(stream)), config.client.network_name.clone()))
    }

    /// The diagnostic name given at construction, unchanged.
    pub fn network_name(&self) -> &str {
        &self.network_name
    }

    /// Attaches `stream`, returning the previously attached one.
    pub fn attach_stream(&self, stream: BoxedStream) -> Option<BoxedStream> {
        self.sender.attach(stream)
    }

    /// Detaches and returns the current stream.
    pub fn detach_stream(&self) -> Option<BoxedStream> {
        self.sender.detach()
    }

    pub fn is_connected(&self) -> bool {
        self.sender.is_attached()
    }

    /// Encodes `command` and writes it on the calling thread.
    ///
    /// Returns once all five segments are written and flushed.  There is no
    /// queuing and no retry.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Encoding`] before any I/O if the command cannot be framed.
    /// - [`ClientError::NotConnected`] if no stream is attached.
    /// - [`ClientError::Transmission`] if the stream fails mid-frame.
    pub fn send_unbuffered(&self, command: &Command) -> Result<(), ClientError> {
        let frame = encode_frame(command)?;
        debug!(
            network_name = %self.network_name,
            command_type = ?command.command_type(),
            "sending command"
        );
        self.sender.transmit(&frame)
    }
}

impl std::fmt::Debug for CommandClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandClient")
            .field("network_name", &self.network_name)
            .field("connected", &self.is_connected())
            .finish()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
