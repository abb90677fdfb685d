//! Guarded transmission of encoded frames over the shared stream.
//!
//! The sender owns the stream slot and the client's [`Gate`].  One call to
//! [`SynchronizedSender::transmit`] writes the five segments of a frame, each
//! followed by a flush, while holding the gate:
//!
//! ```text
//! acquire ─► write(type) flush ─► write(addr_len) flush ─► write(addr) flush
//!         ─► write(meta_len) flush ─► write(meta) flush ─► release
//! ```
//!
//! If any write or flush fails, the remaining segments are skipped, the gate
//! is released by the guard, and the error reaches the caller.  The frame may
//! be partially on the wire at that point; there is no resynchronisation, so
//! the caller should tear the connection down.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cmd_core::FrameSegments;
use tracing::{debug, info, warn};

use super::gate::{Gate, GateGuard};
use super::ClientError;

/// Byte stream the sender writes frames to.
pub type BoxedStream = Box<dyn Write + Send>;

/// Writes frames to a shared stream, one frame at a time.
pub struct SynchronizedSender {
    stream: Mutex<Option<BoxedStream>>,
    gate: Arc<dyn Gate>,
}

impl SynchronizedSender {
    /// Creates a sender.  `stream` may be `None` and attached later.
    pub fn new(stream: Option<BoxedStream>, gate: Arc<dyn Gate>) -> Self {
        Self {
            stream: Mutex::new(stream),
            gate,
        }
    }

    /// Installs `stream`, returning the previously attached one.
    ///
    /// Waits for an in-flight frame to finish before swapping.
    pub fn attach(&self, stream: BoxedStream) -> Option<BoxedStream> {
        let previous = self.lock_stream().replace(stream);
        info!(replaced = previous.is_some(), "stream attached");
        previous
    }

    /// Removes and returns the attached stream.
    pub fn detach(&self) -> Option<BoxedStream> {
        let previous = self.lock_stream().take();
        if previous.is_some() {
            info!("stream detached");
        }
        previous
    }

    pub fn is_attached(&self) -> bool {
        self.lock_stream().is_some()
    }

    /// Writes every segment of `frame` under the gate.
    ///
    /// Blocks without timeout while another frame is being written.
    ///
    /// # Errors
    ///
    /// - [`ClientError::NotConnected`] if no stream is attached.  The gate is
    ///   not touched and nothing is written.
    /// - [`ClientError::Transmission`] if a write or flush fails.  The gate has
    ///   been released by the time the caller sees the error.
    pub fn transmit(&self, frame: &FrameSegments) -> Result<(), ClientError> {
        // Checked before the gate so a detached client never blocks.
        if !self.is_attached() {
            return Err(ClientError::NotConnected);
        }

        let _gate = GateGuard::acquire(self.gate.as_ref());
        // Declared after the gate guard, so it is dropped (unlocked) first.
        let mut slot = self.lock_stream();
        // The stream may have been detached while we waited on the gate.
        let stream = slot.as_mut().ok_or(ClientError::NotConnected)?;

        for (segment, bytes) in frame.segments() {
            write_segment(stream, bytes).map_err(|source| {
                warn!(%segment, error = %source, "frame transmission failed");
                ClientError::Transmission { segment, source }
            })?;
        }

        debug!(bytes = frame.len(), "frame sent");
        Ok(())
    }

    // A panic while the stream was locked leaves it in an unknown position on
    // the wire; that is the same state as a failed write, which the caller
    // already has to handle, so the poison flag carries no extra information.
    fn lock_stream(&self) -> MutexGuard<'_, Option<BoxedStream>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_segment(stream: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    stream.write_all(bytes)?;
    stream.flush()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
