//! # cmd-core
//!
//! Shared library for the remote command protocol: the [`Command`] value
//! type and the binary frame codec that turns it into bytes.
//!
//! This crate has no I/O and no dependencies on sockets or threads.  The
//! client crate writes the encoded segments to a stream; a server decodes
//! them with [`decode_frame`].
//!
//! # Frame layout
//!
//! | Offset         | Field           | Size     |
//! |----------------|-----------------|----------|
//! | 0              | type code       | 4        |
//! | 4              | address length  | 4        |
//! | 8              | address (ASCII) | addr_len |
//! | 8 + addr_len   | metadata length | 4        |
//! | 12 + addr_len  | metadata        | meta_len |
//!
//! Integers are little-endian `u32`.

pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `cmd_core::Command` instead of `cmd_core::protocol::command::Command`.
pub use protocol::codec::{decode_frame, encode_frame, FrameSegments, ProtocolError, SegmentKind};
pub use protocol::command::{Command, CommandType, DEFAULT_METADATA};
