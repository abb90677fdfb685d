//! Protocol module containing the command types and the binary frame codec.

pub mod codec;
pub mod command;

pub use codec::{decode_frame, encode_frame, FrameSegments, ProtocolError, SegmentKind};
pub use command::*;
