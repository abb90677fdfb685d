//! Binary frame codec for the remote command protocol.
//!
//! Wire format:
//! ```text
//! [type_code:4][addr_len:4][addr:addr_len][meta_len:4][meta:meta_len]
//! ```
//! All integers are unsigned 32-bit little-endian.  The address is the ASCII
//! dotted-quad form of the sender's IPv4 address.  There is no padding and no
//! version byte.
//!
//! Encoding yields the five fields as separate segments rather than one
//! buffer: the sender writes and flushes each segment in turn, so the segment
//! boundaries are part of the observable protocol.

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::protocol::command::{Command, CommandType};

/// Size of every integer field (type code and both length prefixes).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Smallest possible frame: three integer fields with empty address and metadata.
pub const MIN_FRAME_SIZE: usize = 3 * LENGTH_PREFIX_SIZE;

/// Errors that can occur during frame encoding or decoding.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A declared length would read past the end of the available bytes.
    #[error("malformed frame: {field} needs {needed} bytes, only {available} available")]
    MalformedFrame {
        field: SegmentKind,
        needed: usize,
        available: usize,
    },

    /// The type code does not map to a known [`CommandType`].
    #[error("unknown command type code: {0}")]
    UnknownCommandType(u32),

    /// The address bytes are not an ASCII dotted-quad IPv4 address.
    #[error("invalid sender address: {0:?}")]
    InvalidAddress(String),

    /// A field is longer than a 32-bit length prefix can describe.
    #[error("{field} is {len} bytes, exceeds the 32-bit length field")]
    FieldTooLarge { field: SegmentKind, len: usize },
}

/// Identifies one of the five segments of a frame, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    TypeCode,
    AddressLength,
    Address,
    MetadataLength,
    Metadata,
}

impl std::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SegmentKind::TypeCode => "type code",
            SegmentKind::AddressLength => "address length",
            SegmentKind::Address => "address",
            SegmentKind::MetadataLength => "metadata length",
            SegmentKind::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

/// An encoded command, held as its five wire segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSegments {
    type_code: [u8; LENGTH_PREFIX_SIZE],
    address_length: [u8; LENGTH_PREFIX_SIZE],
    address: Vec<u8>,
    metadata_length: [u8; LENGTH_PREFIX_SIZE],
    metadata: Vec<u8>,
}

impl FrameSegments {
    /// Returns the five segments in the order they go on the wire.
    pub fn segments(&self) -> [(SegmentKind, &[u8]); 5] {
        [
            (SegmentKind::TypeCode, &self.type_code[..]),
            (SegmentKind::AddressLength, &self.address_length[..]),
            (SegmentKind::Address, &self.address[..]),
            (SegmentKind::MetadataLength, &self.metadata_length[..]),
            (SegmentKind::Metadata, &self.metadata[..]),
        ]
    }

    /// Total frame length: `4 + 4 + addr_len + 4 + meta_len`.
    pub fn len(&self) -> usize {
        MIN_FRAME_SIZE + self.address.len() + self.metadata.len()
    }

    /// Always `false`; a frame has at least [`MIN_FRAME_SIZE`] bytes.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Concatenates the segments into one contiguous frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        for (_, segment) in self.segments() {
            buf.extend_from_slice(segment);
        }
        buf
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a [`Command`] into its five frame segments.
///
/// No I/O happens here; an error means nothing should be written.
///
/// # Errors
///
/// Returns [`ProtocolError::FieldTooLarge`] if the metadata is longer than
/// `u32::MAX` bytes.
///
/// # Examples
///
/// ```rust
/// use std::net::Ipv4Addr;
/// use cmd_core::{encode_frame, Command, CommandType};
///
/// let cmd = Command::new(CommandType::UserExit, Ipv4Addr::new(127, 0, 0, 1), None);
/// let frame = encode_frame(&cmd).unwrap();
/// assert_eq!(
///     frame.to_bytes(),
///     [0, 0, 0, 0, 9, 0, 0, 0, b'1', b'2', b'7', b'.', b'0', b'.', b'0', b'.', b'1', 2, 0, 0, 0, 0x0A, 0x00]
/// );
/// ```
pub fn encode_frame(command: &Command) -> Result<FrameSegments, ProtocolError> {
    let address = command.sender_address().to_string().into_bytes();
    let metadata = command.wire_metadata().to_vec();

    Ok(FrameSegments {
        type_code: command.command_type().code().to_le_bytes(),
        address_length: length_prefix(SegmentKind::Address, address.len())?,
        address,
        metadata_length: length_prefix(SegmentKind::Metadata, metadata.len())?,
        metadata,
    })
}

/// Decodes one [`Command`] from the beginning of `bytes`.
///
/// Returns the command and the number of bytes consumed, so the caller can
/// advance past back-to-back frames.  A metadata field equal to the default
/// sentinel decodes to absent metadata.
///
/// # Errors
///
/// Returns [`ProtocolError::MalformedFrame`] if any field would read past the
/// end of `bytes`, [`ProtocolError::UnknownCommandType`] for undefined type
/// codes, and [`ProtocolError::InvalidAddress`] if the address is not a
/// dotted-quad IPv4 address.
///
/// # Examples
///
/// ```rust
/// use std::net::Ipv4Addr;
/// use cmd_core::{decode_frame, encode_frame, Command, CommandType};
///
/// let original = Command::with_text(CommandType::Message, Ipv4Addr::new(192, 168, 1, 4), "hello");
/// let bytes = encode_frame(&original).unwrap().to_bytes();
/// let (decoded, n) = decode_frame(&bytes).unwrap();
/// assert_eq!(decoded, original);
/// assert_eq!(n, bytes.len());
/// ```
pub fn decode_frame(bytes: &[u8]) -> Result<(Command, usize), ProtocolError> {
    let mut cursor = 0;

    let code = read_u32(bytes, &mut cursor, SegmentKind::TypeCode)?;
    let command_type =
        CommandType::try_from(code).map_err(|_| ProtocolError::UnknownCommandType(code))?;

    let address_len = read_u32(bytes, &mut cursor, SegmentKind::AddressLength)? as usize;
    let address_bytes = read_slice(bytes, &mut cursor, address_len, SegmentKind::Address)?;
    let sender_address = parse_address(address_bytes)?;

    let metadata_len = read_u32(bytes, &mut cursor, SegmentKind::MetadataLength)? as usize;
    let metadata = read_slice(bytes, &mut cursor, metadata_len, SegmentKind::Metadata)?;

    // Command::new folds the default sentinel back into absent metadata.
    let command = Command::new(command_type, sender_address, Some(metadata.to_vec()));
    Ok((command, cursor))
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn length_prefix(field: SegmentKind, len: usize) -> Result<[u8; 4], ProtocolError> {
    u32::try_from(len)
        .map(u32::to_le_bytes)
        .map_err(|_| ProtocolError::FieldTooLarge { field, len })
}

fn read_slice<'a>(
    bytes: &'a [u8],
    cursor: &mut usize,
    len: usize,
    field: SegmentKind,
) -> Result<&'a [u8], ProtocolError> {
    let available = bytes.len() - *cursor;
    if len > available {
        return Err(ProtocolError::MalformedFrame {
            field,
            needed: len,
            available,
        });
    }
    let slice = &bytes[*cursor..*cursor + len];
    *cursor += len;
    Ok(slice)
}

fn read_u32(bytes: &[u8], cursor: &mut usize, field: SegmentKind) -> Result<u32, ProtocolError> {
    let raw = read_slice(bytes, cursor, LENGTH_PREFIX_SIZE, field)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

fn parse_address(raw: &[u8]) -> Result<Ipv4Addr, ProtocolError> {
    std::str::from_utf8(raw)
        .ok()
        .filter(|text| text.is_ascii())
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| ProtocolError::InvalidAddress(String::from_utf8_lossy(raw).into_owned()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn localhost_exit() -> Command {
        Command::new(CommandType::UserExit, Ipv4Addr::new(127, 0, 0, 1), None)
    }

    fn round_trip(cmd: &Command) -> Command {
        let bytes = encode_frame(cmd).expect("encode").to_bytes();
        let (decoded, consumed) = decode_frame(&bytes).expect("decode");
        assert_eq!(consumed, bytes.len());
        decoded
    }

    // ── Encoding ──────────────────────────────────────────────────────────────

    #[test]
    fn test_user_exit_from_localhost_segments() {
        // Arrange
        let cmd = localhost_exit();

        // Act
        let frame = encode_frame(&cmd).unwrap();
        let segments = frame.segments();

        // Assert
        assert_eq!(segments[0], (SegmentKind::TypeCode, &[0u8, 0, 0, 0][..]));
        assert_eq!(segments[1], (SegmentKind::AddressLength, &[9u8, 0, 0, 0][..]));
        assert_eq!(segments[2], (SegmentKind::Address, &b"127.0.0.1"[..]));
        assert_eq!(segments[3], (SegmentKind::MetadataLength, &[2u8, 0, 0, 0][..]));
        assert_eq!(segments[4], (SegmentKind::Metadata, &[0x0Au8, 0x00][..]));
    }

    #[test]
    fn test_user_exit_from_localhost_total_length_is_23() {
        let frame = encode_frame(&localhost_exit()).unwrap();
        assert_eq!(frame.len(), 4 + 4 + 9 + 4 + 2);
        assert_eq!(frame.to_bytes().len(), frame.len());
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_address_length_tracks_dotted_quad_width() {
        let cmd = Command::new(CommandType::PcLock, Ipv4Addr::new(255, 255, 255, 255), None);
        let frame = encode_frame(&cmd).unwrap();
        let segments = frame.segments();

        assert_eq!(segments[1].1, &15u32.to_le_bytes()[..]);
        assert_eq!(segments[2].1, &b"255.255.255.255"[..]);
    }

    #[test]
    fn test_type_code_is_little_endian() {
        let cmd = Command::new(CommandType::FreeCommand, Ipv4Addr::LOCALHOST, None);
        let frame = encode_frame(&cmd).unwrap();
        assert_eq!(frame.segments()[0].1, &[11u8, 0, 0, 0][..]);
    }

    #[test]
    fn test_explicit_empty_metadata_encodes_zero_length_and_no_bytes() {
        // Arrange
        let cmd = Command::new(CommandType::UserExit, Ipv4Addr::LOCALHOST, Some(Vec::new()));

        // Act
        let frame = encode_frame(&cmd).unwrap();

        // Assert
        assert_eq!(frame.segments()[3].1, &[0u8, 0, 0, 0][..]);
        assert!(frame.segments()[4].1.is_empty());
        assert_eq!(frame.len(), 12 + 9);
    }

    #[test]
    fn test_length_prefix_rejects_lengths_over_u32() {
        let len = u32::MAX as usize + 1;
        let result = length_prefix(SegmentKind::Metadata, len);
        assert_eq!(
            result,
            Err(ProtocolError::FieldTooLarge {
                field: SegmentKind::Metadata,
                len
            })
        );
    }

    #[test]
    fn test_length_prefix_accepts_u32_max() {
        let result = length_prefix(SegmentKind::Metadata, u32::MAX as usize);
        assert_eq!(result, Ok([0xFF; 4]));
    }

    // ── Round trips ───────────────────────────────────────────────────────────

    #[test]
    fn test_default_metadata_round_trips_to_absent() {
        let cmd = localhost_exit();
        assert_eq!(round_trip(&cmd), cmd);
    }

    #[test]
    fn test_empty_metadata_round_trips() {
        let cmd = Command::new(CommandType::SendClientList, Ipv4Addr::new(10, 1, 2, 3), Some(vec![]));
        assert_eq!(round_trip(&cmd), cmd);
    }

    #[test]
    fn test_binary_metadata_round_trips() {
        let cmd = Command::new(
            CommandType::FreeCommand,
            Ipv4Addr::new(192, 168, 0, 254),
            Some((0..=255u8).collect()),
        );
        assert_eq!(round_trip(&cmd), cmd);
    }

    #[test]
    fn test_text_metadata_round_trips() {
        let cmd = Command::with_text(CommandType::Message, Ipv4Addr::new(172, 16, 0, 1), "shutting down at 5");
        let decoded = round_trip(&cmd);
        assert_eq!(decoded.metadata_text().as_deref(), Some("shutting down at 5"));
    }

    #[test]
    fn test_decode_reports_consumed_bytes_for_back_to_back_frames() {
        // Arrange
        let first = localhost_exit();
        let second = Command::with_text(CommandType::Message, Ipv4Addr::new(1, 2, 3, 4), "x");
        let mut stream = encode_frame(&first).unwrap().to_bytes();
        stream.extend(encode_frame(&second).unwrap().to_bytes());

        // Act
        let (a, n) = decode_frame(&stream).unwrap();
        let (b, m) = decode_frame(&stream[n..]).unwrap();

        // Assert
        assert_eq!(a, first);
        assert_eq!(b, second);
        assert_eq!(n + m, stream.len());
    }

    // ── Error conditions ──────────────────────────────────────────────────────

    #[test]
    fn test_decode_empty_bytes_is_malformed() {
        let result = decode_frame(&[]);
        assert_eq!(
            result,
            Err(ProtocolError::MalformedFrame {
                field: SegmentKind::TypeCode,
                needed: 4,
                available: 0
            })
        );
    }

    #[test]
    fn test_decode_unknown_type_code() {
        let mut bytes = encode_frame(&localhost_exit()).unwrap().to_bytes();
        bytes[0..4].copy_from_slice(&999u32.to_le_bytes());
        assert_eq!(decode_frame(&bytes), Err(ProtocolError::UnknownCommandType(999)));
    }

    #[test]
    fn test_decode_address_length_past_end_is_malformed() {
        // Declares a 100-byte address but supplies only 9
        let mut bytes = encode_frame(&localhost_exit()).unwrap().to_bytes();
        bytes[4..8].copy_from_slice(&100u32.to_le_bytes());
        let result = decode_frame(&bytes);
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedFrame {
                field: SegmentKind::Address,
                needed: 100,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_truncated_metadata_is_malformed() {
        let bytes = encode_frame(&localhost_exit()).unwrap().to_bytes();
        let truncated = &bytes[..bytes.len() - 1];
        assert_eq!(
            decode_frame(truncated),
            Err(ProtocolError::MalformedFrame {
                field: SegmentKind::Metadata,
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn test_decode_missing_metadata_length_is_malformed() {
        let bytes = encode_frame(&localhost_exit()).unwrap().to_bytes();
        let result = decode_frame(&bytes[..17]);
        assert!(matches!(
            result,
            Err(ProtocolError::MalformedFrame {
                field: SegmentKind::MetadataLength,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_rejects_non_ip_address() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&9u32.to_le_bytes());
        bytes.extend_from_slice(b"localhost");
        bytes.extend_from_slice(&0u32.to_le_bytes());

        assert_eq!(
            decode_frame(&bytes),
            Err(ProtocolError::InvalidAddress("localhost".to_string()))
        );
    }

    #[test]
    fn test_decode_rejects_non_ascii_address() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0xC3, 0xA9]);
        bytes.extend_from_slice(&0u32.to_le_bytes());

        assert!(matches!(decode_frame(&bytes), Err(ProtocolError::InvalidAddress(_))));
    }

    #[test]
    fn test_segment_kind_display_names_field() {
        assert_eq!(SegmentKind::MetadataLength.to_string(), "metadata length");
    }
}
