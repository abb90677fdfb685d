//! Command value types for the remote command protocol.
//!
//! A [`Command`] is the unit a client sends to the server: a numeric
//! [`CommandType`] tag, the IPv4 address of the sender, and an optional
//! metadata payload.  Commands are created per outgoing message and discarded
//! once they have been encoded into a frame.
//!
//! # Metadata and the default sentinel
//!
//! When a command carries no metadata, the frame still contains a two-byte
//! metadata field: a single `'\n'` encoded as a UTF-16LE code unit
//! (`0A 00`).  Because "absent" and "explicitly `0A 00`" produce the same bytes
//! on the wire, [`Command::new`] stores the latter as absent metadata.  A
//! caller that wants a truly empty field passes `Some(Vec::new())`.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Metadata bytes emitted when a command carries no metadata: `'\n'` as UTF-16LE.
pub const DEFAULT_METADATA: [u8; 2] = [0x0A, 0x00];

// ── Command type codes ────────────────────────────────────────────────────────

/// All command type codes understood by the server.
///
/// The discriminant is the 4-byte code written at offset 0 of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum CommandType {
    /// The sending user is leaving; the server drops the sender from its list.
    UserExit = 0,
    PcLockWithTimer = 1,
    PcLock = 2,
    PcLogOff = 3,
    PcRestart = 4,
    PcShutDown = 5,
    /// Free-form text message; the text travels in the metadata field.
    Message = 6,
    ClientLoginInform = 7,
    ClientLogOffInform = 8,
    IsNameExists = 9,
    SendClientList = 10,
    /// Application-defined command; semantics are carried in the metadata.
    FreeCommand = 11,
}

impl CommandType {
    /// Returns the numeric wire code for this command type.
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for CommandType {
    type Error = ();

    fn try_from(value: u32) -> Result<Self, ()> {
        match value {
            0 => Ok(CommandType::UserExit),
            1 => Ok(CommandType::PcLockWithTimer),
            2 => Ok(CommandType::PcLock),
            3 => Ok(CommandType::PcLogOff),
            4 => Ok(CommandType::PcRestart),
            5 => Ok(CommandType::PcShutDown),
            6 => Ok(CommandType::Message),
            7 => Ok(CommandType::ClientLoginInform),
            8 => Ok(CommandType::ClientLogOffInform),
            9 => Ok(CommandType::IsNameExists),
            10 => Ok(CommandType::SendClientList),
            11 => Ok(CommandType::FreeCommand),
            _ => Err(()),
        }
    }
}

// ── Command ───────────────────────────────────────────────────────────────────

/// One outgoing protocol message.
///
/// Deserialization goes through [`Command::new`], so a stored command obeys
/// the same metadata normalisation as one built in code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CommandFields")]
pub struct Command {
    command_type: CommandType,
    sender_address: Ipv4Addr,
    metadata: Option<Vec<u8>>,
}

/// Field-for-field mirror of [`Command`] used only as the serde input.
#[derive(Deserialize)]
struct CommandFields {
    command_type: CommandType,
    sender_address: Ipv4Addr,
    #[serde(default)]
    metadata: Option<Vec<u8>>,
}

impl From<CommandFields> for Command {
    fn from(fields: CommandFields) -> Self {
        Command::new(fields.command_type, fields.sender_address, fields.metadata)
    }
}

impl Command {
    /// Creates a command.
    ///
    /// `metadata` equal to [`DEFAULT_METADATA`] is stored as `None`, since the
    /// two are indistinguishable once framed.
    pub fn new(
        command_type: CommandType,
        sender_address: Ipv4Addr,
        metadata: Option<Vec<u8>>,
    ) -> Self {
        let metadata = metadata.filter(|bytes| bytes.as_slice() != DEFAULT_METADATA);
        Self {
            command_type,
            sender_address,
            metadata,
        }
    }

    /// Creates a command whose metadata is `text` encoded as UTF-16LE.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::net::Ipv4Addr;
    /// use cmd_core::{Command, CommandType};
    ///
    /// let cmd = Command::with_text(CommandType::Message, Ipv4Addr::LOCALHOST, "hi");
    /// assert_eq!(cmd.metadata(), Some(&[b'h', 0, b'i', 0][..]));
    /// assert_eq!(cmd.metadata_text().as_deref(), Some("hi"));
    /// ```
    pub fn with_text(command_type: CommandType, sender_address: Ipv4Addr, text: &str) -> Self {
        let bytes = text.encode_utf16().flat_map(u16::to_le_bytes).collect();
        Self::new(command_type, sender_address, Some(bytes))
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn sender_address(&self) -> Ipv4Addr {
        self.sender_address
    }

    /// Returns the explicit metadata payload, or `None` when the default
    /// sentinel will be sent.
    pub fn metadata(&self) -> Option<&[u8]> {
        self.metadata.as_deref()
    }

    /// Returns the bytes that will occupy the frame's metadata field.
    pub fn wire_metadata(&self) -> &[u8] {
        self.metadata.as_deref().unwrap_or(&DEFAULT_METADATA)
    }

    /// Decodes the wire metadata as UTF-16LE text.
    ///
    /// Returns `None` when the byte count is odd or the code units are not
    /// valid UTF-16.
    pub fn metadata_text(&self) -> Option<String> {
        let bytes = self.wire_metadata();
        if bytes.len() % 2 != 0 {
            return None;
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).ok()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
