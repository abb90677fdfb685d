//! cmd-client library entry point.
//!
//! # What does cmd-client do? (for beginners)
//!
//! A remote command client sends small typed commands ("this user is
//! leaving", "lock this PC", a text message) to a command server over one
//! long-lived byte stream.  Many threads in the application may send at the
//! same time, but the stream is shared, so each frame must go out whole.
//!
//! The client:
//!
//! 1. Encodes a [`Command`] into five length-prefixed segments
//!    (see `cmd_core::encode_frame`).
//! 2. Acquires the client's gate, a binary semaphore.
//! 3. Writes and flushes each segment in order.
//! 4. Releases the gate on every exit path and reports any failure to the
//!    caller.
//!
//! ```no_run
//! use std::net::Ipv4Addr;
//! use cmd_client::{CommandClient, Command, CommandType};
//! use cmd_client::infrastructure::storage::config::ClientConfig;
//!
//! let client = CommandClient::connect(&ClientConfig::default())?;
//! client.send_unbuffered(&Command::new(CommandType::UserExit, Ipv4Addr::new(127, 0, 0, 1), None))?;
//! # Ok::<(), cmd_client::ClientError>(())
//! ```

/// Infrastructure layer: network transmission and configuration storage.
pub mod infrastructure;

pub use cmd_core::{Command, CommandType};
pub use infrastructure::network::{ClientError, CommandClient};
