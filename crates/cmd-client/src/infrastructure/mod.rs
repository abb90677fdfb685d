//! Infrastructure layer for the command client.
//!
//! # Sub-modules
//!
//! - **`network`** – the [`network::CommandClient`] façade, the gate that
//!   serialises senders, and the synchronized sender that writes frames to
//!   the shared stream.
//!
//! - **`storage`** – TOML configuration loading and saving.

pub mod network;
pub mod storage;
