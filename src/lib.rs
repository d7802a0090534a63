//! aqlink - acquisition client for tag-prefixed serial line protocols
//!
//! Drives a microcontroller over a serial byte stream: send the `aq`
//! command, then classify each newline-terminated response line by its
//! three-character tag until the device delivers data or reports a fault.
//!
//! The pieces layer bottom-up: [`transport`] is the raw byte-stream boundary
//! (real serial port or in-memory mock), [`link`] adds line framing, logical
//! timeouts and the write settle delay, and [`board`] maps board profiles to
//! baud rates and runs the acquisition exchange. Serial handles close on
//! drop; nothing here closes them explicitly.

pub mod board;
pub mod config;
pub mod error;
pub mod link;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use board::{BoardDriver, BoardProfile};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use link::SerialLink;
