//! Board profiles and the acquisition driver
//!
//! A [`BoardProfile`] names a supported device and fixes its baud rate. The
//! [`BoardDriver`] drives one exchange at a time: send the acquisition
//! command, then classify tagged response lines until the device delivers
//! data or reports a fault.

use crate::config::DeviceConfig;
use crate::error::{Error, Result};
use crate::link::SerialLink;
use crate::protocol::{CMD_ACQUIRE, Tag};
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Supported board profiles and their fixed baud rates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardProfile {
    /// Arduino Micro class boards, 9600 baud
    Micro,
}

impl BoardProfile {
    /// Wire baud rate for this profile
    pub fn baud_rate(&self) -> u32 {
        match self {
            BoardProfile::Micro => 9600,
        }
    }
}

impl FromStr for BoardProfile {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "micro" => Ok(BoardProfile::Micro),
            other => Err(Error::UnknownBoard(other.to_string())),
        }
    }
}

/// Driver for one acquisition-capable board
///
/// Owns the link exclusively. Exchange failures (`DeviceFault`,
/// `UnknownTag`) leave the link open, so a later call can retry.
pub struct BoardDriver {
    link: SerialLink,
}

impl std::fmt::Debug for BoardDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardDriver").field("link", &self.link).finish()
    }
}

impl BoardDriver {
    /// Wrap an existing link
    pub fn new(link: SerialLink) -> Self {
        BoardDriver { link }
    }

    /// Build a driver from the device section of the application config
    ///
    /// The profile is resolved first, so an unknown board name fails before
    /// any device I/O.
    pub fn from_config(device: &DeviceConfig) -> Result<Self> {
        let profile: BoardProfile = device.board.parse()?;
        let link = SerialLink::open(
            &device.port,
            profile.baud_rate(),
            device.read_timeout()?,
            device.write_delay()?,
            device.debug,
        )?;
        Ok(BoardDriver::new(link))
    }

    /// Borrow the underlying link
    pub fn link(&self) -> &SerialLink {
        &self.link
    }

    /// Mutably borrow the underlying link
    pub fn link_mut(&mut self) -> &mut SerialLink {
        &mut self.link
    }

    /// Shared flag interrupting blocking reads and settle delays
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.link.cancel_handle()
    }

    /// Whether the underlying device handle is open
    pub fn is_open(&self) -> bool {
        self.link.is_open()
    }

    /// Run one acquisition exchange
    ///
    /// Sends the `aq` command, then classifies response lines. `ACK`, `DBG`
    /// and `MSG` lines are logged and the loop continues; a `DAT` line logs
    /// a completion notice and ends the exchange; an `ERR` line fails with
    /// [`Error::DeviceFault`]; anything else is dumped and fails with
    /// [`Error::UnknownTag`]. No further reads happen after a terminal line.
    pub fn start_acquisition(&mut self) -> Result<()> {
        log::info!("Starting acquisition");
        self.link.send(CMD_ACQUIRE)?;

        loop {
            let raw = self.link.read_line()?;
            let line = String::from_utf8_lossy(&raw).into_owned();

            match Tag::of(&line) {
                Some(Tag::Ack | Tag::Debug | Tag::Message) => {
                    log::info!("{}", line);
                }
                Some(Tag::Data) => {
                    log::info!("{}", line);
                    log::info!("Acquisition complete");
                    return Ok(());
                }
                Some(Tag::Error) => {
                    return Err(Error::DeviceFault(line));
                }
                None => {
                    log::error!("Unrecognized response line ({} bytes): {:?}", raw.len(), line);
                    return Err(Error::UnknownTag(line));
                }
            }
        }
    }
}
