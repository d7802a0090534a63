//! Transport layer for device I/O abstraction

use crate::error::Result;

mod mock;
mod serial;

pub use mock::MockTransport;
pub use serial::SerialTransport;

/// Transport trait for device communication
///
/// Reads are non-blocking: `Ok(0)` means no byte was available right now.
/// All timeout semantics are layered on top by
/// [`SerialLink`](crate::link::SerialLink).
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 = no data)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Discard any bytes buffered on the receive side
    fn clear_input(&mut self) -> Result<()>;

    /// Discard any bytes queued on the transmit side
    fn clear_output(&mut self) -> Result<()>;

    /// Whether the underlying device handle is open
    fn is_open(&self) -> bool;
}
