//! Serial transport implementation

use super::Transport;
use crate::error::Result;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::Duration;

/// Serial transport for UART communication
///
/// The port is opened in poll mode (100μs timeout) so reads return
/// immediately; line-level timeout handling lives in the caller.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open a serial port
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM1")
    /// * `baud_rate` - Baud rate (e.g., 9600)
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_micros(100)) // 100μs timeout for minimal blocking
            .open()?;

        log::info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(SerialTransport { port })
    }

    /// Wrap an already-open serial port handle
    ///
    /// The handle keeps whatever settings it was opened with. Reads are
    /// polled, so its own timeout should be short.
    pub fn from_handle(port: Box<dyn SerialPort>) -> Self {
        SerialTransport { port }
    }
}

impl Transport for SerialTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        match self.port.read(buffer) {
            Ok(n) => Ok(n),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                Ok(0)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.port.write(data)?)
    }

    fn clear_input(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }

    fn clear_output(&mut self) -> Result<()> {
        self.port.clear(ClearBuffer::Output)?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        // The handle holds the descriptor for its whole lifetime; serialport
        // closes it on drop.
        true
    }
}
