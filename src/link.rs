//! Buffered line I/O over a transport
//!
//! [`SerialLink`] layers line framing, logical timeouts, and the write
//! settle delay on top of a raw [`Transport`]. The underlying device always
//! runs in poll mode; every timeout decision is made here against wall-clock
//! time, one byte per poll, so even a "blocking" read stays interruptible
//! through the cancellation flag.
//!
//! # Timeout semantics
//!
//! A finite read timeout is a per-line budget: once it elapses without a
//! terminator, the bytes accumulated so far are returned as-is and a warning
//! is logged (partial and empty results get distinct messages). `None` means
//! block until a terminator arrives or the cancellation flag is raised.

use crate::error::{Error, Result};
use crate::protocol::{MAX_LINE_LEN, TERMINATOR};
use crate::transport::{SerialTransport, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pause between polls when the device has no byte ready
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Line-oriented reader/writer over a byte-stream device
pub struct SerialLink {
    transport: Box<dyn Transport>,
    /// Per-line read budget; `None` blocks until a terminator arrives
    read_timeout: Option<Duration>,
    /// Pause after every write, giving the device time to settle
    write_delay: Duration,
    /// Verbose flag carried from configuration (reserved)
    debug: bool,
    /// Raised externally to interrupt blocking reads and settle delays
    cancel: Arc<AtomicBool>,
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("read_timeout", &self.read_timeout)
            .field("write_delay", &self.write_delay)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl SerialLink {
    /// Wrap an already-open transport
    pub fn new(
        transport: Box<dyn Transport>,
        read_timeout: Option<Duration>,
        write_delay: Duration,
        debug: bool,
    ) -> Self {
        SerialLink {
            transport,
            read_timeout,
            write_delay,
            debug,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Open a serial device and wrap it
    ///
    /// # Arguments
    /// * `path` - Serial port path (e.g., "/dev/ttyACM1")
    /// * `baud_rate` - Baud rate (e.g., 9600)
    /// * `read_timeout` - Per-line read budget, `None` for blocking reads
    /// * `write_delay` - Settle delay after each write
    /// * `debug` - Reserved verbose flag
    ///
    /// Fails with [`Error::InvalidParameter`] when `path` is empty.
    pub fn open(
        path: &str,
        baud_rate: u32,
        read_timeout: Option<Duration>,
        write_delay: Duration,
        debug: bool,
    ) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidParameter(
                "no serial device path given".to_string(),
            ));
        }
        let transport = SerialTransport::open(path, baud_rate)?;
        Ok(Self::new(
            Box::new(transport),
            read_timeout,
            write_delay,
            debug,
        ))
    }

    /// Shared flag interrupting blocking reads and settle delays
    ///
    /// Store `true` to make the current and all subsequent operations fail
    /// with [`Error::Cancelled`].
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Verbose flag carried from configuration (reserved, drives no output)
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Read one line, stripping the trailing newline
    pub fn read_line(&mut self) -> Result<Vec<u8>> {
        self.read_until(TERMINATOR)
    }

    /// Read bytes until `eol`, returning them with the terminator stripped
    ///
    /// Polls the device one byte at a time. With a finite read timeout the
    /// accumulated bytes are handed back once the budget is spent; without
    /// one the call blocks until a terminator or cancellation.
    pub fn read_until(&mut self, eol: u8) -> Result<Vec<u8>> {
        let started = Instant::now();
        let mut line: Vec<u8> = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }

            if self.transport.read(&mut byte)? > 0 {
                if byte[0] == eol {
                    log::debug!("Read line ({} bytes)", line.len());
                    return Ok(line);
                }
                line.push(byte[0]);
                if line.len() > MAX_LINE_LEN {
                    return Err(Error::LineTooLong {
                        max: MAX_LINE_LEN,
                        len: line.len(),
                    });
                }
                continue;
            }

            // No byte ready. Without a timeout keep polling; with one, hand
            // back whatever accumulated once the budget is spent.
            if let Some(timeout) = self.read_timeout {
                if started.elapsed() > timeout {
                    if line.is_empty() {
                        log::warn!("Read timed out after {:?} with no data", timeout);
                    } else {
                        log::warn!(
                            "Read timed out after {:?} with {} bytes and no terminator",
                            timeout,
                            line.len()
                        );
                    }
                    return Ok(line);
                }
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }

    /// Write `payload` verbatim, then pause for the settle delay
    ///
    /// Short writes are retried until the whole payload is on the wire; a
    /// device that rejects the write surfaces [`Error::WriteFailed`]. The
    /// settle delay runs even for an empty payload.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < payload.len() {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            match self.transport.write(&payload[written..]) {
                Ok(0) => {
                    return Err(Error::WriteFailed(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        "device accepted no bytes",
                    )))
                }
                Ok(n) => written += n,
                Err(Error::Io(e)) => return Err(Error::WriteFailed(e)),
                Err(e) => return Err(e),
            }
        }
        log::debug!("Wrote {} bytes", written);
        self.settle()
    }

    /// Sleep out the settle delay in slices so cancellation can cut it short
    fn settle(&self) -> Result<()> {
        let deadline = Instant::now() + self.write_delay;
        loop {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(Error::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            std::thread::sleep((deadline - now).min(POLL_INTERVAL));
        }
    }

    /// Replace the underlying device
    ///
    /// Discards anything buffered on the new device, input and output, so
    /// the next exchange starts from a clean wire.
    pub fn set_transport(&mut self, transport: Box<dyn Transport>) -> Result<()> {
        self.transport = transport;
        self.transport.clear_input()?;
        self.transport.clear_output()?;
        Ok(())
    }

    /// Borrow the underlying device
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Mutably borrow the underlying device
    pub fn transport_mut(&mut self) -> &mut dyn Transport {
        self.transport.as_mut()
    }

    /// Whether the underlying device handle is open
    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn link_with(
        mock: &MockTransport,
        read_timeout: Option<Duration>,
        write_delay: Duration,
    ) -> SerialLink {
        SerialLink::new(Box::new(mock.clone()), read_timeout, write_delay, false)
    }

    #[test]
    fn read_line_strips_terminator() {
        let mock = MockTransport::new();
        mock.inject_read(b"ACK command received\n");
        let mut link = link_with(&mock, Some(Duration::from_millis(100)), Duration::ZERO);
        assert_eq!(link.read_line().unwrap(), b"ACK command received");
    }

    #[test]
    fn read_line_returns_lines_in_order() {
        let mock = MockTransport::new();
        mock.inject_read(b"first\nsecond\n");
        let mut link = link_with(&mock, Some(Duration::from_millis(100)), Duration::ZERO);
        assert_eq!(link.read_line().unwrap(), b"first");
        assert_eq!(link.read_line().unwrap(), b"second");
    }

    #[test]
    fn read_until_honors_custom_terminator() {
        let mock = MockTransport::new();
        mock.inject_read(b"a;b\n;");
        let mut link = link_with(&mock, Some(Duration::from_millis(100)), Duration::ZERO);
        assert_eq!(link.read_until(b';').unwrap(), b"a");
        assert_eq!(link.read_until(b';').unwrap(), b"b\n");
    }

    #[test]
    fn timeout_returns_partial_line() {
        let mock = MockTransport::new();
        mock.inject_read(b"DAT 42");
        let mut link = link_with(&mock, Some(Duration::from_millis(20)), Duration::ZERO);
        assert_eq!(link.read_line().unwrap(), b"DAT 42");
    }

    #[test]
    fn timeout_with_no_data_returns_empty() {
        let mock = MockTransport::new();
        let mut link = link_with(&mock, Some(Duration::from_millis(20)), Duration::ZERO);
        assert_eq!(link.read_line().unwrap(), b"");
    }

    #[test]
    fn send_writes_payload_verbatim() {
        let mock = MockTransport::new();
        let mut link = link_with(&mock, None, Duration::ZERO);
        link.send(b"aq\n").unwrap();
        assert_eq!(mock.get_written(), b"aq\n");
    }

    #[test]
    fn send_waits_out_the_settle_delay() {
        let mock = MockTransport::new();
        let delay = Duration::from_millis(50);
        let mut link = link_with(&mock, None, delay);
        let started = Instant::now();
        link.send(b"aq\n").unwrap();
        assert!(started.elapsed() >= delay);
    }

    #[test]
    fn settle_delay_applies_to_empty_payload() {
        let mock = MockTransport::new();
        let delay = Duration::from_millis(50);
        let mut link = link_with(&mock, None, delay);
        let started = Instant::now();
        link.send(b"").unwrap();
        assert!(started.elapsed() >= delay);
    }

    #[test]
    fn failed_write_surfaces_write_failed() {
        let mock = MockTransport::new();
        mock.fail_writes(true);
        let mut link = link_with(&mock, None, Duration::ZERO);
        let err = link.send(b"aq\n").unwrap_err();
        assert!(matches!(err, Error::WriteFailed(_)));
    }

    #[test]
    fn cancel_interrupts_blocking_read() {
        let mock = MockTransport::new();
        let mut link = link_with(&mock, None, Duration::ZERO);
        let cancel = link.cancel_handle();
        let setter = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            cancel.store(true, Ordering::Relaxed);
        });
        assert!(matches!(link.read_line(), Err(Error::Cancelled)));
        setter.join().unwrap();
    }

    #[test]
    fn cancel_interrupts_settle_delay() {
        let mock = MockTransport::new();
        let mut link = link_with(&mock, None, Duration::from_secs(10));
        let cancel = link.cancel_handle();
        let setter = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            cancel.store(true, Ordering::Relaxed);
        });
        let started = Instant::now();
        assert!(matches!(link.send(b"aq\n"), Err(Error::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(10));
        setter.join().unwrap();
    }

    #[test]
    fn pre_set_cancel_fails_immediately() {
        let mock = MockTransport::new();
        mock.inject_read(b"ACK\n");
        let mut link = link_with(&mock, None, Duration::ZERO);
        link.cancel_handle().store(true, Ordering::Relaxed);
        assert!(matches!(link.read_line(), Err(Error::Cancelled)));
    }

    #[test]
    fn overlong_line_is_rejected() {
        let mock = MockTransport::new();
        mock.inject_read(&vec![b'x'; MAX_LINE_LEN + 1]);
        let mut link = link_with(&mock, None, Duration::ZERO);
        assert!(matches!(
            link.read_line(),
            Err(Error::LineTooLong { max: MAX_LINE_LEN, .. })
        ));
    }

    #[test]
    fn line_at_the_cap_still_goes_through() {
        let mock = MockTransport::new();
        let mut payload = vec![b'x'; MAX_LINE_LEN];
        payload.push(b'\n');
        mock.inject_read(&payload);
        let mut link = link_with(&mock, None, Duration::ZERO);
        assert_eq!(link.read_line().unwrap().len(), MAX_LINE_LEN);
    }

    #[test]
    fn set_transport_discards_stale_bytes() {
        let mock = MockTransport::new();
        let mut link = link_with(&mock, Some(Duration::from_millis(20)), Duration::ZERO);

        let replacement = MockTransport::new();
        replacement.inject_read(b"stale\n");
        link.set_transport(Box::new(replacement.clone())).unwrap();
        assert_eq!(replacement.pending_reads(), 0);
        assert_eq!(link.read_line().unwrap(), b"");
    }

    #[test]
    fn is_open_tracks_the_transport() {
        let mock = MockTransport::new();
        let link = link_with(&mock, None, Duration::ZERO);
        assert!(link.is_open());
        mock.set_open(false);
        assert!(!link.is_open());
    }

    #[test]
    fn open_rejects_empty_path() {
        let err = SerialLink::open("", 9600, None, Duration::ZERO, false).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }
}
