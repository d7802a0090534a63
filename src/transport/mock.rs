//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Mock transport for unit testing
///
/// Clones share the same buffers, so a test can keep one handle for
/// injecting reads and inspecting writes while the link owns another.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    open: bool,
    fail_writes: bool,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                open: true,
                fail_writes: false,
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.read_buffer.extend(data);
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        let inner = self.inner.lock().unwrap();
        inner.write_buffer.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.clear();
    }

    /// Number of injected bytes not yet read
    pub fn pending_reads(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.read_buffer.len()
    }

    /// Mark the transport open or closed
    pub fn set_open(&self, open: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.open = open;
    }

    /// Make subsequent writes fail
    pub fn fail_writes(&self, fail: bool) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_writes = fail;
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        let available = inner.read_buffer.len().min(buffer.len());

        for item in buffer.iter_mut().take(available) {
            *item = inner.read_buffer.pop_front().unwrap();
        }

        Ok(available)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_writes {
            return Err(
                std::io::Error::new(std::io::ErrorKind::BrokenPipe, "mock write failure").into(),
            );
        }
        inner.write_buffer.extend_from_slice(data);
        Ok(data.len())
    }

    fn clear_input(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.read_buffer.clear();
        Ok(())
    }

    fn clear_output(&mut self) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.clear();
        Ok(())
    }

    fn is_open(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.open
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
