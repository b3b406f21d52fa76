//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock transport for unit testing
///
/// Clones share the same buffers, so a test can keep a handle while the
/// bridge owns another.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    timeout: Duration,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                timeout: Duration::from_millis(100),
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

    /// Bytes injected but not yet read
    pub fn pending_read(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.read_buffer.len()
    }

    /// Currently configured read timeout
    pub fn timeout(&self) -> Duration {
        let inner = self.inner.lock().unwrap();
        inner.timeout
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

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.timeout = timeout;
        Ok(())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_drains_in_order_across_partial_reads() {
        let mut mock = MockTransport::new();
        mock.inject_read(&[1, 2, 3, 4, 5]);

        let mut buf = [0u8; 2];
        assert_eq!(mock.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);

        let mut buf = [0u8; 8];
        assert_eq!(mock.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[3, 4, 5]);

        // Empty buffer reads as a timeout would
        assert_eq!(mock.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_writes_accumulate() {
        let mut mock = MockTransport::new();
        mock.write(&[0xAA]).unwrap();
        mock.write(&[0xBB, 0xCC]).unwrap();
        assert_eq!(mock.get_written(), vec![0xAA, 0xBB, 0xCC]);
    }
}
