//! Transport layer for serial I/O abstraction

use crate::error::Result;
use std::time::Duration;

mod serial;
pub use serial::SerialTransport;

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::MockTransport;

/// Transport trait for the physical link
///
/// A read that times out returns `Ok(0)`; any other failure is the
/// disconnect signal the reconnect supervisor acts on.
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 on timeout)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write the whole buffer
    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Change the read timeout (used to drain stale input during the
    /// handshake, then restore the configured timeout)
    fn set_timeout(&mut self, timeout: Duration) -> Result<()>;
}
