//! Byte transport underneath a [`RandomGen`](crate::RandomGen) session.

use std::io::{self, Read, Write};
use std::time::Duration;

/// Line speed the TKey firmware uses.
pub const DEFAULT_SPEED: u32 = 62_500;

/// A connected, reliable, ordered byte stream to a TKey.
///
/// The session writes whole frames and reads them back with
/// [`Read::read_exact`]. An expired read timeout must surface as an
/// [`io::ErrorKind::TimedOut`] error rather than a zero-length read.
pub trait Transport: Read + Write {
    /// Bounds how long the next reads may block. `None` blocks forever.
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()>;

    /// Flushes pending output and releases the underlying handle.
    fn close(self) -> io::Result<()>
    where
        Self: Sized;
}
