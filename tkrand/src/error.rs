//! Error types for tkrand operations.

use std::io;

use tkrand_proto::FrameError;

/// Alias for `Result<T, tkrand::Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`RandomGen`](crate::RandomGen) operations.
///
/// Transport failures keep the step that failed, so a caller can tell a
/// write that never reached the device from a response that never came.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A frame could not be built, or the response failed validation.
    #[error("frame: {0}")]
    Frame(#[from] FrameError),

    /// Writing the request frame failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// Reading the response frame failed or timed out.
    #[error("read frame: {0}")]
    Read(#[source] io::Error),

    /// Arming or disarming the read timeout failed.
    #[error("set read timeout: {0}")]
    Timeout(#[source] io::Error),

    /// Closing the transport failed.
    #[error("close: {0}")]
    Close(#[source] io::Error),

    /// Requested byte count is outside `[1, max]`.
    #[error("number of bytes {count} is not in [1,{max}]")]
    OutOfRange {
        /// Requested count.
        count: usize,
        /// Largest count a single request can return.
        max: usize,
    },

    /// The app answered with a status other than OK.
    #[error("device status not OK (0x{status:02x})")]
    DeviceStatus {
        /// Status byte from the response.
        status: u8,
    },
}

impl Error {
    /// Returns `true` if the device did not answer before the read timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Read(e) if e.kind() == io::ErrorKind::TimedOut)
    }
}
