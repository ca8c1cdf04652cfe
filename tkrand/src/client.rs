//! Host-side session with the random-generator app running on a TKey.
//!
//! Each call writes one request frame and reads one response frame. A
//! session is not shared: every operation takes `&mut self`, so requests
//! on one transport can never interleave and confuse the id check.

use std::time::Duration;

use tkrand_proto::{
    AppCmd, CMD_GET_NAME_VERSION, CMD_GET_RANDOM, CmdLen, FrameError, FrameHeader, NameVersion,
    RANDOM_PAYLOAD_MAX_BYTES, RSP_GET_NAME_VERSION, RSP_GET_RANDOM, STATUS_OK,
};

use crate::error::{Error, Result};
use crate::transport::Transport;

/// Transaction id used for every request.
const FRAME_ID: u8 = 2;

/// How long the app gets to answer a name/version query.
const NAME_VERSION_TIMEOUT: Duration = Duration::from_secs(2);

/// Offset of the status byte in a response frame.
const STATUS_OFFSET: usize = 2;

/// Offset of the random data in a [`RSP_GET_RANDOM`] frame.
const RANDOM_DATA_OFFSET: usize = 3;

/// A session with the random-generator app.
///
/// Takes an already-connected transport:
///
/// ```no_run
/// use tkrand::{RandomGen, SerialPort};
///
/// let port = SerialPort::open_path("/dev/ttyACM0")?;
/// let mut rng = RandomGen::new(port);
/// let bytes = rng.get_random(32);
/// rng.close()?;
/// assert_eq!(bytes?.len(), 32);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct RandomGen<T> {
    /// Connection to the TKey.
    transport: T,
}

impl<T: Transport> RandomGen<T> {
    /// Wraps a connected transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Closes the connection to the TKey.
    pub fn close(self) -> Result<()> {
        self.transport.close().map_err(Error::Close)
    }

    /// Shared access to the transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the transport.
    pub const fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwraps the session without closing the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Gets the name and version of the running app.
    ///
    /// Waits at most two seconds for the answer. The transport is back in
    /// blocking mode when this returns, whether or not it succeeded.
    pub fn get_app_name_version(&mut self) -> Result<NameVersion> {
        let tx = tkrand_proto::new_frame(&CMD_GET_NAME_VERSION, FRAME_ID)?;
        self.write_frame(&CMD_GET_NAME_VERSION, &tx)?;

        let rx = self.read_frame(&RSP_GET_NAME_VERSION, FRAME_ID, Some(NAME_VERSION_TIMEOUT))?;

        NameVersion::unpack(&rx[STATUS_OFFSET..]).ok_or(Error::Frame(FrameError::Truncated {
            expected: STATUS_OFFSET + NameVersion::PACKED_LEN,
            got: rx.len(),
        }))
    }

    /// Fetches `count` random bytes from the app.
    ///
    /// `count` must be in `[1, RANDOM_PAYLOAD_MAX_BYTES]`; anything else
    /// fails before touching the transport. Blocks for as long as the
    /// transport's own read timeout allows.
    pub fn get_random(&mut self, count: usize) -> Result<Vec<u8>> {
        if !(1..=RANDOM_PAYLOAD_MAX_BYTES).contains(&count) {
            return Err(Error::OutOfRange {
                count,
                max: RANDOM_PAYLOAD_MAX_BYTES,
            });
        }

        let mut tx = tkrand_proto::new_frame(&CMD_GET_RANDOM, FRAME_ID)?;
        // Checked against RANDOM_PAYLOAD_MAX_BYTES above.
        tx[2] = u8::try_from(count).map_err(|_| Error::OutOfRange {
            count,
            max: RANDOM_PAYLOAD_MAX_BYTES,
        })?;
        self.write_frame(&CMD_GET_RANDOM, &tx)?;

        let rx = self.read_frame(&RSP_GET_RANDOM, FRAME_ID, None)?;

        let status = rx[STATUS_OFFSET];
        if status != STATUS_OK {
            tracing::debug!(status, "{RSP_GET_RANDOM} NOK");
            return Err(Error::DeviceStatus { status });
        }

        let n = count.min(RANDOM_PAYLOAD_MAX_BYTES);
        Ok(rx[RANDOM_DATA_OFFSET..RANDOM_DATA_OFFSET + n].to_vec())
    }

    /// Writes a complete request frame.
    fn write_frame(&mut self, cmd: &AppCmd, tx: &[u8]) -> Result<()> {
        tracing::trace!(cmd = %cmd, tx = %hex::encode(tx), "write frame");
        self.transport.write_all(tx).map_err(Error::Write)?;
        self.transport.flush().map_err(Error::Write)
    }

    /// Reads and validates one `rsp` frame for transaction `id`.
    ///
    /// With `timeout` set, the read is bounded and the transport is put
    /// back into blocking mode before returning, on every path.
    fn read_frame(&mut self, rsp: &AppCmd, id: u8, timeout: Option<Duration>) -> Result<Vec<u8>> {
        let Some(limit) = timeout else {
            return self.read_frame_blocking(rsp, id);
        };

        self.transport
            .set_read_timeout(Some(limit))
            .map_err(Error::Timeout)?;
        let rx = self.read_frame_blocking(rsp, id);
        let restored = self.transport.set_read_timeout(None);

        let rx = rx?;
        restored.map_err(Error::Timeout)?;
        Ok(rx)
    }

    /// Reads one frame under whatever timeout the transport has.
    ///
    /// A frame rejected on its header byte is still read to the end, so
    /// the next call starts on a frame boundary.
    fn read_frame_blocking(&mut self, rsp: &AppCmd, id: u8) -> Result<Vec<u8>> {
        let mut first = [0u8; 1];
        self.transport
            .read_exact(&mut first)
            .map_err(Error::Read)?;

        let hdr = match FrameHeader::parse(first[0]) {
            Ok(hdr) if hdr.cmd_len == rsp.cmd_len() => hdr,
            Ok(hdr) => {
                self.discard_body(first[0]);
                return Err(FrameError::UnexpectedLen {
                    expected: rsp.cmd_len(),
                    got: hdr.cmd_len,
                }
                .into());
            }
            Err(e) => {
                self.discard_body(first[0]);
                return Err(e.into());
            }
        };

        let mut rx = vec![0u8; hdr.frame_len()];
        rx[0] = first[0];
        self.transport
            .read_exact(&mut rx[1..])
            .map_err(Error::Read)?;
        tracing::trace!(rsp = %rsp, rx = %hex::encode(&rx), "read frame");

        tkrand_proto::check_frame(&rx, rsp, id).inspect_err(|e| {
            tracing::debug!(rsp = %rsp, error = %e, "rejected frame");
        })?;
        Ok(rx)
    }

    /// Reads and drops the body of the frame whose header byte is `first`.
    ///
    /// The length bits decode even when the rest of the header is invalid.
    fn discard_body(&mut self, first: u8) {
        let mut body = vec![0u8; CmdLen::from_bits(first).byte_len()];
        match self.transport.read_exact(&mut body) {
            Ok(()) => {
                tracing::debug!(header = first, body = %hex::encode(&body), "discarded frame");
            }
            Err(e) => tracing::debug!(header = first, error = %e, "discarding frame body failed"),
        }
    }
}
