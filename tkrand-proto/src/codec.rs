//! Fixed-size frame codec.
//!
//! A frame is `[header][code][payload...]`, `1 + CmdLen::byte_len()` bytes
//! in total. Header layout, MSB first:
//!
//! ```text
//!   7    6..5   4..3       2           1..0
//! [ 0 |  id  | endpoint | not-ok | length class ]
//! ```

use crate::cmd::{AppCmd, CmdLen, Endpoint};

/// Highest transaction id that fits in the header.
pub const MAX_ID: u8 = 3;

/// A frame that could not be built or did not match the expected response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FrameError {
    /// Transaction id does not fit in two bits.
    #[error("frame id {0} is out of range [0,3]")]
    InvalidId(u8),

    /// No bytes at all where a frame was expected.
    #[error("empty frame")]
    Empty,

    /// Header bit 7 must be zero.
    #[error("reserved bit set in frame header 0x{0:02x}")]
    ReservedBit(u8),

    /// The device flagged the frame itself as not OK.
    #[error("response status not OK")]
    ResponseNotOk,

    /// Length class differs from the one the response must have.
    #[error("expected cmdlen {expected:?} but got {got:?}")]
    UnexpectedLen {
        /// Class of the expected response.
        expected: CmdLen,
        /// Class in the received header.
        got: CmdLen,
    },

    /// Buffer is not as long as its length class says.
    #[error("frame is {got} bytes, expected {expected}")]
    Truncated {
        /// Full frame length implied by the header.
        expected: usize,
        /// Bytes actually present.
        got: usize,
    },

    /// Response belongs to another transaction.
    #[error("expected frame id {expected} but got {got}")]
    IdMismatch {
        /// Id used for the request.
        expected: u8,
        /// Id in the response header.
        got: u8,
    },

    /// Response did not come from the app endpoint.
    #[error("expected app endpoint but got {0:?}")]
    UnexpectedEndpoint(Endpoint),

    /// Response code is not the one the request calls for.
    #[error("expected {expected} (0x{code:02x}) code byte but got 0x{got:02x}")]
    UnexpectedCode {
        /// Name of the expected response.
        expected: &'static str,
        /// Code of the expected response.
        code: u8,
        /// Code in the received frame.
        got: u8,
    },
}

/// Decoded framing header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Transaction id, `0..=MAX_ID`.
    pub id: u8,
    /// Addressed endpoint.
    pub endpoint: Endpoint,
    /// Set by the device when it rejected the frame.
    pub response_not_ok: bool,
    /// Length class of the frame body.
    pub cmd_len: CmdLen,
}

impl FrameHeader {
    /// Parses a header byte.
    pub const fn parse(b: u8) -> Result<Self, FrameError> {
        if b & 0x80 != 0 {
            return Err(FrameError::ReservedBit(b));
        }
        Ok(Self {
            id: (b & 0x60) >> 5,
            endpoint: Endpoint::from_bits((b & 0x18) >> 3),
            response_not_ok: b & 0x04 != 0,
            cmd_len: CmdLen::from_bits(b),
        })
    }

    /// Encodes the header byte. `id` is masked to two bits.
    pub const fn encode(&self) -> u8 {
        let not_ok = if self.response_not_ok { 0x04 } else { 0 };
        ((self.id & MAX_ID) << 5) | ((self.endpoint as u8) << 3) | not_ok | self.cmd_len as u8
    }

    /// Total frame length, header included.
    pub const fn frame_len(&self) -> usize {
        1 + self.cmd_len.byte_len()
    }
}

/// Allocates a zeroed frame for `cmd` with header and code filled in.
///
/// Payload bytes start at offset 2 and are left for the caller to write.
pub fn new_frame(cmd: &AppCmd, id: u8) -> Result<Vec<u8>, FrameError> {
    if id > MAX_ID {
        return Err(FrameError::InvalidId(id));
    }
    let hdr = FrameHeader {
        id,
        endpoint: cmd.endpoint(),
        response_not_ok: false,
        cmd_len: cmd.cmd_len(),
    };
    let mut tx = vec![0u8; hdr.frame_len()];
    tx[0] = hdr.encode();
    tx[1] = cmd.code();
    Ok(tx)
}

/// Checks that `rx` is a complete `expected` response to transaction `id`.
pub fn check_frame(rx: &[u8], expected: &AppCmd, id: u8) -> Result<FrameHeader, FrameError> {
    let &first = rx.first().ok_or(FrameError::Empty)?;
    let hdr = FrameHeader::parse(first)?;

    if hdr.response_not_ok {
        return Err(FrameError::ResponseNotOk);
    }
    if hdr.cmd_len != expected.cmd_len() {
        return Err(FrameError::UnexpectedLen {
            expected: expected.cmd_len(),
            got: hdr.cmd_len,
        });
    }
    if rx.len() != hdr.frame_len() {
        return Err(FrameError::Truncated {
            expected: hdr.frame_len(),
            got: rx.len(),
        });
    }
    if hdr.id != id {
        return Err(FrameError::IdMismatch {
            expected: id,
            got: hdr.id,
        });
    }
    if hdr.endpoint != expected.endpoint() {
        return Err(FrameError::UnexpectedEndpoint(hdr.endpoint));
    }
    if rx[1] != expected.code() {
        return Err(FrameError::UnexpectedCode {
            expected: expected.name(),
            code: expected.code(),
            got: rx[1],
        });
    }
    Ok(hdr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CMD_GET_NAME_VERSION, CMD_GET_RANDOM, RSP_GET_NAME_VERSION, RSP_GET_RANDOM};

    fn response(cmd: &AppCmd, id: u8) -> Vec<u8> {
        new_frame(cmd, id).unwrap()
    }

    #[test]
    fn request_layout() {
        let tx = new_frame(&CMD_GET_NAME_VERSION, 2).unwrap();
        // id 2, app endpoint, Len1.
        assert_eq!(tx, vec![0x58, 0x01]);

        let tx = new_frame(&CMD_GET_RANDOM, 2).unwrap();
        assert_eq!(tx.len(), 5);
        assert_eq!(tx[0], 0x59);
        assert_eq!(tx[1], 0x03);
        assert!(tx[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_id_over_two_bits() {
        assert_eq!(
            new_frame(&CMD_GET_RANDOM, 4),
            Err(FrameError::InvalidId(4))
        );
    }

    #[test]
    fn header_parse_matches_encode() {
        for id in 0..=MAX_ID {
            for endpoint in [
                Endpoint::FpgaA,
                Endpoint::FpgaB,
                Endpoint::Firmware,
                Endpoint::App,
            ] {
                for cmd_len in [CmdLen::Len1, CmdLen::Len4, CmdLen::Len32, CmdLen::Len128] {
                    for response_not_ok in [false, true] {
                        let hdr = FrameHeader {
                            id,
                            endpoint,
                            response_not_ok,
                            cmd_len,
                        };
                        assert_eq!(FrameHeader::parse(hdr.encode()), Ok(hdr));
                    }
                }
            }
        }
    }

    #[test]
    fn header_rejects_reserved_bit() {
        assert_eq!(FrameHeader::parse(0x80), Err(FrameError::ReservedBit(0x80)));
        assert_eq!(
            FrameHeader::parse(0x08).map(|h| h.endpoint),
            Ok(Endpoint::FpgaB)
        );
    }

    #[test]
    fn accepts_matching_response() {
        let rx = response(&RSP_GET_RANDOM, 2);
        let hdr = check_frame(&rx, &RSP_GET_RANDOM, 2).unwrap();
        assert_eq!(hdr.id, 2);
        assert_eq!(hdr.cmd_len, CmdLen::Len128);
    }

    #[test]
    fn rejects_other_transaction() {
        let rx = response(&RSP_GET_RANDOM, 1);
        assert_eq!(
            check_frame(&rx, &RSP_GET_RANDOM, 2),
            Err(FrameError::IdMismatch {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn rejects_other_response_code() {
        // Same length class, wrong code.
        let mut rx = response(&RSP_GET_NAME_VERSION, 2);
        rx[1] = 0x7f;
        assert!(matches!(
            check_frame(&rx, &RSP_GET_NAME_VERSION, 2),
            Err(FrameError::UnexpectedCode { got: 0x7f, .. })
        ));
    }

    #[test]
    fn rejects_other_length_class() {
        let rx = response(&RSP_GET_NAME_VERSION, 2);
        assert_eq!(
            check_frame(&rx, &RSP_GET_RANDOM, 2),
            Err(FrameError::UnexpectedLen {
                expected: CmdLen::Len128,
                got: CmdLen::Len32
            })
        );
    }

    #[test]
    fn rejects_short_and_empty_frames() {
        let rx = response(&RSP_GET_RANDOM, 2);
        assert_eq!(
            check_frame(&rx[..64], &RSP_GET_RANDOM, 2),
            Err(FrameError::Truncated {
                expected: 129,
                got: 64
            })
        );
        assert_eq!(check_frame(&[], &RSP_GET_RANDOM, 2), Err(FrameError::Empty));
    }

    #[test]
    fn rejects_not_ok_and_foreign_endpoint() {
        let mut rx = response(&RSP_GET_RANDOM, 2);
        rx[0] |= 0x04;
        assert_eq!(
            check_frame(&rx, &RSP_GET_RANDOM, 2),
            Err(FrameError::ResponseNotOk)
        );

        let mut rx = response(&RSP_GET_RANDOM, 2);
        // Firmware endpoint instead of app.
        rx[0] = (rx[0] & !0x18) | (2 << 3);
        assert_eq!(
            check_frame(&rx, &RSP_GET_RANDOM, 2),
            Err(FrameError::UnexpectedEndpoint(Endpoint::Firmware))
        );
    }
}
