//! Command table: opcodes, names, and length classes of the app protocol.

use std::fmt;

/// Application status byte meaning success.
pub const STATUS_OK: u8 = 0x00;

/// Application status byte meaning failure.
pub const STATUS_BAD: u8 = 0x01;

/// Length class of a frame, encoded in the low two bits of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CmdLen {
    /// 1-byte command (code only).
    Len1 = 0,
    /// 4-byte command.
    Len4 = 1,
    /// 32-byte command.
    Len32 = 2,
    /// 128-byte command.
    Len128 = 3,
}

impl CmdLen {
    /// Number of bytes following the framing header.
    pub const fn byte_len(self) -> usize {
        match self {
            Self::Len1 => 1,
            Self::Len4 => 4,
            Self::Len32 => 32,
            Self::Len128 => 128,
        }
    }

    /// Decodes the two length bits of a header byte.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::Len1,
            1 => Self::Len4,
            2 => Self::Len32,
            _ => Self::Len128,
        }
    }
}

/// Destination of a frame on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Endpoint {
    /// First FPGA core. Not addressed by any app command.
    FpgaA = 0,
    /// Second FPGA core. Not addressed by any app command.
    FpgaB = 1,
    /// Firmware, used while no app is loaded.
    Firmware = 2,
    /// The loaded device app.
    App = 3,
}

impl Endpoint {
    /// Decodes the two endpoint bits of a header byte.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Self::FpgaA,
            1 => Self::FpgaB,
            2 => Self::Firmware,
            _ => Self::App,
        }
    }
}

/// A command or response understood by the random-generator app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppCmd {
    /// Command code, carried in the byte after the header.
    code: u8,
    /// Display name.
    name: &'static str,
    /// Length class of the frame.
    len: CmdLen,
}

impl AppCmd {
    /// Creates a command descriptor.
    pub const fn new(code: u8, name: &'static str, len: CmdLen) -> Self {
        Self { code, name, len }
    }

    /// Command code.
    pub const fn code(&self) -> u8 {
        self.code
    }

    /// Display name.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Length class.
    pub const fn cmd_len(&self) -> CmdLen {
        self.len
    }

    /// Endpoint the command is addressed to. Always the app.
    pub const fn endpoint(&self) -> Endpoint {
        Endpoint::App
    }
}

impl fmt::Display for AppCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Asks the app for its name and version.
pub const CMD_GET_NAME_VERSION: AppCmd = AppCmd::new(0x01, "cmdGetNameVersion", CmdLen::Len1);
/// Reply to [`CMD_GET_NAME_VERSION`].
pub const RSP_GET_NAME_VERSION: AppCmd = AppCmd::new(0x02, "rspGetNameVersion", CmdLen::Len32);
/// Asks the app for random bytes; the count goes in frame byte 2.
pub const CMD_GET_RANDOM: AppCmd = AppCmd::new(0x03, "cmdGetRandom", CmdLen::Len4);
/// Reply to [`CMD_GET_RANDOM`]: status at byte 2, data from byte 3.
pub const RSP_GET_RANDOM: AppCmd = AppCmd::new(0x04, "rspGetRandom", CmdLen::Len128);

/// Largest number of random bytes a single [`CMD_GET_RANDOM`] can return.
///
/// The response class length minus the response code and the status byte.
pub const RANDOM_PAYLOAD_MAX_BYTES: usize = RSP_GET_RANDOM.cmd_len().byte_len() - (1 + 1);
