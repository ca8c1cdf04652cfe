//! Wire protocol for the TKey random-generator app.
//!
//! Every exchange is one fixed-size frame in each direction: a 1-byte
//! framing header, a 1-byte command code, then a payload whose size is
//! fixed by the frame's length class (see [`CmdLen`]). This crate only
//! builds and checks frames; moving them over a serial line is left to
//! the caller.

mod cmd;
mod codec;
mod message;

pub use cmd::{
    AppCmd, CMD_GET_NAME_VERSION, CMD_GET_RANDOM, CmdLen, Endpoint, RANDOM_PAYLOAD_MAX_BYTES,
    RSP_GET_NAME_VERSION, RSP_GET_RANDOM, STATUS_BAD, STATUS_OK,
};
pub use codec::{FrameError, FrameHeader, MAX_ID, check_frame, new_frame};
pub use message::NameVersion;
