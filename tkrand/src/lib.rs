//! Host-side client for the random-generator app on a Tillitis TKey.
//!
//! `tkrand` speaks the app's fixed-frame protocol (see [`tkrand_proto`])
//! over any [`Transport`], and ships a [`SerialPort`] transport for a TKey
//! plugged in over USB.
//!
//! # Quick start
//!
//! ```no_run
//! use tkrand::{RandomGen, SerialConfig, SerialPort};
//!
//! let port = SerialPort::open(&SerialConfig::new("/dev/ttyACM0"))?;
//! let mut rng = RandomGen::new(port);
//!
//! let app = rng.get_app_name_version();
//! let bytes = rng.get_random(16);
//! // Close on every path, then look at the results.
//! rng.close()?;
//!
//! println!("{}: {:02x?}", app?, bytes?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod error;
#[cfg(unix)]
mod serial;
mod transport;

pub use client::RandomGen;
pub use error::{Error, Result};
#[cfg(unix)]
pub use serial::{SerialConfig, SerialPort};
pub use tkrand_proto::{NameVersion, RANDOM_PAYLOAD_MAX_BYTES};
pub use transport::{DEFAULT_SPEED, Transport};
