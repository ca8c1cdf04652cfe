//! Serial-port [`Transport`] for a TKey attached as a USB CDC-ACM device.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::AsFd;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::poll::{PollFd, PollFlags, PollTimeout, poll};
use nix::sys::termios::{
    self, BaudRate, ControlFlags, SetArg, SpecialCharacterIndices, cfmakeraw,
};

use crate::transport::{DEFAULT_SPEED, Transport};

/// Where and how to open the serial line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device node, e.g. `/dev/ttyACM0`.
    pub path: PathBuf,
    /// Baud rate.
    pub speed: u32,
}

impl SerialConfig {
    /// Configuration for `path` at [`DEFAULT_SPEED`].
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            speed: DEFAULT_SPEED,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }
}

/// An open serial line in raw 8N1 mode.
#[derive(Debug)]
pub struct SerialPort {
    /// Device file.
    file: File,
    /// Current read timeout; `None` blocks.
    timeout: Option<Duration>,
}

impl SerialPort {
    /// Opens and configures the port described by `config`.
    pub fn open(config: &SerialConfig) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_NOCTTY)
            .open(&config.path)?;

        let mut tio = termios::tcgetattr(&file)?;
        cfmakeraw(&mut tio);
        tio.control_flags |= ControlFlags::CS8 | ControlFlags::CLOCAL | ControlFlags::CREAD;
        tio.control_flags &= !(ControlFlags::PARENB | ControlFlags::CSTOPB | ControlFlags::CRTSCTS);
        tio.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
        tio.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
        match baud_rate(config.speed) {
            Some(rate) => termios::cfsetspeed(&mut tio, rate)?,
            // CDC-ACM ignores the line speed, so the device keeps working.
            None => tracing::debug!(
                speed = config.speed,
                "non-standard baud rate, leaving line speed unchanged"
            ),
        }
        termios::tcsetattr(&file, SetArg::TCSANOW, &tio)?;
        termios::tcflush(&file, termios::FlushArg::TCIOFLUSH)?;

        tracing::debug!(path = %config.path.display(), speed = config.speed, "serial port open");
        Ok(Self {
            file,
            timeout: None,
        })
    }

    /// Opens `path` at [`DEFAULT_SPEED`].
    pub fn open_path(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::open(&SerialConfig::new(path.as_ref()))
    }

    /// Current read timeout.
    pub const fn read_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Waits until the port is readable or the timeout expires.
    fn wait_readable(&self, timeout: Duration) -> io::Result<()> {
        let ms = i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX);
        let poll_timeout = PollTimeout::try_from(ms).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "poll timeout out of range")
        })?;
        let mut fds = [PollFd::new(self.file.as_fd(), PollFlags::POLLIN)];
        loop {
            match poll(&mut fds, poll_timeout) {
                Ok(0) => return Err(io::Error::new(io::ErrorKind::TimedOut, "read timeout")),
                Ok(_) => return Ok(()),
                Err(nix::errno::Errno::EINTR) => {}
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(timeout) = self.timeout {
            self.wait_readable(timeout)?;
        }
        self.file.read(buf)
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Transport for SerialPort {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        if timeout == Some(Duration::ZERO) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "zero read timeout",
            ));
        }
        self.timeout = timeout;
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        termios::tcdrain(&self.file)?;
        drop(self.file);
        Ok(())
    }
}

/// Maps a numeric speed to a termios rate, if it is a standard one.
fn baud_rate(speed: u32) -> Option<BaudRate> {
    Some(match speed {
        9_600 => BaudRate::B9600,
        19_200 => BaudRate::B19200,
        38_400 => BaudRate::B38400,
        57_600 => BaudRate::B57600,
        115_200 => BaudRate::B115200,
        230_400 => BaudRate::B230400,
        _ => return None,
    })
}
