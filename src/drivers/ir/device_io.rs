use std::{
    fmt::Debug,
    fs::{File, OpenOptions},
    io::{self, Write},
    os::fd::AsRawFd,
    path::{Path, PathBuf},
};

use super::protocol::Request;

/// Open transceiver control device. Dropping it closes the descriptor.
pub trait Transceiver: Send {
    /// Issues a control request. Get requests return the device's value,
    /// set requests return the value that was sent.
    fn control(&mut self, request: Request) -> io::Result<u32>;

    /// Writes the payload with a single write call.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
}

/// Opens the transceiver for one transmission.
pub trait TransceiverOpener: Send + Sync + Debug {
    fn open(&self) -> io::Result<Box<dyn Transceiver>>;

    /// Device node this opener targets.
    fn path(&self) -> &Path;
}

/// LIRC character device.
#[derive(Debug)]
pub struct LircDevice {
    file: File,
}

impl Transceiver for LircDevice {
    fn control(&mut self, request: Request) -> io::Result<u32> {
        let mut value = request.argument().unwrap_or(0);
        // SAFETY: every LIRC request used here reads or writes exactly one
        // u32 through the pointer, and `value` outlives the call.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                request.code() as _,
                &mut value as *mut u32,
            )
        };
        if ret < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(value)
        }
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }
}

/// Opens a [`LircDevice`] read-write at a fixed path.
#[derive(Debug, Clone)]
pub struct LircOpener {
    path: PathBuf,
}

impl LircOpener {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TransceiverOpener for LircOpener {
    fn open(&self) -> io::Result<Box<dyn Transceiver>> {
        let file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        Ok(Box::new(LircDevice { file }))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
