// crates/core/src/stream.rs
//! Byte stream contract shared by endpoints and decorators

use crate::error::{unsupported, Operation};
use std::io;

/// Operations a stream declares it can perform.
///
/// Capabilities are fixed when the stream is built. Callers check them before
/// invoking an optional operation instead of probing by trial and error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `read` yields bytes
    pub read: bool,
    /// `write` accepts bytes
    pub write: bool,
    /// `rewind` repositions to the start
    pub rewind: bool,
}

impl Capabilities {
    /// A stream that supports nothing but `close`
    pub const NONE: Capabilities = Capabilities {
        read: false,
        write: false,
        rewind: false,
    };

    /// Read-only, forward-only
    pub const fn readable() -> Self {
        Self {
            read: true,
            write: false,
            rewind: false,
        }
    }

    /// Write-only, forward-only
    pub const fn writable() -> Self {
        Self {
            read: false,
            write: true,
            rewind: false,
        }
    }

    /// Adds rewind support
    pub const fn with_rewind(mut self) -> Self {
        self.rewind = true;
        self
    }

    /// Returns true if the given operation is supported
    pub fn supports(&self, op: Operation) -> bool {
        match op {
            Operation::Read => self.read,
            Operation::Write => self.write,
            Operation::Rewind => self.rewind,
            Operation::Close => true,
        }
    }
}

/// A byte-oriented endpoint.
///
/// Every optional operation has a default that fails with
/// [`io::ErrorKind::Unsupported`]; implementors override what they declare in
/// [`Stream::capabilities`]. `close` defaults to a no-op.
pub trait Stream {
    /// What this stream can do
    fn capabilities(&self) -> Capabilities;

    /// Reads up to `buf.len()` bytes. Returning fewer bytes is valid; zero means
    /// end of stream.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let _ = buf;
        Err(unsupported(Operation::Read))
    }

    /// Writes some prefix of `buf` and returns how many bytes were accepted.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let _ = buf;
        Err(unsupported(Operation::Write))
    }

    /// Repositions the stream at its start.
    fn rewind(&mut self) -> io::Result<()> {
        Err(unsupported(Operation::Rewind))
    }

    /// Releases the stream. Further use is unspecified.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// True only for the process standard output endpoint.
    fn is_stdout(&self) -> bool {
        false
    }

    /// Total length in bytes, when the endpoint can report it.
    fn size_hint(&self) -> Option<u64> {
        None
    }

    /// Writes the whole buffer, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "stream accepted zero bytes",
                    ))
                }
                Ok(n) => buf = &buf[n..],
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl<S: Stream + ?Sized> Stream for &mut S {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn is_stdout(&self) -> bool {
        (**self).is_stdout()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn capabilities(&self) -> Capabilities {
        (**self).capabilities()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (**self).write(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        (**self).rewind()
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }

    fn is_stdout(&self) -> bool {
        (**self).is_stdout()
    }

    fn size_hint(&self) -> Option<u64> {
        (**self).size_hint()
    }
}
