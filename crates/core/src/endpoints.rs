// crates/core/src/endpoints.rs
//! Stream endpoints backed by `std::io` types
//!
//! Each wrapper declares its capabilities from the traits its inner value
//! implements, so the check happens when the endpoint is built.

use crate::stream::{Capabilities, Stream};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Forward-only source over any [`Read`]
#[derive(Debug)]
pub struct ReadStream<R> {
    inner: R,
}

impl<R: Read> ReadStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Stream for ReadStream<R> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::readable()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Forward-only sink over any [`Write`]; `close` flushes
#[derive(Debug)]
pub struct WriteStream<W> {
    inner: W,
}

impl<W: Write> WriteStream<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Stream for WriteStream<W> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::writable()
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Rewindable source that also reports its total length
#[derive(Debug)]
pub struct SeekableReader<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> SeekableReader<R> {
    /// Wraps `inner`, measuring its length without moving its position
    pub fn new(mut inner: R) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, len })
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl SeekableReader<File> {
    /// Opens a file for streaming as a request body
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> Stream for SeekableReader<R> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::readable().with_rewind()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.len)
    }
}

/// Rewindable sink; `close` flushes
#[derive(Debug)]
pub struct SeekableWriter<W> {
    inner: W,
}

impl<W: Write + Seek> SeekableWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl SeekableWriter<File> {
    /// Creates (or truncates) a file to receive a response body
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

impl<W: Write + Seek> Stream for SeekableWriter<W> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::writable().with_rewind()
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(0)).map(|_| ())
    }

    fn close(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// The process standard output.
///
/// It nominally supports rewind (as a no-op) like any terminal handle, but
/// reports [`Stream::is_stdout`] so callers never rely on repositioning it.
#[derive(Debug, Default)]
pub struct StdoutStream {
    _priv: (),
}

impl StdoutStream {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stream for StdoutStream {
    fn capabilities(&self) -> Capabilities {
        Capabilities::writable().with_rewind()
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }

    fn is_stdout(&self) -> bool {
        true
    }
}
