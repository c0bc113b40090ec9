// crates/core/src/shared.rs
//! Cloneable handle to a stream
//!
//! Transports that take ownership of a body source (and may move it to
//! another thread) get a clone of the handle while the caller keeps its own,
//! so the very same stream can be rewound and reused on a retried request.

use crate::stream::{Capabilities, Stream};
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, lock-protected stream
#[derive(Clone)]
pub struct SharedStream {
    inner: Arc<Mutex<Box<dyn Stream + Send>>>,
    capabilities: Capabilities,
    stdout: bool,
}

impl SharedStream {
    /// Takes ownership of `stream`, capturing its capabilities now
    pub fn new<S: Stream + Send + 'static>(stream: S) -> Self {
        let capabilities = stream.capabilities();
        let stdout = stream.is_stdout();
        Self {
            inner: Arc::new(Mutex::new(Box::new(stream))),
            capabilities,
            stdout,
        }
    }

    /// Runs `f` with exclusive access to the stream
    pub fn with<T>(&self, f: impl FnOnce(&mut (dyn Stream + Send)) -> T) -> io::Result<T> {
        let mut guard = self.lock()?;
        Ok(f(&mut **guard))
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Box<dyn Stream + Send>>> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("shared stream lock poisoned"))
    }
}

impl Stream for SharedStream {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.lock()?.read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.lock()?.rewind()
    }

    fn close(&mut self) -> io::Result<()> {
        self.lock()?.close()
    }

    fn is_stdout(&self) -> bool {
        self.stdout
    }

    fn size_hint(&self) -> Option<u64> {
        self.lock().ok().and_then(|s| s.size_hint())
    }
}

impl fmt::Debug for SharedStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStream")
            .field("capabilities", &self.capabilities)
            .field("stdout", &self.stdout)
            .finish_non_exhaustive()
    }
}

/// Adapts a [`SharedStream`] to [`io::Read`] for APIs that want an owned reader
#[derive(Debug, Clone)]
pub struct SharedReader(SharedStream);

impl SharedReader {
    pub fn new(stream: SharedStream) -> Self {
        Self(stream)
    }
}

impl io::Read for SharedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Stream::read(&mut self.0, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{SeekableReader, StdoutStream};
    use std::io::Cursor;

    #[test]
    fn test_clones_share_position() {
        let mut a = SharedStream::new(SeekableReader::new(Cursor::new(b"abcdef".to_vec())).unwrap());
        let mut b = a.clone();
        let mut buf = [0u8; 3];

        a.read(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
        b.read(&mut buf).unwrap();
        assert_eq!(&buf, b"def");

        a.rewind().unwrap();
        b.read(&mut buf).unwrap();
        assert_eq!(&buf, b"abc");
    }

    #[test]
    fn test_capabilities_captured() {
        let s = SharedStream::new(StdoutStream::new());
        assert!(s.is_stdout());
        assert!(s.capabilities().write);
        assert!(!s.capabilities().read);
    }

    #[test]
    fn test_size_hint_forwarded() {
        let s = SharedStream::new(SeekableReader::new(Cursor::new(vec![0u8; 9])).unwrap());
        assert_eq!(s.size_hint(), Some(9));
        assert_eq!(s.with(|inner| inner.size_hint()).unwrap(), Some(9));
    }

    #[test]
    fn test_shared_reader() {
        use std::io::Read;

        let s = SharedStream::new(SeekableReader::new(Cursor::new(b"xyz".to_vec())).unwrap());
        let mut out = Vec::new();
        SharedReader::new(s).read_to_end(&mut out).unwrap();
        assert_eq!(out, b"xyz");
    }
}
