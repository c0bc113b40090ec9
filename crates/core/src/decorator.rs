// crates/core/src/decorator.rs
//! Transparent stream decorator
//!
//! [`Decorated`] owns an inner stream and forwards every operation to it. The
//! only behavior it adds comes from a [`StreamHook`], which may bound the size of
//! a single transfer and observe what was moved, rewound or closed. Capability
//! queries are forwarded verbatim, so a decorated stream can stand in for its
//! inner stream anywhere.

use crate::stream::{Capabilities, Stream};
use std::io;

/// Direction of a transfer observed by a hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

/// Behavior layered onto a stream by [`Decorated`].
///
/// Hooks never fail: a hook that cannot do its job (e.g. the console is gone)
/// degrades silently and the transfer goes on.
pub trait StreamHook {
    /// Largest number of bytes a single read or write may move.
    fn chunk_limit(&self) -> Option<usize> {
        None
    }

    /// Called after the inner stream moved `bytes` bytes.
    fn after_transfer(&mut self, direction: Direction, bytes: usize) {
        let _ = (direction, bytes);
    }

    /// Called on every rewind, whether or not the inner stream can rewind.
    fn on_rewind(&mut self) {}

    /// Called before the inner stream is closed.
    fn on_close(&mut self) {}
}

/// A stream wrapped with a hook
#[derive(Debug)]
pub struct Decorated<S, H> {
    inner: S,
    hook: H,
}

impl<S: Stream, H: StreamHook> Decorated<S, H> {
    /// Wraps `inner` with `hook`
    pub fn with_hook(inner: S, hook: H) -> Self {
        Self { inner, hook }
    }
}

impl<S, H> Decorated<S, H> {
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn hook(&self) -> &H {
        &self.hook
    }

    /// Replaces the hook, keeping the inner stream
    pub fn map_hook<H2>(self, f: impl FnOnce(H) -> H2) -> Decorated<S, H2> {
        Decorated {
            inner: self.inner,
            hook: f(self.hook),
        }
    }

    /// Unwraps the decorator, returning the inner stream
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn clamp(len: usize, limit: Option<usize>) -> usize {
        match limit {
            Some(limit) => len.min(limit),
            None => len,
        }
    }
}

impl<S: Stream, H: StreamHook> Stream for Decorated<S, H> {
    fn capabilities(&self) -> Capabilities {
        self.inner.capabilities()
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = Self::clamp(buf.len(), self.hook.chunk_limit());
        let n = self.inner.read(&mut buf[..len])?;
        self.hook.after_transfer(Direction::Read, n);
        Ok(n)
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let len = Self::clamp(buf.len(), self.hook.chunk_limit());
        let n = self.inner.write(&buf[..len])?;
        self.hook.after_transfer(Direction::Write, n);
        Ok(n)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.hook.on_rewind();
        if self.inner.capabilities().rewind {
            self.inner.rewind()?;
        }
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.hook.on_close();
        self.inner.close()
    }

    fn is_stdout(&self) -> bool {
        self.inner.is_stdout()
    }

    fn size_hint(&self) -> Option<u64> {
        self.inner.size_hint()
    }
}

impl<S: Stream, H: StreamHook> io::Read for Decorated<S, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Stream::read(self, buf)
    }
}

impl<S: Stream, H: StreamHook> io::Write for Decorated<S, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Stream::write(self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A hook that adds nothing; `Decorated<S, Passthrough>` behaves exactly like `S`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Passthrough;

impl StreamHook for Passthrough {}
