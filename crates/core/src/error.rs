//! Error helpers for the stream contract
//!
//! Streams speak `std::io::Error` so failures from files, sockets and decorators
//! travel through unchanged. This module only names the operations and builds
//! the error returned when an operation is not supported.

use std::fmt;
use std::io;

/// Operations of the stream contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Rewind,
    Close,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
            Self::Rewind => write!(f, "rewind"),
            Self::Close => write!(f, "close"),
        }
    }
}

/// Builds the error returned by a stream that does not support `op`.
pub fn unsupported(op: Operation) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("stream does not support {}", op),
    )
}

/// Returns true if the error reports a missing capability rather than a failed
/// transfer.
pub fn is_unsupported(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = unsupported(Operation::Rewind);
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
        assert!(err.to_string().contains("rewind"));
        assert!(is_unsupported(&err));
    }

    #[test]
    fn test_other_errors_are_not_unsupported() {
        let err = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        assert!(!is_unsupported(&err));
    }
}
