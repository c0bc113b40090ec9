//! Byte streams for streamed HTTP bodies
//!
//! A [`Stream`] declares what it can do through [`Capabilities`]; endpoints in
//! [`endpoints`] wrap `std::io` types. Streams can be wrapped in transparent
//! decorators that meter ([`ProgressStream`]) or cap ([`ThrottledStream`]) the
//! bytes flowing through them without changing anything else about the stream.

pub mod decorator;
pub mod endpoints;
pub mod error;
pub mod progress;
pub mod shared;
pub mod stream;
pub mod throttle;

pub use decorator::{Decorated, Direction, Passthrough, StreamHook};
pub use endpoints::{ReadStream, SeekableReader, SeekableWriter, StdoutStream, WriteStream};
pub use error::{is_unsupported, unsupported, Operation};
pub use progress::{ProgressMeter, ProgressStream, EMIT_INTERVAL};
pub use shared::{SharedReader, SharedStream};
pub use stream::{Capabilities, Stream};
pub use throttle::{BandwidthLimiter, Pace, Throttle, ThrottledStream};
