//! Blocking TCP transport for framecast.
//!
//! Provides the socket plumbing the rest of the workspace builds on:
//! - [`TcpTransport`]: a listening socket bound with address reuse
//! - [`FrameStream`]: a connected stream (`Read + Write`) returned by
//!   accept and connect
//!
//! This is the lowest layer of framecast. Framing lives in `framecast-proto`.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::FrameStream;
pub use tcp::{resolve_addr, TcpTransport, DEFAULT_BACKLOG};
