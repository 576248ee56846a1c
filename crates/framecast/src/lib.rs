//! Single-client TCP camera frame server.
//!
//! A client sends the 11-byte command `getNewFrame` and receives a 16-byte
//! ASCII length header followed by a base64-encoded JPEG. `closeDriver` stops
//! the server.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener and stream with address reuse
//! - [`proto`]: command tokens, length header, base64 payloads
//! - [`capture`]: capture devices and JPEG encoding
//! - [`session`]: server loop and clients (behind `session` feature)

/// Re-export transport types.
pub mod transport {
    pub use framecast_transport::*;
}

/// Re-export wire protocol types.
pub mod proto {
    pub use framecast_proto::*;
}

/// Re-export capture types.
pub mod capture {
    pub use framecast_capture::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use framecast_session::*;
}
