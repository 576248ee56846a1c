//! Frame server loop and clients for framecast.
//!
//! [`FrameServer`] serves exactly one TCP client at a time. Each `getNewFrame`
//! is answered with the frame captured after the *previous* request, so a
//! response is always one frame stale. An unrecognized command or a broken
//! connection abandons the client and re-accepts; `closeDriver` shuts the
//! server down.
//!
//! ```no_run
//! use framecast_capture::TestPattern;
//! use framecast_session::{FrameServer, ServerConfig};
//!
//! let mut server = FrameServer::start(ServerConfig::new("127.0.0.1:5001"), TestPattern::new(640, 480))?;
//! let summary = server.serve()?;
//! println!("served {} frames", summary.frames_served);
//! # Ok::<(), framecast_session::SessionError>(())
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod server;
pub mod slot;

#[cfg(feature = "async")]
pub use async_client::AsyncFrameClient;
pub use client::{FrameClient, ReceivedFrame};
pub use config::{ClientConfig, ServerConfig, DEFAULT_LISTEN_ADDR};
pub use connection::{Connection, ConnectionState};
pub use error::{Result, SessionError};
pub use server::{FrameServer, ServeSummary};
pub use slot::{FrameSlot, FrameSource};
