/// Errors that can occur in server or client sessions.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] framecast_transport::TransportError),

    /// Wire protocol error.
    #[error("protocol error: {0}")]
    Proto(#[from] framecast_proto::ProtoError),

    /// Capture device or encoder error.
    #[error("capture error: {0}")]
    Capture(#[from] framecast_capture::CaptureError),

    /// The server already handled `closeDriver` and released its socket.
    #[error("server is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, SessionError>;
