use std::fmt;
use std::io;

use framecast_capture::CaptureError;
use framecast_proto::ProtoError;
use framecast_session::SessionError;
use framecast_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const DEVICE_UNAVAILABLE: i32 = 69;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::InvalidAddress { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
    }
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    match err {
        ProtoError::Io(source) => io_error(context, source),
        ProtoError::InvalidLengthHeader(_)
        | ProtoError::PayloadTooLarge { .. }
        | ProtoError::InvalidPayload(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        ProtoError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn capture_error(context: &str, err: CaptureError) -> CliError {
    match err {
        CaptureError::Open { .. } | CaptureError::Read { .. } => {
            CliError::new(DEVICE_UNAVAILABLE, format!("{context}: {err}"))
        }
        CaptureError::InvalidQuality(_) => CliError::new(USAGE, format!("{context}: {err}")),
        CaptureError::InvalidFrame { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn session_error(context: &str, err: SessionError) -> CliError {
    match err {
        SessionError::Transport(err) => transport_error(context, err),
        SessionError::Proto(err) => proto_error(context, err),
        SessionError::Capture(err) => capture_error(context, err),
        SessionError::Closed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = proto_error(
            "fetch failed",
            ProtoError::Io(io::Error::from(io::ErrorKind::WouldBlock)),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn refused_connect_is_a_transport_failure() {
        let err = session_error(
            "connect failed",
            SessionError::Transport(TransportError::Connect {
                addr: "127.0.0.1:1".to_string(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
        assert!(err.message.starts_with("connect failed: "));
    }

    #[test]
    fn camera_failure_is_device_unavailable() {
        let err = capture_error(
            "startup failed",
            CaptureError::Open {
                device: "camera 0".to_string(),
                message: "no such device".to_string(),
            },
        );
        assert_eq!(err.code, DEVICE_UNAVAILABLE);
    }

    #[test]
    fn bad_address_is_usage() {
        let err = transport_error(
            "bind failed",
            TransportError::InvalidAddress {
                addr: "nope".to_string(),
                reason: "missing port".to_string(),
            },
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn corrupt_header_is_data_invalid() {
        let err = proto_error("fetch failed", ProtoError::InvalidLengthHeader("abc".into()));
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn serving_a_closed_server_is_a_failure() {
        let err = session_error("server failed", SessionError::Closed);
        assert_eq!(err.code, FAILURE);
        assert_eq!(err.message, "server failed: server is closed");
    }
}
