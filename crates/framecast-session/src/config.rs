use std::time::Duration;

use framecast_capture::DEFAULT_JPEG_QUALITY;
use framecast_proto::{WireConfig, DEFAULT_MAX_PAYLOAD};

/// Address the daemon listens on when none is configured.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5001";

/// Server settings, fixed at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to bind.
    pub listen_addr: String,
    /// JPEG quality, `1..=100`.
    pub jpeg_quality: u8,
    /// Upper bound on a single base64 payload.
    pub max_payload_size: usize,
    /// Optional bound on a single response write. A client that stops reading
    /// for longer than this is treated as gone.
    pub write_timeout: Option<Duration>,
    /// `SO_SNDBUF` applied to each accepted client. `None` keeps the kernel
    /// default with auto-tuning.
    pub send_buffer_size: Option<usize>,
}

impl ServerConfig {
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            ..Self::default()
        }
    }

    pub(crate) fn wire_config(&self) -> WireConfig {
        WireConfig {
            max_payload_size: self.max_payload_size,
            read_timeout: None,
            write_timeout: self.write_timeout,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            write_timeout: None,
            send_buffer_size: None,
        }
    }
}

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bound on establishing the TCP connection. `None` blocks indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Bound on waiting for a response.
    pub read_timeout: Option<Duration>,
    /// Bound on sending a command.
    pub write_timeout: Option<Duration>,
    /// Largest payload the client will accept.
    pub max_payload_size: usize,
}

impl ClientConfig {
    pub(crate) fn wire_config(&self) -> WireConfig {
        WireConfig {
            max_payload_size: self.max_payload_size,
            read_timeout: self.read_timeout,
            write_timeout: self.write_timeout,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(5)),
            read_timeout: None,
            write_timeout: None,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
