use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::FrameStream;

/// Listen backlog. The daemon serves exactly one client at a time.
pub const DEFAULT_BACKLOG: i32 = 1;

/// TCP listening transport.
///
/// The socket is created with `SO_REUSEADDR` so a restarted daemon can rebind
/// its port while the previous connection lingers in `TIME_WAIT`.
pub struct TcpTransport {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on `addr` (e.g. `0.0.0.0:5001`).
    pub fn bind(addr: &str) -> Result<Self> {
        Self::bind_with_backlog(addr, DEFAULT_BACKLOG)
    }

    /// Bind and listen on `addr` with an explicit backlog.
    pub fn bind_with_backlog(addr: &str, backlog: i32) -> Result<Self> {
        let resolved = resolve_addr(addr)?;
        let bind_err = |source| TransportError::Bind {
            addr: addr.to_string(),
            source,
        };

        let socket = Socket::new(
            Domain::for_address(resolved),
            Type::STREAM,
            Some(Protocol::TCP),
        )
        .map_err(bind_err)?;
        socket.set_reuse_address(true).map_err(bind_err)?;
        socket.bind(&resolved.into()).map_err(bind_err)?;
        socket.listen(backlog).map_err(bind_err)?;

        let listener: TcpListener = socket.into();
        let local_addr = listener.local_addr().map_err(bind_err)?;

        info!(%local_addr, "listening on tcp socket");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<FrameStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(FrameStream::from_tcp(stream))
    }

    /// Connect to a listening TCP socket (blocking).
    pub fn connect(addr: &str) -> Result<FrameStream> {
        let resolved = resolve_addr(addr)?;
        let stream = TcpStream::connect(resolved).map_err(|e| TransportError::Connect {
            addr: addr.to_string(),
            source: e,
        })?;
        debug!(%resolved, "connected to tcp socket");
        Ok(FrameStream::from_tcp(stream))
    }

    /// Connect with an upper bound on the time spent establishing the connection.
    pub fn connect_timeout(addr: &str, timeout: Duration) -> Result<FrameStream> {
        let resolved = resolve_addr(addr)?;
        let stream =
            TcpStream::connect_timeout(&resolved, timeout).map_err(|e| TransportError::Connect {
                addr: addr.to_string(),
                source: e,
            })?;
        debug!(%resolved, ?timeout, "connected to tcp socket");
        Ok(FrameStream::from_tcp(stream))
    }

    /// The address this socket is bound to (with the real port if `:0` was requested).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("local_addr", &self.local_addr)
            .finish()
    }
}

/// Resolve `host:port` to the first matching socket address.
pub fn resolve_addr(addr: &str) -> Result<SocketAddr> {
    let mut candidates = addr
        .to_socket_addrs()
        .map_err(|e| TransportError::InvalidAddress {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;
    candidates
        .next()
        .ok_or_else(|| TransportError::InvalidAddress {
            addr: addr.to_string(),
            reason: "address resolved to nothing".to_string(),
        })
}
