//! Tokio client for a frame server.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use framecast_proto::{decode_payload, ClientCodec, Command, ProtoError};
use framecast_transport::TransportError;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use crate::client::ReceivedFrame;
use crate::config::ClientConfig;
use crate::error::Result;

/// Async counterpart of [`crate::FrameClient`].
#[derive(Debug)]
pub struct AsyncFrameClient {
    framed: Framed<TcpStream, ClientCodec>,
    peer_addr: Option<SocketAddr>,
    read_timeout: Option<Duration>,
    write_timeout: Option<Duration>,
}

/// Run `fut` under an optional deadline. Expiry surfaces as a `TimedOut` I/O error.
async fn with_timeout<T, F>(limit: Option<Duration>, fut: F) -> std::result::Result<T, ProtoError>
where
    F: Future<Output = std::result::Result<T, ProtoError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ProtoError::Io(io::ErrorKind::TimedOut.into()))?,
        None => fut.await,
    }
}

impl AsyncFrameClient {
    pub async fn connect(addr: &str) -> Result<Self> {
        Self::connect_with_config(addr, &ClientConfig::default()).await
    }

    pub async fn connect_with_config(addr: &str, config: &ClientConfig) -> Result<Self> {
        let connect_err = |source: io::Error| TransportError::Connect {
            addr: addr.to_string(),
            source,
        };

        let stream = match config.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, TcpStream::connect(addr))
                .await
                .map_err(|_| connect_err(io::ErrorKind::TimedOut.into()))?
                .map_err(connect_err)?,
            None => TcpStream::connect(addr).await.map_err(connect_err)?,
        };
        stream.set_nodelay(true).map_err(TransportError::Io)?;
        let peer_addr = stream.peer_addr().ok();

        Ok(Self {
            framed: Framed::new(stream, ClientCodec::new(config.max_payload_size)),
            peer_addr,
            read_timeout: config.read_timeout,
            write_timeout: config.write_timeout,
        })
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Send `getNewFrame` and wait for the base64 payload.
    pub async fn request_payload(&mut self) -> Result<Bytes> {
        with_timeout(self.write_timeout, self.framed.send(Command::GetNewFrame)).await?;
        let payload = with_timeout(self.read_timeout, async {
            self.framed
                .next()
                .await
                .unwrap_or(Err(ProtoError::ConnectionClosed))
        })
        .await?;
        Ok(payload)
    }

    /// Send `getNewFrame` and decode the response into JPEG bytes.
    pub async fn request_frame(&mut self) -> Result<ReceivedFrame> {
        let started = Instant::now();
        let payload = self.request_payload().await?;
        let elapsed = started.elapsed();
        let jpeg = decode_payload(&payload)?;
        Ok(ReceivedFrame {
            payload_len: payload.len(),
            jpeg,
            elapsed,
        })
    }

    /// Ask the server to shut down.
    pub async fn close_driver(mut self) -> Result<()> {
        with_timeout(self.write_timeout, self.framed.send(Command::CloseDriver)).await?;
        with_timeout(self.write_timeout, self.framed.close()).await?;
        Ok(())
    }
}
