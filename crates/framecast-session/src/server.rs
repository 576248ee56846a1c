use std::net::SocketAddr;

use framecast_capture::{CaptureDevice, JpegEncoder};
use framecast_proto::{Command, ProtoError};
use framecast_transport::TcpTransport;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::connection::{Connection, ConnectionState};
use crate::error::{Result, SessionError};
use crate::slot::{FrameSlot, FrameSource};

/// Counters reported when the server stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServeSummary {
    pub connections_accepted: u64,
    pub frames_served: u64,
    /// Connections abandoned because of an unrecognized command or an I/O fault.
    pub reconnects: u64,
}

enum Disposition {
    Continue,
    Reconnect,
    Terminate,
}

/// Single-client, fully blocking frame server.
///
/// Answers each `getNewFrame` with the frame captured *before* the request,
/// then captures the next one. The listening socket is closed as soon as a
/// client sends `closeDriver`; the capture device is released when the server
/// is dropped.
pub struct FrameServer<D> {
    transport: Option<TcpTransport>,
    local_addr: SocketAddr,
    source: FrameSource<D>,
    slot: FrameSlot,
    config: ServerConfig,
    state: ConnectionState,
    next_connection_id: u64,
    summary: ServeSummary,
}

impl<D: CaptureDevice> FrameServer<D> {
    /// Bind the listening socket and capture the first frame.
    ///
    /// Fails if the address cannot be bound, the device cannot produce a
    /// frame, or the encoded frame exceeds `max_payload_size`. Does not wait
    /// for a client; see [`FrameServer::serve`].
    pub fn start(config: ServerConfig, device: D) -> Result<Self> {
        let transport = TcpTransport::bind(&config.listen_addr)?;
        let encoder = JpegEncoder::new(config.jpeg_quality)?;
        let mut source = FrameSource::new(device, encoder);
        let slot = FrameSlot::prime(&mut source)?;

        let payload_bytes = slot.current().len();
        if payload_bytes > config.max_payload_size {
            return Err(ProtoError::PayloadTooLarge {
                size: payload_bytes,
                max: config.max_payload_size,
            }
            .into());
        }

        let local_addr = transport.local_addr();
        info!(
            addr = %local_addr,
            device = source.device_name(),
            quality = encoder.quality(),
            payload_bytes,
            "frame server ready"
        );

        Ok(Self {
            transport: Some(transport),
            local_addr,
            source,
            slot,
            config,
            state: ConnectionState::Idle,
            next_connection_id: 1,
            summary: ServeSummary::default(),
        })
    }

    /// Address the server is (or was) listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Current connection lifecycle state.
    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Counters so far.
    pub fn summary(&self) -> ServeSummary {
        self.summary
    }

    /// Accept a client and serve requests until `closeDriver`.
    ///
    /// Unrecognized commands and read or send failures abandon the current
    /// client and block for the next one. Accept failures and capture failures
    /// are fatal. After `closeDriver` the listening socket is closed, the state
    /// is [`ConnectionState::Closed`], and further calls return
    /// [`SessionError::Closed`].
    pub fn serve(&mut self) -> Result<ServeSummary> {
        if matches!(self.state, ConnectionState::Closed) {
            return Err(SessionError::Closed);
        }

        self.accept_next()?;

        loop {
            match self.step()? {
                Disposition::Continue => {}
                Disposition::Reconnect => self.accept_next()?,
                Disposition::Terminate => break,
            }
        }

        if let Some(conn) = self.state.take_connection() {
            conn.close();
        }
        self.state = ConnectionState::Closed;
        self.transport = None;

        info!(
            connections = self.summary.connections_accepted,
            frames = self.summary.frames_served,
            reconnects = self.summary.reconnects,
            "frame server stopped"
        );
        Ok(self.summary)
    }

    fn step(&mut self) -> Result<Disposition> {
        let ConnectionState::Connected(conn) = &mut self.state else {
            return Ok(Disposition::Reconnect);
        };

        let command = match conn.read_command() {
            Ok(command) => command,
            Err(err) => {
                warn!(id = conn.id(), peer = ?conn.peer_addr(), error = %err, "lost connection");
                return Ok(Disposition::Reconnect);
            }
        };

        match command {
            Command::GetNewFrame => {
                if let Err(err) = conn.send_payload(self.slot.current()) {
                    warn!(id = conn.id(), peer = ?conn.peer_addr(), error = %err, "frame send failed");
                    return Ok(Disposition::Reconnect);
                }
                self.summary.frames_served += 1;
                debug!(
                    id = conn.id(),
                    payload_bytes = self.slot.current().len(),
                    sequence = self.slot.sequence(),
                    "frame sent"
                );

                self.slot.refresh(&mut self.source)?;
                Ok(Disposition::Continue)
            }
            Command::CloseDriver => {
                info!(id = conn.id(), "close requested by client");
                Ok(Disposition::Terminate)
            }
            Command::Unrecognized(_) => {
                info!(id = conn.id(), %command, "unrecognized command");
                Ok(Disposition::Reconnect)
            }
        }
    }

    fn accept_next(&mut self) -> Result<()> {
        if let Some(previous) = self.state.take_connection() {
            previous.close();
            self.summary.reconnects += 1;
        }

        let transport = self.transport.as_ref().ok_or(SessionError::Closed)?;
        info!(addr = %self.local_addr, "waiting for tcp client");
        let stream = transport.accept()?;
        if let Some(size) = self.config.send_buffer_size {
            stream.set_send_buffer_size(size)?;
        }

        let id = format!("client-{}", self.next_connection_id);
        self.next_connection_id += 1;
        let conn = Connection::open(stream, id, self.config.wire_config())?;

        info!(id = conn.id(), peer = ?conn.peer_addr(), "client connected");
        self.summary.connections_accepted += 1;
        self.state = ConnectionState::Connected(conn);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use bytes::Bytes;
    use framecast_capture::{CaptureError, RawFrame, TestPattern};
    use framecast_proto::{
        decode_length_header, decode_payload, encode_payload, CLOSE_DRIVER, GET_NEW_FRAME,
        LENGTH_HEADER_SIZE,
    };

    use socket2::{Domain, Protocol, SockRef, Socket, Type};

    use super::*;

    const WIDTH: u32 = 32;
    const HEIGHT: u32 = 24;
    const NOISE_WIDTH: u32 = 320;
    const NOISE_HEIGHT: u32 = 240;
    const SMALL_BUFFER: usize = 4096;

    fn spawn_server<D: CaptureDevice + Send + 'static>(
        device: D,
    ) -> (SocketAddr, JoinHandle<Result<ServeSummary>>) {
        spawn_server_with(ServerConfig::new("127.0.0.1:0"), device)
    }

    fn spawn_server_with<D: CaptureDevice + Send + 'static>(
        config: ServerConfig,
        device: D,
    ) -> (SocketAddr, JoinHandle<Result<ServeSummary>>) {
        let mut server = FrameServer::start(config, device).expect("server should start");
        let addr = server.local_addr();
        (addr, thread::spawn(move || server.serve()))
    }

    /// Connect with a tiny receive window so a large response cannot sit in
    /// kernel buffers.
    fn connect_small_window(addr: SocketAddr) -> TcpStream {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP)).unwrap();
        socket.set_recv_buffer_size(SMALL_BUFFER).unwrap();
        socket.connect(&addr.into()).unwrap();
        socket.into()
    }

    fn connect(addr: SocketAddr) -> TcpStream {
        let stream = TcpStream::connect(addr).expect("client should connect");
        stream
            .set_read_timeout(Some(Duration::from_secs(10)))
            .expect("timeout should apply");
        stream
    }

    fn request_frame(stream: &mut TcpStream) -> Vec<u8> {
        stream.write_all(GET_NEW_FRAME).unwrap();
        let mut header = [0u8; LENGTH_HEADER_SIZE];
        stream.read_exact(&mut header).unwrap();
        let len = decode_length_header(&header).unwrap();
        let mut payload = vec![0u8; len];
        stream.read_exact(&mut payload).unwrap();
        payload
    }

    fn expected_payloads(count: usize) -> Vec<Bytes> {
        let mut twin = TestPattern::new(WIDTH, HEIGHT);
        let encoder = JpegEncoder::default();
        (0..count)
            .map(|_| {
                let frame = twin.read_frame().unwrap();
                encode_payload(&encoder.encode(&frame).unwrap())
            })
            .collect()
    }

    #[test]
    fn every_request_gets_a_length_prefixed_payload() {
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));
        let mut client = connect(addr);

        for _ in 0..5 {
            client.write_all(GET_NEW_FRAME).unwrap();
            let mut header = [0u8; LENGTH_HEADER_SIZE];
            client.read_exact(&mut header).unwrap();

            let text = std::str::from_utf8(&header).unwrap();
            let digits = text.trim_end_matches(' ');
            assert!(digits.bytes().all(|b| b.is_ascii_digit()), "header {text:?}");

            let len: usize = digits.parse().unwrap();
            let mut payload = vec![0u8; len];
            client.read_exact(&mut payload).unwrap();
            assert!(decode_payload(&payload).is_ok());
        }

        client.write_all(CLOSE_DRIVER).unwrap();
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.frames_served, 5);
        assert_eq!(summary.connections_accepted, 1);
        assert_eq!(summary.reconnects, 0);
    }

    #[test]
    fn each_response_is_the_frame_captured_before_the_request() {
        let expected = expected_payloads(4);
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));
        let mut client = connect(addr);

        for want in expected.iter().take(4) {
            assert_eq!(request_frame(&mut client), want.as_ref());
        }

        client.write_all(CLOSE_DRIVER).unwrap();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn payload_decodes_to_a_valid_jpeg() {
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));
        let mut client = connect(addr);

        let jpeg = decode_payload(&request_frame(&mut client)).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);
        let image = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((image.width(), image.height()), (WIDTH, HEIGHT));

        client.write_all(CLOSE_DRIVER).unwrap();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn close_driver_stops_server_and_releases_port() {
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));
        let mut client = connect(addr);

        client.write_all(CLOSE_DRIVER).unwrap();
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.frames_served, 0);

        let mut rest = Vec::new();
        assert_eq!(client.read_to_end(&mut rest).unwrap(), 0);
        assert!(TcpStream::connect(addr).is_err());
    }

    #[test]
    fn unrecognized_command_waits_for_a_new_client() {
        let expected = expected_payloads(2);
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));

        let mut first = connect(addr);
        assert_eq!(request_frame(&mut first), expected[0].as_ref());
        first.write_all(b"helloWorld!").unwrap();

        // The server shuts the abandoned connection down.
        let mut rest = Vec::new();
        assert_eq!(first.read_to_end(&mut rest).unwrap(), 0);

        let mut second = connect(addr);
        assert_eq!(request_frame(&mut second), expected[1].as_ref());

        second.write_all(CLOSE_DRIVER).unwrap();
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.connections_accepted, 2);
        assert_eq!(summary.reconnects, 1);
        assert_eq!(summary.frames_served, 2);
    }

    #[test]
    fn dropped_client_is_replaced() {
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));

        let first = connect(addr);
        drop(first);

        let mut second = connect(addr);
        assert!(!request_frame(&mut second).is_empty());

        second.write_all(CLOSE_DRIVER).unwrap();
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.connections_accepted, 2);
        assert_eq!(summary.reconnects, 1);
    }

    #[test]
    fn command_split_across_writes_is_reassembled() {
        let (addr, handle) = spawn_server(TestPattern::new(WIDTH, HEIGHT));
        let mut client = connect(addr);
        client.set_nodelay(true).unwrap();

        client.write_all(b"getNew").unwrap();
        thread::sleep(Duration::from_millis(50));
        client.write_all(b"Frame").unwrap();

        let mut header = [0u8; LENGTH_HEADER_SIZE];
        client.read_exact(&mut header).unwrap();
        assert!(decode_length_header(&header).unwrap() > 0);

        let mut payload = vec![0u8; decode_length_header(&header).unwrap()];
        client.read_exact(&mut payload).unwrap();
        client.write_all(CLOSE_DRIVER).unwrap();
        assert_eq!(handle.join().unwrap().unwrap().frames_served, 1);
    }

    struct FailAfter {
        inner: TestPattern,
        remaining: usize,
    }

    impl CaptureDevice for FailAfter {
        fn name(&self) -> &str {
            "fail-after"
        }

        fn read_frame(&mut self) -> framecast_capture::Result<RawFrame> {
            if self.remaining == 0 {
                return Err(CaptureError::Read {
                    device: "fail-after".to_string(),
                    message: "no signal".to_string(),
                });
            }
            self.remaining -= 1;
            self.inner.read_frame()
        }
    }

    #[test]
    fn startup_fails_when_first_frame_is_missing() {
        let device = FailAfter {
            inner: TestPattern::new(WIDTH, HEIGHT),
            remaining: 0,
        };
        let result = FrameServer::start(ServerConfig::new("127.0.0.1:0"), device);
        assert!(matches!(
            result,
            Err(SessionError::Capture(CaptureError::Read { .. }))
        ));
    }

    #[test]
    fn startup_rejects_invalid_quality() {
        let config = ServerConfig {
            jpeg_quality: 0,
            ..ServerConfig::new("127.0.0.1:0")
        };
        let result = FrameServer::start(config, TestPattern::new(WIDTH, HEIGHT));
        assert!(matches!(
            result,
            Err(SessionError::Capture(CaptureError::InvalidQuality(0)))
        ));
    }

    #[test]
    fn capture_failure_after_send_is_fatal() {
        let expected = expected_payloads(1);
        let device = FailAfter {
            inner: TestPattern::new(WIDTH, HEIGHT),
            remaining: 1,
        };
        let (addr, handle) = spawn_server(device);
        let mut client = connect(addr);

        assert_eq!(request_frame(&mut client), expected[0].as_ref());

        let result = handle.join().unwrap();
        assert!(matches!(
            result,
            Err(SessionError::Capture(CaptureError::Read { .. }))
        ));
    }

    /// Pseudo-random pixels. JPEG cannot compress them, so every payload is
    /// far larger than the socket buffers used below.
    struct Noise {
        seed: u32,
    }

    impl Noise {
        fn new() -> Self {
            Self { seed: 0x2545_f491 }
        }
    }

    impl CaptureDevice for Noise {
        fn name(&self) -> &str {
            "noise"
        }

        fn read_frame(&mut self) -> framecast_capture::Result<RawFrame> {
            let len = (NOISE_WIDTH * NOISE_HEIGHT * 3) as usize;
            let mut data = Vec::with_capacity(len);
            for _ in 0..len {
                self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                data.push((self.seed >> 24) as u8);
            }
            RawFrame::new(NOISE_WIDTH, NOISE_HEIGHT, data)
        }
    }

    fn noise_payloads(count: usize) -> Vec<Bytes> {
        let mut twin = Noise::new();
        let encoder = JpegEncoder::default();
        (0..count)
            .map(|_| {
                let frame = twin.read_frame().unwrap();
                encode_payload(&encoder.encode(&frame).unwrap())
            })
            .collect()
    }

    fn small_buffer_config() -> ServerConfig {
        ServerConfig {
            send_buffer_size: Some(SMALL_BUFFER),
            ..ServerConfig::new("127.0.0.1:0")
        }
    }

    #[test]
    fn stalled_client_hits_write_timeout_and_is_replaced() {
        let expected = noise_payloads(1);
        assert!(expected[0].len() > 16 * SMALL_BUFFER);

        let config = ServerConfig {
            write_timeout: Some(Duration::from_millis(300)),
            ..small_buffer_config()
        };
        let (addr, handle) = spawn_server_with(config, Noise::new());

        // Ask for a frame and never read it.
        let mut stalled = connect_small_window(addr);
        stalled.write_all(GET_NEW_FRAME).unwrap();

        let mut second = connect(addr);
        let started = std::time::Instant::now();
        assert_eq!(request_frame(&mut second), expected[0].as_ref());
        assert!(started.elapsed() < Duration::from_secs(8));

        second.write_all(CLOSE_DRIVER).unwrap();
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.connections_accepted, 2);
        assert_eq!(summary.reconnects, 1);
        assert_eq!(summary.frames_served, 1);
        drop(stalled);
    }

    #[test]
    fn reset_during_send_keeps_the_frame_for_the_next_client() {
        let expected = noise_payloads(1);
        let (addr, handle) = spawn_server_with(small_buffer_config(), Noise::new());

        let mut first = connect_small_window(addr);
        first.write_all(GET_NEW_FRAME).unwrap();
        // Let the server block on the full window, then reset the connection.
        thread::sleep(Duration::from_millis(200));
        SockRef::from(&first).set_linger(Some(Duration::ZERO)).unwrap();
        drop(first);

        let mut second = connect(addr);
        assert_eq!(request_frame(&mut second), expected[0].as_ref());

        second.write_all(CLOSE_DRIVER).unwrap();
        let summary = handle.join().unwrap().unwrap();
        assert_eq!(summary.connections_accepted, 2);
        assert_eq!(summary.reconnects, 1);
        assert_eq!(summary.frames_served, 1);
    }

    #[test]
    fn startup_rejects_frame_larger_than_payload_limit() {
        let config = ServerConfig {
            max_payload_size: 16,
            ..ServerConfig::new("127.0.0.1:0")
        };
        let result = FrameServer::start(config, TestPattern::new(WIDTH, HEIGHT));
        assert!(matches!(
            result,
            Err(SessionError::Proto(ProtoError::PayloadTooLarge { max: 16, .. }))
        ));
    }

    #[test]
    fn closed_server_reports_state_and_refuses_to_serve_again() {
        let mut server = FrameServer::start(
            ServerConfig::new("127.0.0.1:0"),
            TestPattern::new(WIDTH, HEIGHT),
        )
        .unwrap();
        let addr = server.local_addr();

        let closer = thread::spawn(move || {
            let mut client = connect(addr);
            client.write_all(CLOSE_DRIVER).unwrap();
        });
        let summary = server.serve().unwrap();
        closer.join().unwrap();

        assert_eq!(summary.connections_accepted, 1);
        assert!(matches!(server.state(), ConnectionState::Closed));
        assert_eq!(server.summary(), summary);
        assert_eq!(server.local_addr(), addr);

        // The listener is gone even though the server value is still alive.
        assert!(TcpStream::connect(addr).is_err());
        assert!(matches!(server.serve(), Err(SessionError::Closed)));
    }

    #[test]
    fn state_starts_idle() {
        let server = FrameServer::start(
            ServerConfig::new("127.0.0.1:0"),
            TestPattern::new(WIDTH, HEIGHT),
        )
        .unwrap();
        assert!(matches!(server.state(), ConnectionState::Idle));
        assert!(!server.state().is_connected());
    }
}
