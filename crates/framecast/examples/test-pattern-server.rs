//! Frame server backed by the synthetic test pattern. No camera required.
//!
//! Run with:
//!   cargo run --example test-pattern-server
//!
//! In another terminal:
//!   cargo run --features cli -- fetch 127.0.0.1:5001 --count 5
//!   cargo run --features cli -- close 127.0.0.1:5001

use framecast::capture::TestPattern;
use framecast::session::{FrameServer, ServerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:5001".to_string());

    let mut server = FrameServer::start(ServerConfig::new(addr), TestPattern::new(640, 480))?;
    eprintln!("Serving test pattern on {}", server.local_addr());

    let summary = server.serve()?;
    eprintln!(
        "Stopped after {} frames ({} connections, {} reconnects)",
        summary.frames_served, summary.connections_accepted, summary.reconnects
    );
    Ok(())
}
