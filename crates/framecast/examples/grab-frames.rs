//! Poll a frame server the way a viewer would and print time per grab.
//!
//! Run with:
//!   cargo run --example grab-frames -- 127.0.0.1:5001 30

use std::time::Duration;

use framecast::session::FrameClient;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let addr = args.next().unwrap_or_else(|| "127.0.0.1:5001".to_string());
    let count: usize = match args.next() {
        Some(n) => n.parse()?,
        None => 30,
    };

    let mut client = FrameClient::connect(&addr)?;
    eprintln!("Connected to {addr}");

    for i in 0..count {
        let frame = client.request_frame()?;
        println!(
            "frame {i}: {} jpeg bytes, grab took {:.1}ms",
            frame.jpeg.len(),
            frame.elapsed.as_secs_f64() * 1000.0
        );
        std::thread::sleep(Duration::from_millis(33));
    }

    client.disconnect();
    Ok(())
}
