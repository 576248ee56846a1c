use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use framecast_session::DEFAULT_LISTEN_ADDR;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod close;
pub mod fetch;
pub mod serve;
pub mod version;
pub mod watch;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the frame server until a client sends closeDriver.
    Serve(ServeArgs),
    /// Request frames from a server and report them.
    Fetch(FetchArgs),
    /// Poll a server and keep a file updated with the latest frame.
    Watch(WatchArgs),
    /// Ask a server to shut down.
    Close(CloseArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Fetch(args) => fetch::run(args, format),
        Command::Watch(args) => watch::run(args, format),
        Command::Close(args) => close::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum SourceKind {
    /// Platform camera (requires the `native` feature).
    Camera,
    /// Synthetic moving gradient.
    TestPattern,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "FRAMECAST_LISTEN", default_value = DEFAULT_LISTEN_ADDR)]
    pub listen: String,
    /// Frame source.
    #[arg(long, env = "FRAMECAST_SOURCE", value_enum, default_value = "camera")]
    pub source: SourceKind,
    /// Camera index.
    #[arg(long, env = "FRAMECAST_DEVICE", default_value = "0")]
    pub device: u32,
    /// JPEG quality (1-100).
    #[arg(
        long,
        env = "FRAMECAST_QUALITY",
        default_value = "90",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    pub quality: u8,
    /// Requested frame width.
    #[arg(long, default_value = "640")]
    pub width: u32,
    /// Requested frame height.
    #[arg(long, default_value = "480")]
    pub height: u32,
    /// Requested camera frame rate.
    #[arg(long, default_value = "30")]
    pub fps: u32,
    /// Abandon a client whose response write stalls longer than this (e.g. 5s, 500ms).
    #[arg(long)]
    pub write_timeout: Option<String>,
    /// Socket send buffer for each client, in bytes. Defaults to kernel auto-tuning.
    #[arg(long, value_name = "BYTES")]
    pub send_buffer: Option<usize>,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Server address (host:port).
    pub addr: String,
    /// Number of frames to request.
    #[arg(long, default_value = "1")]
    pub count: usize,
    /// Write each JPEG into this directory.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
    /// Connect and response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Server address (host:port).
    pub addr: String,
    /// File replaced with each new JPEG.
    #[arg(long, short = 'o')]
    pub output: PathBuf,
    /// Delay between requests (e.g. 33ms, 1s).
    #[arg(long, default_value = "33ms")]
    pub interval: String,
    /// Stop after N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Connect and response timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Server address (host:port).
    pub addr: String,
    /// Connect timeout (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `150ms`, `5s`, or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

/// Connect, retrying while the server is not yet listening.
pub fn connect_with_retry(
    addr: &str,
    config: &framecast_session::ClientConfig,
    timeout: Duration,
) -> CliResult<framecast_session::FrameClient> {
    use framecast_session::{FrameClient, SessionError};
    use framecast_transport::TransportError;

    let start = std::time::Instant::now();
    loop {
        match FrameClient::connect_with_config(addr, config) {
            Ok(client) => return Ok(client),
            Err(SessionError::Transport(TransportError::Connect { source, .. }))
                if source.kind() == std::io::ErrorKind::ConnectionRefused =>
            {
                if start.elapsed() >= timeout {
                    return Err(CliError::new(
                        crate::exit::TIMEOUT,
                        format!("connect to {addr} timed out after {timeout:?}"),
                    ));
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(err) => return Err(crate::exit::session_error("connect failed", err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds() {
        assert_eq!(parse_duration("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_duration_millis() {
        assert_eq!(parse_duration("33ms").unwrap(), Duration::from_millis(33));
    }

    #[test]
    fn parse_duration_invalid() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }
}
