use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use framecast_session::ClientConfig;
use serde::Serialize;

use crate::cmd::{connect_with_retry, parse_duration, WatchArgs};
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{millis, print_record, OutputFormat};

#[derive(Serialize)]
struct WatchOutput<'a> {
    addr: &'a str,
    output: String,
    frames_written: usize,
}

pub fn run(args: WatchArgs, format: OutputFormat) -> CliResult<i32> {
    let interval = parse_duration(&args.interval)?;
    let timeout = parse_duration(&args.timeout)?;
    let staging = staging_path(&args.output)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = ClientConfig {
        connect_timeout: Some(timeout),
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..ClientConfig::default()
    };
    let mut client = connect_with_retry(&args.addr, &config, timeout)?;

    let mut written = 0usize;
    while running.load(Ordering::SeqCst) {
        let frame = client
            .request_frame()
            .map_err(|err| session_error("watch failed", err))?;
        replace_file(&staging, &args.output, &frame.jpeg)?;
        written += 1;

        tracing::info!(
            frame = written,
            jpeg_bytes = frame.jpeg.len(),
            elapsed_ms = millis(frame.elapsed),
            "grabbed frame"
        );

        if args.count.is_some_and(|count| written >= count) {
            break;
        }
        std::thread::sleep(interval);
    }

    client.disconnect();

    let out = WatchOutput {
        addr: &args.addr,
        output: args.output.display().to_string(),
        frames_written: written,
    };
    print_record(
        &out,
        &[
            ("addr", out.addr.to_string()),
            ("output", out.output.clone()),
            ("frames_written", out.frames_written.to_string()),
        ],
        format,
    );
    Ok(SUCCESS)
}

/// Sibling file the JPEG is written to before being renamed over the target.
fn staging_path(output: &Path) -> CliResult<PathBuf> {
    let name = output
        .file_name()
        .ok_or_else(|| CliError::new(USAGE, format!("invalid output path: {}", output.display())))?;
    Ok(output.with_file_name(format!(".{}.tmp", name.to_string_lossy())))
}

fn replace_file(staging: &Path, target: &Path, data: &[u8]) -> CliResult<()> {
    fs::write(staging, data).map_err(|err| io_error("write frame failed", err))?;
    fs::rename(staging, target).map_err(|err| io_error("replace frame failed", err))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_path_is_hidden_sibling() {
        let staging = staging_path(Path::new("/tmp/cam/latest.jpg")).unwrap();
        assert_eq!(staging, PathBuf::from("/tmp/cam/.latest.jpg.tmp"));
    }

    #[test]
    fn staging_path_rejects_root() {
        assert_eq!(staging_path(Path::new("/")).unwrap_err().code, USAGE);
    }

    #[test]
    fn replace_file_overwrites_target() {
        let dir = std::env::temp_dir().join(format!("framecast-watch-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let target = dir.join("frame.jpg");
        let staging = staging_path(&target).unwrap();

        replace_file(&staging, &target, b"first").unwrap();
        replace_file(&staging, &target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert!(!staging.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
