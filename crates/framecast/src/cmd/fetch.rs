use std::fs;

use framecast_session::ClientConfig;

use crate::cmd::{connect_with_retry, parse_duration, FetchArgs};
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{millis, print_frame_reports, print_raw, FrameReport, OutputFormat};

pub fn run(args: FetchArgs, format: OutputFormat) -> CliResult<i32> {
    if args.count == 0 {
        return Err(CliError::new(USAGE, "--count must be at least 1"));
    }
    let timeout = parse_duration(&args.timeout)?;

    if let Some(dir) = &args.output_dir {
        fs::create_dir_all(dir).map_err(|err| io_error("create output dir failed", err))?;
    }

    let config = ClientConfig {
        connect_timeout: Some(timeout),
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..ClientConfig::default()
    };
    let mut client = connect_with_retry(&args.addr, &config, timeout)?;

    let mut reports = Vec::with_capacity(args.count);
    let mut last_jpeg = Vec::new();

    for index in 0..args.count {
        let frame = client
            .request_frame()
            .map_err(|err| session_error("fetch failed", err))?;

        let path = match &args.output_dir {
            Some(dir) => {
                let path = dir.join(format!("frame-{index:04}.jpg"));
                fs::write(&path, &frame.jpeg).map_err(|err| io_error("write frame failed", err))?;
                Some(path.display().to_string())
            }
            None => None,
        };

        tracing::debug!(index, elapsed_ms = millis(frame.elapsed), "grabbed frame");
        reports.push(FrameReport {
            index,
            payload_len: frame.payload_len,
            jpeg_bytes: frame.jpeg.len(),
            elapsed_ms: millis(frame.elapsed),
            path,
        });
        last_jpeg = frame.jpeg;
    }

    client.disconnect();

    match format {
        OutputFormat::Raw => print_raw(&last_jpeg),
        _ => print_frame_reports(&reports, format),
    }
    Ok(SUCCESS)
}
