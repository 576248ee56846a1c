use framecast_capture::{CaptureDevice, TestPattern};
use framecast_session::{FrameServer, ServerConfig};

use crate::cmd::{parse_duration, ServeArgs, SourceKind};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_serve_summary, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let write_timeout = args
        .write_timeout
        .as_deref()
        .map(parse_duration)
        .transpose()?;

    let device = open_device(&args)?;
    let config = ServerConfig {
        listen_addr: args.listen.clone(),
        jpeg_quality: args.quality,
        write_timeout,
        send_buffer_size: args.send_buffer,
        ..ServerConfig::default()
    };

    let mut server =
        FrameServer::start(config, device).map_err(|err| session_error("startup failed", err))?;
    tracing::info!(addr = %server.local_addr(), "listening");

    let summary = server
        .serve()
        .map_err(|err| session_error("server failed", err))?;

    print_serve_summary(&summary, format);
    Ok(SUCCESS)
}

fn open_device(args: &ServeArgs) -> CliResult<Box<dyn CaptureDevice>> {
    match args.source {
        SourceKind::TestPattern => Ok(Box::new(TestPattern::new(args.width, args.height))),
        SourceKind::Camera => open_camera(args),
    }
}

#[cfg(feature = "native")]
fn open_camera(args: &ServeArgs) -> CliResult<Box<dyn CaptureDevice>> {
    use framecast_capture::{NativeCamera, NativeCameraConfig};

    let config = NativeCameraConfig {
        index: args.device,
        width: args.width,
        height: args.height,
        frame_rate: args.fps,
    };
    let camera = NativeCamera::open(&config)
        .map_err(|err| crate::exit::capture_error("camera open failed", err))?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "native"))]
fn open_camera(args: &ServeArgs) -> CliResult<Box<dyn CaptureDevice>> {
    Err(crate::exit::CliError::new(
        crate::exit::DEVICE_UNAVAILABLE,
        format!(
            "camera {} unavailable: built without the `native` feature (use --source test-pattern)",
            args.device
        ),
    ))
}
