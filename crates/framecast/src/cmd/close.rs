use framecast_session::ClientConfig;
use serde::Serialize;

use crate::cmd::{connect_with_retry, parse_duration, CloseArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct CloseOutput<'a> {
    addr: &'a str,
    close_sent: bool,
}

pub fn run(args: CloseArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = ClientConfig {
        connect_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..ClientConfig::default()
    };

    let client = connect_with_retry(&args.addr, &config, timeout)?;
    client
        .close_driver()
        .map_err(|err| session_error("close failed", err))?;

    let out = CloseOutput {
        addr: &args.addr,
        close_sent: true,
    };
    print_record(
        &out,
        &[
            ("addr", out.addr.to_string()),
            ("close_sent", out.close_sent.to_string()),
        ],
        format,
    );
    Ok(SUCCESS)
}
