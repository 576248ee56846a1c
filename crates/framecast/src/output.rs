use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use framecast_session::ServeSummary;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One fetched frame, as reported by `fetch`.
#[derive(Serialize, Debug)]
pub struct FrameReport {
    pub index: usize,
    pub payload_len: usize,
    pub jpeg_bytes: usize,
    pub elapsed_ms: f64,
    pub path: Option<String>,
}

pub fn print_frame_reports(reports: &[FrameReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            for report in reports {
                println!(
                    "{}",
                    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "PAYLOAD", "JPEG", "ELAPSED", "PATH"]);
            for report in reports {
                table.add_row(vec![
                    report.index.to_string(),
                    report.payload_len.to_string(),
                    report.jpeg_bytes.to_string(),
                    format!("{:.2}ms", report.elapsed_ms),
                    report.path.clone().unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for report in reports {
                println!(
                    "frame={} payload={} jpeg={} elapsed={:.2}ms{}",
                    report.index,
                    report.payload_len,
                    report.jpeg_bytes,
                    report.elapsed_ms,
                    report
                        .path
                        .as_deref()
                        .map(|p| format!(" path={p}"))
                        .unwrap_or_default()
                );
            }
        }
        // Raw output is the JPEG itself; the caller writes it.
        OutputFormat::Raw => {}
    }
}

#[derive(Serialize)]
struct SummaryOutput {
    connections_accepted: u64,
    frames_served: u64,
    reconnects: u64,
}

pub fn print_serve_summary(summary: &ServeSummary, format: OutputFormat) {
    let out = SummaryOutput {
        connections_accepted: summary.connections_accepted,
        frames_served: summary.frames_served,
        reconnects: summary.reconnects,
    };
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CONNECTIONS", "FRAMES", "RECONNECTS"])
                .add_row(vec![
                    out.connections_accepted.to_string(),
                    out.frames_served.to_string(),
                    out.reconnects.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "connections={} frames={} reconnects={}",
                out.connections_accepted, out.frames_served, out.reconnects
            );
        }
        OutputFormat::Raw => {
            println!("{}", out.frames_served);
        }
    }
}

/// Print a flat key/value record.
pub fn print_record<T: Serialize>(record: &T, fields: &[(&str, String)], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(fields.iter().map(|(k, _)| k.to_uppercase()).collect::<Vec<_>>())
                .add_row(fields.iter().map(|(_, v)| v.clone()).collect::<Vec<_>>());
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            let line = fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn millis(duration: std::time::Duration) -> f64 {
    (duration.as_secs_f64() * 1000.0 * 100.0).round() / 100.0
}
