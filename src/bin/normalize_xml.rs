//! Normalize a bureau XML file from disk and print the record as JSON.
//!
//! Usage: `normalize_xml <path-to-report.xml>`

use credit_report_api::normalize;
use std::env;
use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: normalize_xml <path-to-report.xml>");
        return ExitCode::from(2);
    };

    let raw = match std::fs::read(&path) {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => {
            eprintln!("failed to read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let report = match normalize(&raw) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("failed to serialize report: {}", e);
            ExitCode::FAILURE
        }
    }
}
