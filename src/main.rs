#![warn(clippy::unwrap_used)]

use std::path::PathBuf;

use clap::Parser;

use finreport::{error::ReportError, report};

#[derive(Parser)]
#[command(version, long_about = None)]
struct CliArguments {
    #[arg(help = "Path to the CSV file with the transaction records")]
    input_path: PathBuf,
    #[arg(help = "Path the PDF report will be written to")]
    output_path: PathBuf,
    #[arg(
        long = "user",
        help = "Display name embedded in the identity line of the report"
    )]
    username: String,
}

fn main() {
    if let Err(error) = fallible_main() {
        log::error!("{}", error);
        std::process::exit(1);
    }
}

fn fallible_main() -> Result<(), ReportError> {
    env_logger::init();

    let arguments = CliArguments::parse();
    let input_file = std::fs::File::open(&arguments.input_path).map_err(|error| {
        ReportError::with_error(
            format!("Unable to open the transactions file {:?}", arguments.input_path),
            &error,
        )
    })?;

    let report_bytes = report::generate_from_csv(input_file, &arguments.username)?;

    std::fs::write(&arguments.output_path, &report_bytes).map_err(|error| {
        ReportError::with_error(
            format!("Unable to write the report to {:?}", arguments.output_path),
            &error,
        )
    })?;
    log::info!(
        "Wrote the report to {:?} ({} bytes)",
        arguments.output_path,
        report_bytes.len()
    );

    Ok(())
}
