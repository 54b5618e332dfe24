//! fdlink CLI - inspect and maintain a FileDataID link database
//!
//! Usage: fdlink <command> [arguments]

mod cli;
mod export_cmd;
mod forget_cmd;
mod refs_cmd;
mod status_cmd;
mod version;

use anyhow::Result;
use fdlink::error_codes::{FDL_CLI_001_INVALID_ARGS, FDL_DB_001_STORE_FAILED, FDL_DB_002_OPEN_FAILED};
use fdlink::output::ErrorResponse;
use fdlink::{generate_execution_id, output_json, JsonResponse, OutputFormat};
use std::process::ExitCode;

use cli::{parse_args, print_usage, Command};

fn report_error(code: &str, err: &anyhow::Error, output_format: OutputFormat) {
    match output_format {
        OutputFormat::Json | OutputFormat::Pretty => {
            let response = JsonResponse::new(
                ErrorResponse {
                    error: code.to_string(),
                    message: format!("{:#}", err),
                },
                &generate_execution_id(),
            );
            if output_json(&response, output_format).is_err() {
                eprintln!("Error: {:#}", err);
            }
        }
        OutputFormat::Human => eprintln!("Error: {:#}", err),
    }
}

fn output_format_of(command: &Command) -> OutputFormat {
    match command {
        Command::Status { output_format, .. }
        | Command::Refs { output_format, .. }
        | Command::Forget { output_format, .. } => *output_format,
        Command::Export { .. } => OutputFormat::Human,
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Status {
            db_path,
            output_format,
        } => status_cmd::run_status(db_path, output_format),
        Command::Refs {
            db_path,
            fdid,
            direction,
            output_format,
        } => refs_cmd::run_refs(db_path, fdid, direction, output_format),
        Command::Export {
            db_path,
            format,
            file,
        } => export_cmd::run_export(db_path, format, file),
        Command::Forget {
            db_path,
            fdid,
            output_format,
        } => forget_cmd::run_forget(db_path, fdid, output_format),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let command = match parse_args() {
        Ok(command) => command,
        Err(e) => {
            let output_format = cli::global_output_format(&args);
            report_error(FDL_CLI_001_INVALID_ARGS, &e, output_format);
            if output_format == OutputFormat::Human {
                eprintln!();
                print_usage();
            }
            return ExitCode::from(1);
        }
    };

    let output_format = output_format_of(&command);

    // Read-side commands never create a database
    if !command.db_path().exists() {
        let err = anyhow::anyhow!("Database not found: {}", command.db_path().display());
        report_error(FDL_DB_002_OPEN_FAILED, &err, output_format);
        return ExitCode::from(1);
    }

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(FDL_DB_001_STORE_FAILED, &e, output_format);
            ExitCode::from(1)
        }
    }
}
