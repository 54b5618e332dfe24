//! CLI argument parsing for fdlink
//!
//! Defines the Command enum and parse_args() for the read-side commands.

use anyhow::Result;
use fdlink::{ExportFormat, Fdid, OutputFormat};
use std::path::{Path, PathBuf};

pub fn print_usage() {
    eprintln!("fdlink - FileDataID dependency linker");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  fdlink <command> [arguments]");
    eprintln!("  fdlink --help");
    eprintln!();
    eprintln!("  fdlink status --db <FILE> [--output <FORMAT>]");
    eprintln!("  fdlink refs --db <FILE> --fdid <N> [--direction <out|in>] [--output <FORMAT>]");
    eprintln!("  fdlink export --db <FILE> [--format json|jsonl|csv] [--file <PATH>]");
    eprintln!("  fdlink forget --db <FILE> --fdid <N> [--output <FORMAT>]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  status    Show edge and parent counts and the last link run");
    eprintln!("  refs      List what a file references (out) or what references it (in)");
    eprintln!("  export    Export all edges");
    eprintln!("  forget    Drop a parent's edges so the next run relinks it");
    eprintln!();
    eprintln!("Global arguments:");
    eprintln!("  --db <FILE>         Path to the link database");
    eprintln!("  --output <FORMAT>   Output format: human (default), json (compact), or pretty (formatted)");
    eprintln!();
    eprintln!("Refs arguments:");
    eprintln!("  --fdid <N>          FileDataID to look up");
    eprintln!("  --direction <out|in> Outgoing references (default) or referrers");
    eprintln!();
    eprintln!("Export arguments:");
    eprintln!("  --format <FORMAT>   json (default), jsonl, or csv");
    eprintln!("  --file <PATH>       Write to PATH instead of stdout");
}

/// Which side of the edge `refs` looks up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefsDirection {
    /// Edges where the file is the parent
    Out,
    /// Edges where the file is the child
    In,
}

impl RefsDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefsDirection::Out => "out",
            RefsDirection::In => "in",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Status {
        db_path: PathBuf,
        output_format: OutputFormat,
    },
    Refs {
        db_path: PathBuf,
        fdid: Fdid,
        direction: RefsDirection,
        output_format: OutputFormat,
    },
    Export {
        db_path: PathBuf,
        format: ExportFormat,
        file: Option<PathBuf>,
    },
    Forget {
        db_path: PathBuf,
        fdid: Fdid,
        output_format: OutputFormat,
    },
}

impl Command {
    pub fn db_path(&self) -> &Path {
        match self {
            Command::Status { db_path, .. }
            | Command::Refs { db_path, .. }
            | Command::Export { db_path, .. }
            | Command::Forget { db_path, .. } => db_path,
        }
    }
}

fn flag_value<'a>(args: &'a [String], i: usize) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} requires an argument", args[i]))
}

fn parse_output_format(value: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(value).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid output format: {}. Must be human, json, or pretty",
            value
        )
    })
}

fn parse_fdid(value: &str) -> Result<Fdid> {
    value
        .parse::<Fdid>()
        .map_err(|_| anyhow::anyhow!("Invalid FileDataID: {}", value))
}

/// Scan for `--output` anywhere on the command line.
///
/// Used to format errors when full parsing fails.
pub fn global_output_format(args: &[String]) -> OutputFormat {
    args.iter()
        .position(|x| x == "--output")
        .and_then(|i| args.get(i + 1))
        .and_then(|fmt| OutputFormat::from_str(fmt))
        .unwrap_or(OutputFormat::Human)
}

/// Parse a full argument vector (program name first)
pub fn parse_args_from<F>(args: &[String], print_version: F) -> Result<Command>
where
    F: FnOnce(),
{
    if args.len() < 2 {
        return Err(anyhow::anyhow!("Missing command"));
    }

    let command = &args[1];

    if command == "--version" || command == "-V" {
        print_version();
        std::process::exit(0);
    }

    if command == "--help" || command == "-h" {
        print_usage();
        std::process::exit(0);
    }

    let mut db_path: Option<PathBuf> = None;
    let mut fdid: Option<Fdid> = None;
    let mut direction = RefsDirection::Out;
    let mut output_format = OutputFormat::Human;
    let mut export_format = ExportFormat::Json;
    let mut file: Option<PathBuf> = None;

    let mut i = 2;
    while i < args.len() {
        let flag = args[i].as_str();
        match (command.as_str(), flag) {
            (_, "--db") => {
                db_path = Some(PathBuf::from(flag_value(args, i)?));
            }
            ("status" | "refs" | "forget", "--output") => {
                output_format = parse_output_format(flag_value(args, i)?)?;
            }
            ("refs" | "forget", "--fdid") => {
                fdid = Some(parse_fdid(flag_value(args, i)?)?);
            }
            ("refs", "--direction") => {
                direction = match flag_value(args, i)? {
                    "out" => RefsDirection::Out,
                    "in" => RefsDirection::In,
                    other => {
                        return Err(anyhow::anyhow!(
                            "Invalid direction: {}. Must be out or in",
                            other
                        ))
                    }
                };
            }
            ("export", "--format") => {
                let value = flag_value(args, i)?;
                export_format = ExportFormat::from_str(value).ok_or_else(|| {
                    anyhow::anyhow!("Invalid export format: {}. Must be json, jsonl, or csv", value)
                })?;
            }
            ("export", "--file") => {
                file = Some(PathBuf::from(flag_value(args, i)?));
            }
            _ => {
                return Err(anyhow::anyhow!("Unknown argument: {}", flag));
            }
        }
        i += 2;
    }

    let db_path = db_path.ok_or_else(|| anyhow::anyhow!("--db is required"))?;
    let require_fdid = |fdid: Option<Fdid>| fdid.ok_or_else(|| anyhow::anyhow!("--fdid is required"));

    match command.as_str() {
        "status" => Ok(Command::Status {
            db_path,
            output_format,
        }),
        "refs" => Ok(Command::Refs {
            db_path,
            fdid: require_fdid(fdid)?,
            direction,
            output_format,
        }),
        "export" => Ok(Command::Export {
            db_path,
            format: export_format,
            file,
        }),
        "forget" => Ok(Command::Forget {
            db_path,
            fdid: require_fdid(fdid)?,
            output_format,
        }),
        other => Err(anyhow::anyhow!("Unknown command: {}", other)),
    }
}

pub fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from(&args, || {
        println!("{}", crate::version::version());
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command> {
        let args: Vec<String> = std::iter::once("fdlink")
            .chain(line.split_whitespace())
            .map(String::from)
            .collect();
        parse_args_from(&args, || {})
    }

    #[test]
    fn test_parse_refs() {
        let command = parse("refs --db links.db --fdid 775971 --direction in --output json").unwrap();
        assert_eq!(
            command,
            Command::Refs {
                db_path: PathBuf::from("links.db"),
                fdid: 775971,
                direction: RefsDirection::In,
                output_format: OutputFormat::Json,
            }
        );
    }

    #[test]
    fn test_parse_export_defaults() {
        let command = parse("export --db links.db").unwrap();
        assert_eq!(
            command,
            Command::Export {
                db_path: PathBuf::from("links.db"),
                format: ExportFormat::Json,
                file: None,
            }
        );
    }

    #[test]
    fn test_missing_required_arguments() {
        assert!(parse("status").is_err());
        assert!(parse("forget --db links.db").is_err());
        assert!(parse("refs --db links.db --fdid").is_err());
    }

    #[test]
    fn test_rejects_flags_of_other_commands() {
        assert!(parse("status --db links.db --fdid 5").is_err());
        assert!(parse("export --db links.db --output json").is_err());
        assert!(parse("frobnicate --db links.db").is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse("refs --db a.db --fdid -1").is_err());
        assert!(parse("refs --db a.db --fdid 1 --direction up").is_err());
        assert!(parse("export --db a.db --format xml").is_err());
    }

    #[test]
    fn test_global_output_format() {
        let args: Vec<String> = ["fdlink", "bogus", "--output", "pretty"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(global_output_format(&args), OutputFormat::Pretty);
    }
}
