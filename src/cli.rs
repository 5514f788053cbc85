//! Command line parsing.

use std::path::PathBuf;

pub fn print_usage() {
    eprintln!("Usage: cellgraph [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to load (.cgs)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <NAME=TEXT>     Set a cell (can be repeated, applied in order)");
    eprintln!("  -o, --output <FILE>       Save the sheet after applying edits");
    eprintln!("  --upper                   Uppercase cell names and formula variables");
    eprintln!("  --format-version <TAG>    Version tag expected in and written to files");
    eprintln!("  --json                    Print cells as JSON");
    eprintln!("  -h, --help                Print help");
}

/// A single `--set` edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub name: String,
    pub input: String,
}

#[derive(Debug, Default)]
pub struct Options {
    pub file_path: Option<PathBuf>,
    pub edits: Vec<Edit>,
    pub output_file: Option<PathBuf>,
    pub upper: bool,
    pub format_version: Option<String>,
    pub json: bool,
    pub help: bool,
}

/// Parse arguments, excluding the program name.
pub fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut opts = Options::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                opts.help = true;
                return Ok(opts);
            }
            "-s" | "--set" => {
                i += 1;
                let Some(arg) = args.get(i) else {
                    return Err("--set requires NAME=TEXT".to_string());
                };
                let Some((name, input)) = arg.split_once('=') else {
                    return Err(format!("--set expects NAME=TEXT, got: {}", arg));
                };
                opts.edits.push(Edit {
                    name: name.to_string(),
                    input: input.to_string(),
                });
            }
            "-o" | "--output" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    return Err("--output requires a file path".to_string());
                };
                opts.output_file = Some(PathBuf::from(path));
            }
            "--upper" => opts.upper = true,
            "--format-version" => {
                i += 1;
                let Some(tag) = args.get(i) else {
                    return Err("--format-version requires a value".to_string());
                };
                opts.format_version = Some(tag.to_string());
            }
            "--json" => opts.json = true,
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if opts.file_path.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                opts.file_path = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(opts)
}
