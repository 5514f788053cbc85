//! Cellgraph - batch front end for the spreadsheet engine

mod cli;

use anyhow::{Context, Result};
use cellgraph_core::document::DEFAULT_VERSION;
use cellgraph_core::{CellValue, Spreadsheet};
use cellgraph_engine::engine::{accept_all, format_number, identity, uppercase};
use log::info;
use serde::Serialize;
use std::env;

#[derive(Serialize)]
struct CellReport {
    name: String,
    contents: String,
    value: serde_json::Value,
}

fn json_value(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Number(n) if n.is_finite() => serde_json::json!(n),
        CellValue::Number(n) => serde_json::json!(format_number(*n)),
        CellValue::Text(s) => serde_json::json!(s),
        CellValue::Error(e) => serde_json::json!({ "error": e.reason() }),
    }
}

fn build_sheet(opts: &cli::Options) -> Spreadsheet {
    let version = opts
        .format_version
        .clone()
        .unwrap_or_else(|| DEFAULT_VERSION.to_string());
    if opts.upper {
        Spreadsheet::with_rules(uppercase, accept_all, version)
    } else {
        Spreadsheet::with_rules(identity, accept_all, version)
    }
}

fn print_cells(sheet: &Spreadsheet, json: bool) -> Result<()> {
    let names = sheet.nonempty_cell_names();
    if json {
        let mut reports = Vec::with_capacity(names.len());
        for name in names {
            reports.push(CellReport {
                contents: sheet.get_contents(&name)?.to_input_string(),
                value: json_value(&sheet.get_value(&name)?),
                name,
            });
        }
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for name in names {
            println!("{} = {}", name, sheet.get_value(&name)?);
        }
    }
    Ok(())
}

fn run(opts: cli::Options) -> Result<()> {
    let mut sheet = build_sheet(&opts);

    if let Some(path) = &opts.file_path {
        sheet
            .load_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
    }

    for edit in &opts.edits {
        let changed = sheet
            .set_contents(&edit.name, &edit.input)
            .with_context(|| format!("cannot set {}", edit.name))?;
        info!("{} recomputed: {}", edit.name, changed.join(", "));
    }

    print_cells(&sheet, opts.json)?;

    if let Some(path) = &opts.output_file {
        sheet
            .save_as(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        eprintln!("Saved to {}", path.display());
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let opts = match cli::parse_args(&args) {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_usage();
            std::process::exit(1);
        }
    };

    if opts.help {
        cli::print_usage();
        return;
    }

    if let Err(e) = run(opts) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
