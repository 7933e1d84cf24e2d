//! CNAB Check - CLI tool for structural validation of a remessa file.

use clap::Parser;
use cnab_billing::{encoding, CnabType, Error, Result};
use std::fs;

#[derive(Parser)]
#[command(name = "cnab_check")]
#[command(about = "Validate the structure of a CNAB remessa file", long_about = None)]
struct Cli {
    /// Path to the remessa file
    file: String,

    /// Expected layout (400, 240, cnab400, cnab240)
    #[arg(long, default_value = "400")]
    cnab: String,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let cnab: CnabType = cli.cnab.parse()?;
    let line_length = cnab.line_length();
    let bytes = fs::read(&cli.file)?;
    let content = encoding::to_utf8(&bytes);
    let lines: Vec<&str> = content
        .split(['\r', '\n'])
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() < 3 {
        return Err(Error::Format(format!(
            "a remessa file has at least 3 records, found {}",
            lines.len()
        )));
    }

    for (index, line) in lines.iter().enumerate() {
        let record = index + 1;
        if line.chars().count() != line_length {
            return Err(Error::Format(format!(
                "record {} is {} columns, expected {}",
                record,
                line.chars().count(),
                line_length
            )));
        }

        if !line.is_ascii() {
            return Err(Error::Format(format!(
                "record {} contains non-ASCII characters",
                record
            )));
        }

        let expected_type = if record == 1 {
            '0'
        } else if record == lines.len() {
            '9'
        } else {
            '1'
        };
        let actual = line.chars().next().unwrap_or(' ');
        if actual != expected_type {
            return Err(Error::Format(format!(
                "record {} has type '{}', expected '{}'",
                record, actual, expected_type
            )));
        }

        let sequence = &line[line.len() - 6..];
        let parsed: usize = sequence.parse().map_err(|_| {
            Error::Format(format!("record {} has no trailing sequence number", record))
        })?;
        if parsed != record {
            return Err(Error::Format(format!(
                "record {} carries sequence {}, expected {}",
                record, parsed, record
            )));
        }
    }

    println!(
        "OK: {} records ({} transactions), all {} columns",
        lines.len(),
        lines.len() - 2,
        line_length
    );
    Ok(())
}
