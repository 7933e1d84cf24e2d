//! CNAB Inspect - CLI tool for eyeballing a retorno file.

use clap::Parser;
use cnab_billing::{bradesco, ReturnFileFactory, Result};

#[derive(Parser)]
#[command(name = "cnab_inspect")]
#[command(about = "Parse a CNAB retorno file and print its contents", long_about = None)]
struct Cli {
    /// Path to the retorno file
    file: String,

    /// Print every transaction, not just the summary
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let file = ReturnFileFactory::make(&cli.file)?;

    println!(
        "{} retorno from bank {} ({} transactions)",
        file.cnab_type.description(),
        file.bank_code,
        file.len()
    );
    println!(
        "Company: {} [{}]  File date: {}",
        file.header.company_name, file.header.company_code, file.header.file_date
    );
    if let (Some(agency), Some(account)) = (&file.header.agency, &file.header.account) {
        println!("Agency/account: {} / {}", agency, account);
    }

    let mut settled = 0usize;
    let mut rejected = 0usize;
    for transaction in file.cursor() {
        if transaction.is_settlement() {
            settled += 1;
        }
        if transaction.is_rejection() {
            rejected += 1;
        }
        if cli.verbose {
            let description = transaction
                .occurrence_description()
                .unwrap_or("(unknown occurrence)");
            println!(
                "  {} {} {:>12}  {}",
                transaction.occurrence_date, transaction.our_number, transaction.paid_value, description
            );
            for reason in &transaction.rejection_reasons {
                let detail = bradesco::rejection_description(*reason)
                    .unwrap_or("(unknown reason)");
                println!("      reason {:02}: {}", reason, detail);
            }
        }
    }

    println!(
        "Settled: {}  Rejected: {}  Bonds under collection: {} ({})",
        settled, rejected, file.trailer.bond_count, file.trailer.bond_value
    );

    Ok(())
}
