//! CNAB Billing Codec
//!
//! A library for building remessa (shipping) files and parsing retorno
//! (return) files of the Brazilian CNAB billing exchange.
//!
//! # Supported layouts
//!
//! - **CNAB400**: 400-column fixed-width records (Bradesco implemented)
//! - **CNAB240**: detected, architecture extensible, no reader yet
//!
//! # Features
//!
//! - Byte-exact positional field layout with width/charset enforcement
//! - Legacy encoding repair (Windows-1252/ISO-8859-1 ↔ UTF-8)
//! - Closed code vocabularies for billet lifecycle events
//! - Bank-specific layouts behind a common builder and factory
//!
//! # Examples
//!
//! ## Building a remessa file
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use cnab_billing::agent::FinancialAgent;
//! use cnab_billing::billet::Billet;
//! use cnab_billing::bradesco::Bradesco;
//! use cnab_billing::remessa::{ShippingConfig, ShippingFileBuilder};
//!
//! let mut emitter = FinancialAgent::new("ACME LTDA", "12.345.678/0001-95");
//! emitter.agency = Some("1234-5".parse()?);
//! emitter.account = Some("123456-7".parse()?);
//!
//! let config = ShippingConfig {
//!     emitter,
//!     wallet: "09".into(),
//!     shipping_number: 1,
//!     shipping_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
//!     company_code: None,
//! };
//!
//! let payer = FinancialAgent::new("JOSE DA SILVA", "123.456.789-09");
//! let billet = Billet::new(
//!     "09",
//!     "12345678901",
//!     Decimal::new(150000, 2),
//!     NaiveDate::from_ymd_opt(2025, 4, 6).unwrap(),
//!     payer,
//! );
//!
//! let mut builder = ShippingFileBuilder::new(Bradesco, config);
//! builder.add_billet(billet)?;
//! let file = builder.generate()?;
//! # Ok::<(), cnab_billing::Error>(())
//! ```
//!
//! ## Parsing a retorno file
//!
//! ```no_run
//! use cnab_billing::retorno::ReturnFileFactory;
//!
//! let file = ReturnFileFactory::make("CB070301.RET")?;
//! for transaction in file.cursor() {
//!     if transaction.is_settlement() {
//!         println!("{} paid {}", transaction.our_number, transaction.paid_value);
//!     }
//! }
//! # Ok::<(), cnab_billing::Error>(())
//! ```

pub mod agent;
pub mod billet;
pub mod bradesco;
pub mod codes;
pub mod encoding;
pub mod error;
pub mod field;
pub mod remessa;
pub mod retorno;

use std::str::FromStr;

// Re-export commonly used types
pub use agent::{AccountRef, DocumentKind, FinancialAgent};
pub use billet::Billet;
pub use codes::{BilletInstruction, BilletOccurrence, BilletStatus, Instruction};
pub use error::{Error, Result};
pub use remessa::{ShippingConfig, ShippingFileBuilder, ShippingLayout};
pub use retorno::{ReturnFile, ReturnFileFactory, ReturnTransaction};

/// CNAB layout generations, named for their fixed record length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CnabType {
    /// 400-column records.
    Cnab400,
    /// 240-column records.
    Cnab240,
}

impl FromStr for CnabType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "400" | "cnab400" | "cnab-400" => Ok(CnabType::Cnab400),
            "240" | "cnab240" | "cnab-240" => Ok(CnabType::Cnab240),
            _ => Err(Error::Configuration(format!("unknown CNAB type: {}", s))),
        }
    }
}

impl CnabType {
    /// Fixed record length in columns.
    pub fn line_length(&self) -> usize {
        match self {
            CnabType::Cnab400 => 400,
            CnabType::Cnab240 => 240,
        }
    }

    /// Human-readable layout name.
    pub fn description(&self) -> &'static str {
        match self {
            CnabType::Cnab400 => "CNAB400",
            CnabType::Cnab240 => "CNAB240",
        }
    }
}
