//! Retorno (return) file model, factory and reader plumbing.
//!
//! A retorno file is the bank's reply: one header, one transaction line
//! per billet event, one trailer. The factory sniffs the record length
//! (400 or 240) and the bank code from the first line, then dispatches to
//! the bank-specific reader through an explicit registry. The parsed file
//! is read-only; iteration goes through a 1-indexed seekable cursor.

use crate::codes::BilletOccurrence;
use crate::encoding;
use crate::error::{Error, Result};
use crate::CnabType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sentinel bank code for files that match no known layout.
pub const UNKNOWN_BANK: &str = "000";

/// Parsed retorno header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnHeader {
    /// Three-digit bank code.
    pub bank_code: String,
    /// Company code at the bank (carries wallet/agency/account).
    pub company_code: String,
    /// Beneficiary name as registered at the bank.
    pub company_name: String,
    /// Agency number extracted from the company code, when present.
    pub agency: Option<String>,
    /// Account number extracted from the company code, when present.
    pub account: Option<String>,
    /// Date the bank generated the file.
    pub file_date: NaiveDate,
    /// Bank notice / client code (aviso bancário).
    pub bank_notice: String,
}

/// One billet event reported by the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTransaction {
    pub wallet: String,
    /// Nosso número, without check digit.
    pub our_number: String,
    pub document_number: String,
    /// Beneficiary control number (uso da empresa).
    pub control_number: String,
    /// Raw occurrence code as reported by the bank.
    pub occurrence_code: u32,
    pub occurrence_date: NaiveDate,
    /// Up to five 2-digit rejection reason codes, zeros stripped.
    pub rejection_reasons: Vec<u32>,
    pub due_date: Option<NaiveDate>,
    pub credit_date: Option<NaiveDate>,
    pub document_value: Decimal,
    pub paid_value: Decimal,
    pub discount_value: Decimal,
    pub abatement_value: Decimal,
    pub interest_value: Decimal,
    pub fine_value: Decimal,
    pub tariff_value: Decimal,
    pub iof_value: Decimal,
    /// PIX transaction id, when the layout carries one (CNAB240 only).
    pub pix_tx_id: Option<String>,
    /// PIX SPI location URL, when the layout carries one (CNAB240 only).
    pub pix_spi_url: Option<String>,
}

impl ReturnTransaction {
    /// Occurrence resolved against the vocabulary. Unknown codes fail.
    pub fn occurrence(&self) -> Result<BilletOccurrence> {
        BilletOccurrence::from_code(self.occurrence_code)
    }

    /// Occurrence description. Unknown codes fail.
    pub fn occurrence_description(&self) -> Result<&'static str> {
        Ok(self.occurrence()?.description())
    }

    /// Whether this event settles the billet.
    pub fn is_settlement(&self) -> bool {
        self.occurrence().map(|o| o.is_settlement()).unwrap_or(false)
    }

    /// Whether this event rejects a shipped instruction.
    pub fn is_rejection(&self) -> bool {
        self.occurrence().map(|o| o.is_rejection()).unwrap_or(false)
    }

    /// Net value credited to the beneficiary: paid minus tariff.
    pub fn net_credited(&self) -> Decimal {
        self.paid_value - self.tariff_value
    }
}

/// Parsed retorno trailer: per-occurrence record counts and the aggregate
/// value under collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTrailer {
    pub notice_count: u32,
    pub bond_count: u32,
    pub bond_value: Decimal,
    pub entered_count: u32,
    pub paid_count: u32,
    pub dropped_count: u32,
    pub changed_count: u32,
    pub errored_count: u32,
}

/// A fully parsed retorno file. Loaded once, then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnFile {
    pub bank_code: String,
    pub cnab_type: CnabType,
    pub header: ReturnHeader,
    pub transactions: Vec<ReturnTransaction>,
    pub trailer: ReturnTrailer,
}

impl ReturnFile {
    /// Number of transaction records.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Transaction by 1-based position.
    pub fn get(&self, position: usize) -> Option<&ReturnTransaction> {
        if position == 0 {
            return None;
        }
        self.transactions.get(position - 1)
    }

    /// Sequential cursor over the transactions, positioned at 1.
    pub fn cursor(&self) -> TransactionCursor<'_> {
        TransactionCursor {
            file: self,
            position: 1,
        }
    }
}

/// 1-indexed seekable cursor over a return file's transactions.
///
/// `next()` (via `Iterator`) yields the current transaction and advances;
/// `seek`/`rewind`/`current`/`valid` give random access for callers that
/// resume processing mid-file.
#[derive(Debug, Clone)]
pub struct TransactionCursor<'a> {
    file: &'a ReturnFile,
    position: usize,
}

impl<'a> TransactionCursor<'a> {
    /// Move back to position 1.
    pub fn rewind(&mut self) {
        self.position = 1;
    }

    /// Jump to a 1-based position. The position may be past the end; the
    /// cursor simply becomes invalid.
    pub fn seek(&mut self, position: usize) {
        self.position = position.max(1);
    }

    /// Current 1-based position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Transaction under the cursor, if any.
    pub fn current(&self) -> Option<&'a ReturnTransaction> {
        self.file.get(self.position)
    }

    /// Whether the cursor points at an existing transaction.
    pub fn valid(&self) -> bool {
        self.current().is_some()
    }
}

impl<'a> Iterator for TransactionCursor<'a> {
    type Item = &'a ReturnTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.current()?;
        self.position += 1;
        Some(item)
    }
}

/// Detects the layout of a retorno file and dispatches to the bank reader.
pub struct ReturnFileFactory;

impl ReturnFileFactory {
    /// Load and parse a retorno file from disk.
    ///
    /// Fails with a format error when the file does not exist or its
    /// first line matches no known CNAB signature, and with a
    /// configuration error when the bank has no reader implementation.
    pub fn make(path: impl AsRef<Path>) -> Result<ReturnFile> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::Format(format!(
                "return file not found: {}",
                path.display()
            )));
        }
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a retorno file already loaded in memory (wire bytes,
    /// Windows-1252/ISO-8859-1).
    pub fn from_bytes(bytes: &[u8]) -> Result<ReturnFile> {
        let content = encoding::to_utf8(bytes);
        let lines: Vec<String> = content
            .split(['\r', '\n'])
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect();
        let first = lines
            .first()
            .ok_or_else(|| Error::Format("return file is empty".into()))?;

        let (cnab_type, bank_code) = Self::detect(first)?;
        Self::load_bank_from_code(&bank_code, cnab_type, &lines)
    }

    /// Derive record length and bank code from the first line.
    ///
    /// CNAB400 headers start with `"02RETORNO"` and carry the bank code
    /// at columns 77–79; CNAB240 headers carry `'2'` at column 143 and
    /// the bank code at columns 1–3. Anything else is not a CNAB return
    /// file (sentinel bank code 000).
    pub fn detect(row: &str) -> Result<(CnabType, String)> {
        let trimmed = row.trim_end_matches(['\r', '\n']);
        match trimmed.trim().len() {
            400 => {
                if trimmed.starts_with("02RETORNO") {
                    Ok((CnabType::Cnab400, cut(trimmed, 77, 79)?))
                } else {
                    Err(Error::Format(format!(
                        "not a valid CNAB return file (bank {})",
                        UNKNOWN_BANK
                    )))
                }
            }
            240 => {
                if cut(trimmed, 143, 143)? == "2" {
                    Ok((CnabType::Cnab240, cut(trimmed, 1, 3)?))
                } else {
                    Err(Error::Format(format!(
                        "not a valid CNAB return file (bank {})",
                        UNKNOWN_BANK
                    )))
                }
            }
            other => Err(Error::Format(format!(
                "not a valid CNAB return file: record length {} (bank {})",
                other, UNKNOWN_BANK
            ))),
        }
    }

    /// Resolve a bank code to its reader and parse the file.
    ///
    /// The registry is explicit: documented bank codes either map to a
    /// concrete reader or fail with a configuration error naming the
    /// bank; unknown codes fail outright.
    pub fn load_bank_from_code(
        bank_code: &str,
        cnab_type: CnabType,
        lines: &[String],
    ) -> Result<ReturnFile> {
        let normalized = format!("{:0>3}", bank_code.trim());
        match (normalized.as_str(), cnab_type) {
            ("237", CnabType::Cnab400) => crate::bradesco::parse_return(lines),
            (code, cnab) => {
                let bank = match code {
                    "001" => Some("Banco do Brasil"),
                    "033" => Some("Santander"),
                    "070" => Some("BRB"),
                    "090" => Some("Unicred"),
                    "104" => Some("Caixa Econômica Federal"),
                    "237" => Some("Bradesco"),
                    "341" => Some("Itaú"),
                    _ => None,
                };
                match bank {
                    Some(name) => Err(Error::Configuration(format!(
                        "no {} reader implemented for {} (bank {})",
                        cnab.description(),
                        name,
                        code
                    ))),
                    None => Err(Error::Configuration(format!(
                        "unsupported bank code {}",
                        code
                    ))),
                }
            }
        }
    }
}

/// Extract and trim a 1-based inclusive column range from a line.
///
/// Lines shorter than `end` yield what is actually there (trailing spaces
/// are routinely dropped by transmission tools); ranges past column 400
/// or with `end` before `start` are errors.
pub fn cut(line: &str, start: usize, end: usize) -> Result<String> {
    if end < start || start == 0 {
        return Err(Error::ColumnRange {
            start,
            end,
            message: "end column before start column".into(),
        });
    }
    if end > 400 {
        return Err(Error::ColumnRange {
            start,
            end,
            message: "CNAB records never exceed 400 columns".into(),
        });
    }
    let slice: String = line
        .chars()
        .skip(start - 1)
        .take(end - start + 1)
        .collect();
    Ok(slice.trim().to_string())
}

/// Reconstruct a monetary value from an unsigned wire digit string with
/// an implied decimal point at `len − decimals`.
pub fn to_float(digits: &str, decimals: u32) -> Result<Decimal> {
    let trimmed = digits.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidAmount(digits.to_string()));
    }
    let value: i128 = trimmed
        .parse()
        .map_err(|_| Error::InvalidAmount(digits.to_string()))?;
    Ok(Decimal::from_i128_with_scale(value, decimals))
}

/// Parse a `ddmmyy` wire date where all-zero means absent.
pub fn optional_date(text: &str) -> Result<Option<NaiveDate>> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.bytes().all(|b| b == b'0') {
        return Ok(None);
    }
    crate::field::parse_ddmmyy(trimmed).map(Some)
}
