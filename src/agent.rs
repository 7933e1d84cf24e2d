//! Financial agent value object.
//!
//! A [`FinancialAgent`] is any banking party in the billing exchange: the
//! emitter (beneficiário), the payer (sacado/pagador) or a guarantor
//! (sacador avalista).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of identification document, derived from its digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Natural person (11 digits).
    Cpf,
    /// Legal entity (14 digits).
    Cnpj,
    /// Anything else (foreign documents, legacy records).
    Other,
}

impl DocumentKind {
    /// CNAB "tipo de inscrição" code for the kind.
    pub fn inscription_code(&self) -> u32 {
        match self {
            DocumentKind::Cpf => 1,
            DocumentKind::Cnpj => 2,
            DocumentKind::Other => 99,
        }
    }
}

/// An agency or account number with an optional check digit (DAC).
///
/// Parsed from `"NNN-D"` strings; a missing check digit stays absent and
/// is never silently zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub number: String,
    pub check_digit: Option<String>,
}

impl AccountRef {
    pub fn new(number: impl Into<String>) -> Self {
        AccountRef {
            number: number.into(),
            check_digit: None,
        }
    }

    /// The check digit, or the given fallback when absent.
    pub fn check_digit_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.check_digit.as_deref().unwrap_or(fallback)
    }
}

impl FromStr for AccountRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("empty agency/account number".into()));
        }
        match trimmed.split_once('-') {
            Some((number, digit)) => {
                let digit = digit.trim();
                Ok(AccountRef {
                    number: number.trim().to_string(),
                    check_digit: if digit.is_empty() {
                        None
                    } else {
                        Some(digit.to_string())
                    },
                })
            }
            None => Ok(AccountRef::new(trimmed)),
        }
    }
}

/// A banking party: emitter, payer or guarantor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialAgent {
    /// Legal or trade name.
    pub name: String,

    /// CPF/CNPJ or other identification document, digits and mask chars.
    pub document: String,

    /// Street address (logradouro + number).
    pub address: Option<String>,

    /// District (bairro).
    pub district: Option<String>,

    /// City name.
    pub city: Option<String>,

    /// Two-letter state code.
    pub state: Option<String>,

    /// Postal code (CEP), digits only or `NNNNN-NNN`.
    pub postal_code: Option<String>,

    /// Bank agency with optional check digit.
    pub agency: Option<AccountRef>,

    /// Bank account with optional check digit.
    pub account: Option<AccountRef>,

    /// PIX key carried as agent metadata (no PIX message flow here).
    pub pix_key: Option<String>,

    /// Path or identifier of the agent's logo, for billet rendering.
    pub logo: Option<String>,
}

impl FinancialAgent {
    /// Create an agent with just name and document; bank references and
    /// address come in through the struct fields.
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        FinancialAgent {
            name: name.into(),
            document: document.into(),
            address: None,
            district: None,
            city: None,
            state: None,
            postal_code: None,
            agency: None,
            account: None,
            pix_key: None,
            logo: None,
        }
    }

    /// Document kind, derived from the digit count of the document.
    pub fn document_kind(&self) -> DocumentKind {
        let digits = self.document.chars().filter(char::is_ascii_digit).count();
        match digits {
            11 => DocumentKind::Cpf,
            14 => DocumentKind::Cnpj,
            _ => DocumentKind::Other,
        }
    }

    /// Document number with mask characters removed.
    pub fn document_digits(&self) -> String {
        self.document.chars().filter(char::is_ascii_digit).collect()
    }

    /// Postal code split into the 5-digit prefix and 3-digit suffix.
    pub fn postal_code_parts(&self) -> (String, String) {
        let digits: String = self
            .postal_code
            .as_deref()
            .unwrap_or("")
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let prefix = digits.chars().take(5).collect();
        let suffix = digits.chars().skip(5).take(3).collect();
        (prefix, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_account_ref_with_digit() {
        let agency: AccountRef = "1234-5".parse().unwrap();
        assert_eq!(agency.number, "1234");
        assert_eq!(agency.check_digit.as_deref(), Some("5"));
    }

    #[test]
    fn test_account_ref_without_digit() {
        let account: AccountRef = "123456".parse().unwrap();
        assert_eq!(account.number, "123456");
        assert_eq!(account.check_digit, None);
        // Absent digit is never zero-filled on its own.
        assert_eq!(account.check_digit_or("0"), "0");
    }

    #[test]
    fn test_account_ref_rejects_empty() {
        assert!("  ".parse::<AccountRef>().is_err());
    }

    #[test]
    fn test_document_kind() {
        let mut agent = FinancialAgent::new("ACME", "12.345.678/0001-95");
        assert_eq!(agent.document_kind(), DocumentKind::Cnpj);
        agent.document = "123.456.789-09".into();
        assert_eq!(agent.document_kind(), DocumentKind::Cpf);
        agent.document = "PASSPORT-X1".into();
        assert_eq!(agent.document_kind(), DocumentKind::Other);
    }

    #[test]
    fn test_postal_code_parts() {
        let mut agent = FinancialAgent::new("ACME", "1");
        agent.postal_code = Some("01310-100".into());
        assert_eq!(agent.postal_code_parts(), ("01310".into(), "100".into()));
        agent.postal_code = None;
        assert_eq!(agent.postal_code_parts(), ("".into(), "".into()));
    }
}
