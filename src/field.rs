//! Fixed-width field formatting for CNAB records.
//!
//! CNAB lines are fixed-size character buffers addressed by 1-based
//! inclusive column ranges. This module provides the buffer type, the
//! field masks (numeric vs alphanumeric), and the charset normalization
//! that keeps every output byte 7-bit ASCII — banks reject anything else.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Field mask controlling alignment, fill and digit extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMask {
    /// `9` / `N`: digits only, right-aligned, zero-filled.
    Numeric,
    /// `9L` / `NL`: digits extracted from a formatted value (e.g. a masked
    /// monetary string) before numeric treatment.
    NumericFromFormatted,
    /// `A` / `X`: alphanumeric, left-aligned, space-filled.
    Alphanumeric,
}

impl FromStr for FieldMask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "9" | "N" => Ok(FieldMask::Numeric),
            "9L" | "NL" => Ok(FieldMask::NumericFromFormatted),
            "A" | "X" => Ok(FieldMask::Alphanumeric),
            _ => Err(Error::Validation(format!("Unknown field mask: {}", s))),
        }
    }
}

impl FieldMask {
    /// Default fill character for the mask.
    pub fn fill(&self) -> char {
        match self {
            FieldMask::Numeric | FieldMask::NumericFromFormatted => '0',
            FieldMask::Alphanumeric => ' ',
        }
    }
}

/// A fixed-size line buffer with positional field writes.
///
/// One buffer holds exactly one CNAB record line. Writes address 1-based
/// inclusive column ranges and may never exceed the declared width or
/// cross into a neighboring field.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    bytes: Vec<u8>,
}

impl LineBuffer {
    /// Create a space-filled buffer of `line_length` columns.
    pub fn new(line_length: usize) -> Self {
        LineBuffer {
            bytes: vec![b' '; line_length],
        }
    }

    /// Total number of columns.
    pub fn line_length(&self) -> usize {
        self.bytes.len()
    }

    /// Write `value` into columns `start..=end` (1-based inclusive).
    ///
    /// The value must already be formatted: it is placed left-aligned and
    /// the remainder of the range keeps its current content. Errors:
    /// `ColumnRange` when `end < start` or `end` exceeds the line length,
    /// `Validation` when the value is wider than the range.
    pub fn write(&mut self, start: usize, end: usize, value: &str) -> Result<()> {
        if start == 0 || end < start {
            return Err(Error::ColumnRange {
                start,
                end,
                message: "end column before start column".into(),
            });
        }
        if end > self.bytes.len() {
            return Err(Error::ColumnRange {
                start,
                end,
                message: format!("line is only {} columns wide", self.bytes.len()),
            });
        }
        let width = end - start + 1;
        if value.len() > width {
            return Err(Error::Validation(format!(
                "value '{}' is {} chars, field {}..={} holds {}",
                value,
                value.len(),
                start,
                end,
                width
            )));
        }
        if !value.is_ascii() {
            return Err(Error::Validation(format!(
                "non-ASCII value written to field {}..={}: '{}'",
                start, end, value
            )));
        }
        self.bytes[start - 1..start - 1 + value.len()].copy_from_slice(value.as_bytes());
        Ok(())
    }

    /// Format `value` under `mask` to the exact field width, then write it.
    pub fn write_field(
        &mut self,
        mask: FieldMask,
        start: usize,
        end: usize,
        value: &str,
    ) -> Result<()> {
        if end < start || end > self.bytes.len() {
            // Let write() produce the range error before formatting.
            return self.write(start, end, "");
        }
        let formatted = format_field(mask, value, end - start + 1, 0, None)?;
        self.write(start, end, &formatted)
    }

    /// Read back columns `start..=end` (1-based inclusive), untrimmed.
    pub fn read(&self, start: usize, end: usize) -> Result<&str> {
        if start == 0 || end < start || end > self.bytes.len() {
            return Err(Error::ColumnRange {
                start,
                end,
                message: "range outside buffer".into(),
            });
        }
        // Buffer only ever holds ASCII, see write().
        Ok(std::str::from_utf8(&self.bytes[start - 1..end]).expect("buffer is ASCII"))
    }

    /// Consume the buffer and return the finished line.
    pub fn into_string(self) -> String {
        String::from_utf8(self.bytes).expect("buffer is ASCII")
    }
}

/// Format a value for a fixed-width field.
///
/// The value is upper-cased and Portuguese diacritics are substituted
/// before masking. Numeric masks strip non-digits and right-align with
/// zeros; alphanumeric masks left-align with spaces. When
/// `decimal_places > 0` the value is parsed as a decimal amount, rounded
/// half-up to that many places, and the separator removed, producing an
/// unsigned digit string — the wire form of every CNAB monetary field.
///
/// Fails with a validation error when the result cannot fit in `size`.
pub fn format_field(
    mask: FieldMask,
    value: &str,
    size: usize,
    decimal_places: u32,
    fill: Option<char>,
) -> Result<String> {
    let fill = fill.unwrap_or_else(|| mask.fill());
    let normalized = strip_diacritics(value);

    let content = match mask {
        FieldMask::Numeric | FieldMask::NumericFromFormatted => {
            if decimal_places > 0 {
                let digits: String = normalized
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.' || *c == '-')
                    .collect();
                let amount = parse_decimal(&digits)?;
                decimal_digits(amount, decimal_places)?
            } else {
                normalized.chars().filter(char::is_ascii_digit).collect()
            }
        }
        FieldMask::Alphanumeric => normalize_chars(&normalized),
    };

    if content.len() > size {
        return Err(Error::Validation(format!(
            "value '{}' does not fit in {} columns",
            content, size
        )));
    }

    let pad: String = std::iter::repeat(fill).take(size - content.len()).collect();
    Ok(match mask {
        FieldMask::Numeric | FieldMask::NumericFromFormatted => format!("{}{}", pad, content),
        FieldMask::Alphanumeric => format!("{}{}", content, pad),
    })
}

/// Render a monetary amount as an unsigned zero-padded digit string of
/// exactly `size` characters with `decimal_places` implied decimals.
pub fn format_amount(amount: Decimal, size: usize, decimal_places: u32) -> Result<String> {
    let digits = decimal_digits(amount, decimal_places)?;
    if digits.len() > size {
        return Err(Error::Validation(format!(
            "amount {} does not fit in {} columns",
            amount, size
        )));
    }
    Ok(format!("{:0>width$}", digits, width = size))
}

fn decimal_digits(amount: Decimal, decimal_places: u32) -> Result<String> {
    if amount.is_sign_negative() {
        return Err(Error::InvalidAmount(format!(
            "negative amount on the wire: {}",
            amount
        )));
    }
    let rounded = amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.*}", decimal_places as usize, rounded);
    Ok(text.chars().filter(char::is_ascii_digit).collect())
}

fn parse_decimal(text: &str) -> Result<Decimal> {
    let cleaned = if text.contains(',') {
        // Brazilian format: thousands '.' and decimal ','.
        text.replace('.', "").replace(',', ".")
    } else {
        text.to_string()
    };
    Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount(text.to_string()))
}

/// Upper-case and replace Portuguese accented characters with their plain
/// ASCII letter. Characters outside the table are kept as-is.
pub fn strip_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
            'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'E',
            'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
            'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
            'ç' | 'Ç' => 'C',
            'ñ' | 'Ñ' => 'N',
            _ => c.to_ascii_uppercase(),
        })
        .collect()
}

/// Restrict text to 7-bit ASCII letters, digits and the punctuation the
/// banks accept. Everything else becomes a space.
pub fn normalize_chars(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || " .,-/()&*=+%$#:;'".contains(c) {
                c
            } else {
                ' '
            }
        })
        .collect()
}

/// Format a date as `ddmmyy`, the CNAB400 wire form.
pub fn format_ddmmyy(date: NaiveDate) -> String {
    format!("{:02}{:02}{:02}", date.day(), date.month(), date.year() % 100)
}

/// Parse a `ddmmyy` wire date. Years below 50 land in 2000+.
pub fn parse_ddmmyy(text: &str) -> Result<NaiveDate> {
    if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidDate(text.to_string()));
    }
    let day: u32 = text[0..2].parse().map_err(|_| Error::InvalidDate(text.into()))?;
    let month: u32 = text[2..4].parse().map_err(|_| Error::InvalidDate(text.into()))?;
    let year: i32 = text[4..6].parse().map_err(|_| Error::InvalidDate(text.into()))?;
    let full_year = if year < 50 { 2000 + year } else { 1900 + year };
    NaiveDate::from_ymd_opt(full_year, month, day)
        .ok_or_else(|| Error::InvalidDate(format!("{}-{}-{}", full_year, month, day)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mask_from_str() {
        assert_eq!("9".parse::<FieldMask>().unwrap(), FieldMask::Numeric);
        assert_eq!("N".parse::<FieldMask>().unwrap(), FieldMask::Numeric);
        assert_eq!("9L".parse::<FieldMask>().unwrap(), FieldMask::NumericFromFormatted);
        assert_eq!("X".parse::<FieldMask>().unwrap(), FieldMask::Alphanumeric);
        assert!("Z".parse::<FieldMask>().is_err());
    }

    #[test]
    fn test_write_round_trip() {
        let mut buf = LineBuffer::new(400);
        buf.write(10, 19, "ABC").unwrap();
        assert_eq!(buf.read(10, 19).unwrap(), "ABC       ");
    }

    #[test]
    fn test_write_rejects_bad_ranges() {
        let mut buf = LineBuffer::new(400);
        assert!(matches!(
            buf.write(20, 10, "X"),
            Err(Error::ColumnRange { .. })
        ));
        assert!(matches!(
            buf.write(399, 401, "X"),
            Err(Error::ColumnRange { .. })
        ));
    }

    #[test]
    fn test_write_rejects_overflow() {
        let mut buf = LineBuffer::new(400);
        assert!(matches!(
            buf.write(1, 3, "ABCD"),
            Err(Error::Validation(_))
        ));
        // Neighboring fields stay untouched on failure.
        assert_eq!(buf.read(1, 4).unwrap(), "    ");
    }

    #[test]
    fn test_write_field_alignment() {
        let mut buf = LineBuffer::new(40);
        buf.write_field(FieldMask::Numeric, 1, 6, "42").unwrap();
        buf.write_field(FieldMask::Alphanumeric, 7, 16, "acme ltda").unwrap();
        assert_eq!(buf.read(1, 6).unwrap(), "000042");
        assert_eq!(buf.read(7, 16).unwrap(), "ACME LTDA ");
    }

    #[test]
    fn test_format_field_numeric_strips_nondigits() {
        assert_eq!(
            format_field(FieldMask::Numeric, "1234-5", 8, 0, None).unwrap(),
            "00012345"
        );
    }

    #[test]
    fn test_format_field_monetary() {
        assert_eq!(
            format_field(FieldMask::NumericFromFormatted, "1.500,00", 13, 2, None).unwrap(),
            "0000000150000"
        );
        assert_eq!(
            format_field(FieldMask::Numeric, "25.5", 10, 2, None).unwrap(),
            "0000002550"
        );
    }

    #[test]
    fn test_format_amount() {
        use rust_decimal::Decimal;
        assert_eq!(
            format_amount(Decimal::new(150000, 2), 13, 2).unwrap(),
            "0000000150000"
        );
        // Half-up at the rounding boundary.
        assert_eq!(format_amount(Decimal::new(10125, 3), 8, 2).unwrap(), "00001013");
        assert!(format_amount(Decimal::new(-1, 0), 8, 2).is_err());
    }

    #[test]
    fn test_strip_diacritics() {
        assert_eq!(strip_diacritics("José da Conceição"), "JOSE DA CONCEICAO");
        assert_eq!(strip_diacritics("Avenida São João"), "AVENIDA SAO JOAO");
    }

    #[test]
    fn test_normalize_chars() {
        assert_eq!(normalize_chars("RUA X, 10 - APTO 2"), "RUA X, 10 - APTO 2");
        assert_eq!(normalize_chars("A|B~C"), "A B C");
    }

    #[test]
    fn test_ddmmyy() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(format_ddmmyy(date), "070325");
        assert_eq!(parse_ddmmyy("070325").unwrap(), date);
        assert!(parse_ddmmyy("32a325").is_err());
    }
}
