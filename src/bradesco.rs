//! Bradesco (bank 237) CNAB400 layout: remessa writer and retorno reader.
//!
//! Column map, 1-based inclusive, per the bank's collection manual.
//!
//! Remessa header (record type 0):
//!
//! ```text
//! 001      '0' record type            101-108  blank
//! 002      '1' remessa file code      109-110  'MX' system tag
//! 003-009  'REMESSA'                  111-117  sequential shipping number
//! 010-011  '01' service code          118-394  blank
//! 012-026  'COBRANCA'                 395-400  record sequence (000001)
//! 027-046  company code (20)
//! 047-076  company name (30)
//! 077-079  '237' bank code
//! 080-094  'BRADESCO'
//! 095-100  shipping date ddmmyy
//! ```
//!
//! Remessa transaction (record type 1):
//!
//! ```text
//! 001      '1' record type            150      'N' acceptance flag
//! 002-020  debit data (unused, 0)     151-156  document date ddmmyy
//! 021      '0'                        157-158  1st instruction code
//! 022-024  wallet                     159-160  2nd instruction (day count)
//! 025-029  agency                     161-173  arrears interest per day 13,2
//! 030-036  account                    174-179  discount deadline ddmmyy
//! 037      account check digit        180-192  discount value 13,2
//! 038-062  control number (25)        193-205  IOF value 13,2
//! 063-065  '000' debit bank           206-218  abatement value 13,2
//! 066      fine flag ('2' = percent)  219-220  payer inscription type
//! 067-070  fine percentage 4,2        221-234  payer document (14)
//! 071-081  nosso numero (11)          235-274  payer name (40)
//! 082      nosso numero check digit   275-314  payer address (40)
//! 083-092  discount per day 10,2      315-326  payer district (12)
//! 093      '2' emission mode          327-331  postal code prefix
//! 094      'N' automatic debit flag   332-334  postal code suffix
//! 095-108  blank                      335-394  guarantor name or message
//! 109-110  occurrence code            395-400  record sequence
//! 111-120  document number (10)
//! 121-126  due date ddmmyy
//! 127-139  document value 13,2
//! 140-142  '000' collection bank
//! 143-147  '00000' depositary agency
//! 148-149  species code
//! ```
//!
//! The retorno mirrors the transaction identification columns and adds
//! settlement amounts (153-292), the credit date (296-301) and up to five
//! rejection reason codes (319-328).

use crate::agent::FinancialAgent;
use crate::billet::{Billet, FineRule, InterestRule};
use crate::codes::{BilletInstruction, Instruction};
use crate::error::{Error, Result};
use crate::field::{self, FieldMask, LineBuffer};
use crate::remessa::{percent, ShippingConfig, ShippingLayout};
use crate::retorno::{
    cut, optional_date, to_float, ReturnFile, ReturnHeader, ReturnTrailer, ReturnTransaction,
};
use crate::CnabType;
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

/// Per-day remessa counter limit: the file name carries the counter in
/// two base-36 characters, so "ZZ" = 1295 is the last shipment of a day.
pub const SHIPPING_COUNTER_LIMIT: u32 = 1295;

const LINE_LENGTH: usize = 400;

/// Bradesco CNAB400 layout.
pub struct Bradesco;

impl Bradesco {
    /// Company code at the bank: derived from wallet + agency + account +
    /// check digit when not configured explicitly.
    fn company_code(config: &ShippingConfig) -> Result<String> {
        if let Some(ref code) = config.company_code {
            return field::format_field(FieldMask::Numeric, code, 20, 0, None);
        }
        let agency = config
            .emitter
            .agency
            .as_ref()
            .ok_or_else(|| Error::MissingFields(vec!["emitter.agency".into()]))?;
        let account = config
            .emitter
            .account
            .as_ref()
            .ok_or_else(|| Error::MissingFields(vec!["emitter.account".into()]))?;
        let raw = format!(
            "0{:0>3}{:0>5}{:0>7}{}",
            digits(&config.wallet),
            digits(&agency.number),
            digits(&account.number),
            account.check_digit_or("0"),
        );
        Ok(format!("{:0>20}", raw))
    }

    /// Bank occurrence code for the billet's primary instruction.
    ///
    /// Codes that diverge from the canonical vocabulary are mapped
    /// explicitly; the rest fall through to the instruction's own code
    /// rendered as two digits.
    fn occurrence_code(instruction: BilletInstruction) -> String {
        match instruction {
            BilletInstruction::Protest => "09".into(),
            BilletInstruction::ProtestSuspendDischarge => "10".into(),
            BilletInstruction::ProtestSuspendKeep => "11".into(),
            other => format!("{:02}", other.code()),
        }
    }

    /// Bank code for the 1st instruction field (post-expiration behavior).
    fn instruction_code(instruction: Instruction) -> &'static str {
        match instruction {
            Instruction::ProtestAfterDue => "06",
            Instruction::NegativateAfterDue => "66",
            Instruction::DropAfterDue => "18",
            Instruction::CancelProtestOrNegativation => "98",
        }
    }

    /// Fine percentage for the 66-70 block, derived from the billet's
    /// fine rule. Fixed fines become a percentage of the document value.
    fn fine_percentage(billet: &Billet) -> Result<Option<Decimal>> {
        match billet.fine {
            FineRule::None => Ok(None),
            FineRule::Percentage(rate) => Ok(Some(rate)),
            FineRule::Fixed(amount) => {
                if billet.value.is_zero() {
                    return Err(Error::Validation(
                        "fixed fine on a zero-value billet".into(),
                    ));
                }
                Ok(Some(
                    (amount * Decimal::ONE_HUNDRED / billet.value)
                        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                ))
            }
        }
    }

    /// Daily arrears interest: a fixed daily value, or the rate applied
    /// to the document value.
    fn daily_interest(billet: &Billet) -> Decimal {
        match billet.interest {
            InterestRule::None => Decimal::ZERO,
            InterestRule::DailyValue(value) => value,
            InterestRule::DailyRate(rate) => percent(billet.value, rate),
        }
    }

    fn write_payer(line: &mut LineBuffer, payer: &FinancialAgent) -> Result<()> {
        let inscription = format!("{:02}", payer.document_kind().inscription_code());
        line.write(219, 220, &inscription)?;
        line.write(221, 234, &field::format_field(FieldMask::Numeric, &payer.document, 14, 0, None)?)?;
        line.write(235, 274, &fit(FieldMask::Alphanumeric, &payer.name, 40)?)?;
        line.write(275, 314, &fit(FieldMask::Alphanumeric, payer.address.as_deref().unwrap_or(""), 40)?)?;
        line.write(315, 326, &fit(FieldMask::Alphanumeric, payer.district.as_deref().unwrap_or(""), 12)?)?;
        let (cep, suffix) = payer.postal_code_parts();
        line.write(327, 331, &field::format_field(FieldMask::Numeric, &cep, 5, 0, None)?)?;
        line.write(332, 334, &field::format_field(FieldMask::Numeric, &suffix, 3, 0, None)?)?;
        Ok(())
    }
}

impl ShippingLayout for Bradesco {
    fn bank_code(&self) -> &'static str {
        "237"
    }

    fn bank_name(&self) -> &'static str {
        "BRADESCO"
    }

    fn line_length(&self) -> usize {
        LINE_LENGTH
    }

    fn header(&self, config: &ShippingConfig, sequence: u32) -> Result<LineBuffer> {
        let mut line = LineBuffer::new(LINE_LENGTH);
        line.write(1, 1, "0")?;
        line.write(2, 2, "1")?;
        line.write(3, 9, "REMESSA")?;
        line.write(10, 11, "01")?;
        line.write(12, 26, &fit(FieldMask::Alphanumeric, "COBRANCA", 15)?)?;
        line.write(27, 46, &Self::company_code(config)?)?;
        line.write(47, 76, &fit(FieldMask::Alphanumeric, &config.emitter.name, 30)?)?;
        line.write(77, 79, self.bank_code())?;
        line.write(80, 94, &fit(FieldMask::Alphanumeric, self.bank_name(), 15)?)?;
        line.write(95, 100, &field::format_ddmmyy(config.shipping_date))?;
        line.write(109, 110, "MX")?;
        line.write(111, 117, &format!("{:07}", config.shipping_number))?;
        line.write(395, 400, &format!("{:06}", sequence))?;
        Ok(line)
    }

    fn transaction(
        &self,
        config: &ShippingConfig,
        billet: &Billet,
        sequence: u32,
    ) -> Result<LineBuffer> {
        let agency = config
            .emitter
            .agency
            .as_ref()
            .ok_or_else(|| Error::MissingFields(vec!["emitter.agency".into()]))?;
        let account = config
            .emitter
            .account
            .as_ref()
            .ok_or_else(|| Error::MissingFields(vec!["emitter.account".into()]))?;

        let mut line = LineBuffer::new(LINE_LENGTH);
        line.write(1, 1, "1")?;
        line.write(2, 20, &"0".repeat(19))?;
        line.write(21, 21, "0")?;
        line.write(22, 24, &field::format_field(FieldMask::Numeric, &billet.wallet, 3, 0, None)?)?;
        line.write(25, 29, &field::format_field(FieldMask::Numeric, &agency.number, 5, 0, None)?)?;
        line.write(30, 36, &field::format_field(FieldMask::Numeric, &account.number, 7, 0, None)?)?;
        line.write(37, 37, account.check_digit_or("0"))?;
        line.write(38, 62, &fit(FieldMask::Alphanumeric, &billet.control_number, 25)?)?;
        line.write(63, 65, "000")?;

        match Self::fine_percentage(billet)? {
            Some(rate) => {
                line.write(66, 66, "2")?;
                line.write(67, 70, &field::format_amount(rate, 4, 2)?)?;
            }
            None => {
                line.write(66, 66, "0")?;
                line.write(67, 70, "0000")?;
            }
        }

        line.write(71, 81, &field::format_field(FieldMask::Numeric, &billet.our_number, 11, 0, None)?)?;
        line.write(82, 82, billet.our_number_digit.as_deref().unwrap_or("0"))?;

        let per_day = billet.discount.and_then(|d| d.per_day).unwrap_or(Decimal::ZERO);
        line.write(83, 92, &field::format_amount(per_day, 10, 2)?)?;
        line.write(93, 93, "2")?;
        line.write(94, 94, "N")?;

        line.write(109, 110, &Self::occurrence_code(billet.instruction))?;
        line.write(111, 120, &fit(FieldMask::Alphanumeric, &billet.document_number, 10)?)?;
        line.write(121, 126, &field::format_ddmmyy(billet.due_date))?;
        line.write(127, 139, &field::format_amount(billet.value, 13, 2)?)?;
        line.write(140, 142, "000")?;
        line.write(143, 147, "00000")?;
        line.write(148, 149, &field::format_field(FieldMask::Numeric, &billet.species, 2, 0, None)?)?;
        line.write(150, 150, "N")?;
        line.write(151, 156, &field::format_ddmmyy(billet.document_date))?;

        match billet.post_expiration {
            Some((instruction, days)) => {
                if days > 99 {
                    return Err(Error::Validation(format!(
                        "post-expiration day count {} does not fit in 2 digits",
                        days
                    )));
                }
                line.write(157, 158, Self::instruction_code(instruction))?;
                line.write(159, 160, &format!("{:02}", days))?;
            }
            None => {
                line.write(157, 158, "00")?;
                line.write(159, 160, "00")?;
            }
        }

        line.write(161, 173, &field::format_amount(Self::daily_interest(billet), 13, 2)?)?;

        match billet.discount {
            Some(discount) => {
                line.write(174, 179, &field::format_ddmmyy(discount.deadline))?;
                line.write(180, 192, &field::format_amount(discount.value, 13, 2)?)?;
            }
            None => {
                line.write(174, 179, "000000")?;
                line.write(180, 192, &"0".repeat(13))?;
            }
        }
        line.write(193, 205, &"0".repeat(13))?;
        line.write(206, 218, &"0".repeat(13))?;

        Self::write_payer(&mut line, &billet.payer)?;

        let last_field = match billet.guarantor {
            Some(ref guarantor) => guarantor.name.clone(),
            None => billet.message.clone().unwrap_or_default(),
        };
        line.write(335, 394, &fit(FieldMask::Alphanumeric, &last_field, 60)?)?;
        line.write(395, 400, &format!("{:06}", sequence))?;
        Ok(line)
    }

    fn trailer(&self, sequence: u32) -> Result<LineBuffer> {
        let mut line = LineBuffer::new(LINE_LENGTH);
        line.write(1, 1, "9")?;
        line.write(395, 400, &format!("{:06}", sequence))?;
        Ok(line)
    }

    /// `CB{ddmm}{counter}.REM`, counter in two base-36 characters.
    fn file_name(&self, date: NaiveDate, counter: u32) -> Result<String> {
        if counter > SHIPPING_COUNTER_LIMIT {
            return Err(Error::Validation(format!(
                "daily shipping counter exhausted: {} > {}",
                counter, SHIPPING_COUNTER_LIMIT
            )));
        }
        Ok(format!(
            "CB{:02}{:02}{}.REM",
            date.day(),
            date.month(),
            base36(counter)
        ))
    }
}

/// Parse a Bradesco CNAB400 retorno already split into lines.
pub fn parse_return(lines: &[String]) -> Result<ReturnFile> {
    let first = lines
        .first()
        .ok_or_else(|| Error::Format("return file is empty".into()))?;
    if !first.starts_with("02RETORNO") {
        return Err(Error::Format("missing 02RETORNO header".into()));
    }

    let header = parse_header(first)?;
    let mut transactions = Vec::new();
    let mut trailer = None;

    for line in &lines[1..] {
        match line.chars().next() {
            Some('1') => transactions.push(parse_transaction(line)?),
            Some('9') => trailer = Some(parse_trailer(line)?),
            // Other record types (rateio, PIX addenda) are not billing
            // events and are skipped.
            _ => {}
        }
    }

    let trailer = trailer.ok_or_else(|| Error::Format("return file has no trailer".into()))?;
    if transactions.is_empty() {
        return Err(Error::Format("return file has no transactions".into()));
    }

    Ok(ReturnFile {
        bank_code: header.bank_code.clone(),
        cnab_type: CnabType::Cnab400,
        header,
        transactions,
        trailer,
    })
}

fn parse_header(line: &str) -> Result<ReturnHeader> {
    let company_code = cut(line, 27, 46)?;
    // Company code layout: filler(3) zero(1) wallet(3) agency(5)
    // account(7) check digit(1).
    let (agency, account) = if company_code.len() == 20 {
        (
            Some(company_code[7..12].to_string()),
            Some(company_code[12..19].to_string()),
        )
    } else {
        (None, None)
    };
    Ok(ReturnHeader {
        bank_code: cut(line, 77, 79)?,
        company_code,
        company_name: cut(line, 47, 76)?,
        agency,
        account,
        file_date: field::parse_ddmmyy(&cut(line, 95, 100)?)?,
        bank_notice: cut(line, 109, 113)?,
    })
}

fn parse_transaction(line: &str) -> Result<ReturnTransaction> {
    let occurrence_code: u32 = cut(line, 109, 110)?
        .parse()
        .map_err(|_| Error::Format(format!("bad occurrence code in line: {}", line)))?;

    let mut rejection_reasons = Vec::new();
    let reasons = cut(line, 319, 328)?;
    for chunk in reasons.as_bytes().chunks(2) {
        if chunk.len() == 2 {
            if let Ok(code) = std::str::from_utf8(chunk).unwrap_or("").parse::<u32>() {
                if code != 0 {
                    rejection_reasons.push(code);
                }
            }
        }
    }

    Ok(ReturnTransaction {
        wallet: cut(line, 22, 24)?,
        our_number: cut(line, 71, 81)?,
        document_number: cut(line, 117, 126)?,
        control_number: cut(line, 38, 62)?,
        occurrence_code,
        occurrence_date: field::parse_ddmmyy(&cut(line, 111, 116)?)?,
        rejection_reasons,
        due_date: optional_date(&cut(line, 147, 152)?)?,
        credit_date: optional_date(&cut(line, 296, 301)?)?,
        document_value: to_float(&cut(line, 153, 165)?, 2)?,
        tariff_value: to_float(&cut(line, 176, 188)?, 2)?,
        iof_value: to_float(&cut(line, 215, 227)?, 2)?,
        abatement_value: to_float(&cut(line, 228, 240)?, 2)?,
        discount_value: to_float(&cut(line, 241, 253)?, 2)?,
        paid_value: to_float(&cut(line, 254, 266)?, 2)?,
        interest_value: to_float(&cut(line, 267, 279)?, 2)?,
        fine_value: to_float(&cut(line, 280, 292)?, 2)?,
        pix_tx_id: None,
        pix_spi_url: None,
    })
}

fn parse_trailer(line: &str) -> Result<ReturnTrailer> {
    Ok(ReturnTrailer {
        bond_count: parse_count(&cut(line, 18, 25)?)?,
        bond_value: to_float(&cut(line, 26, 39)?, 2)?,
        notice_count: parse_count(&cut(line, 40, 47)?)?,
        entered_count: parse_count(&cut(line, 58, 62)?)?,
        paid_count: parse_count(&cut(line, 86, 90)?)?,
        dropped_count: parse_count(&cut(line, 108, 112)?)?,
        changed_count: parse_count(&cut(line, 214, 218)?)?,
        errored_count: parse_count(&cut(line, 220, 224)?)?,
    })
}

fn parse_count(text: &str) -> Result<u32> {
    if text.is_empty() {
        return Ok(0);
    }
    text.parse()
        .map_err(|_| Error::Format(format!("bad record count: {}", text)))
}

/// Description for a Bradesco rejection reason code (motivo da
/// ocorrência). Unknown codes fail.
pub fn rejection_description(code: u32) -> Result<&'static str> {
    match code {
        2 => Ok("Código do registro detalhe inválido"),
        3 => Ok("Código da ocorrência inválido"),
        4 => Ok("Código de ocorrência não permitida para a carteira"),
        5 => Ok("Código de ocorrência não numérico"),
        7 => Ok("Agência, conta ou dígito inválidos"),
        8 => Ok("Nosso número inválido"),
        9 => Ok("Nosso número duplicado"),
        10 => Ok("Carteira inválida"),
        13 => Ok("Identificação da emissão do boleto inválida"),
        16 => Ok("Data de vencimento inválida"),
        17 => Ok("Data de vencimento anterior à data de emissão"),
        18 => Ok("Vencimento fora do prazo de operação"),
        20 => Ok("Valor do título inválido"),
        21 => Ok("Espécie do título inválida"),
        24 => Ok("Data de emissão inválida"),
        27 => Ok("Valor de juros inválido"),
        28 => Ok("Código de desconto inválido"),
        29 => Ok("Valor do desconto maior ou igual ao valor do título"),
        38 => Ok("Prazo para protesto inválido"),
        44 => Ok("Agência beneficiária não prevista"),
        45 => Ok("Nome do pagador não informado"),
        48 => Ok("CEP inválido"),
        60 => Ok("Movimento para título não cadastrado"),
        _ => Err(Error::InvalidCode {
            vocabulary: "BradescoRejectionReason",
            code,
        }),
    }
}

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// Format under a mask, truncating instead of failing when the value is
/// wider than the field. Used for free-text fields the manual truncates.
fn fit(mask: FieldMask, value: &str, size: usize) -> Result<String> {
    let normalized = field::normalize_chars(&field::strip_diacritics(value));
    let truncated: String = normalized.chars().take(size).collect();
    field::format_field(mask, &truncated, size, 0, None)
}

/// Two-character upper-case base-36 rendering of the daily counter.
fn base36(mut value: u32) -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut out = [b'0'; 2];
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remessa::ShippingFileBuilder;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn config() -> ShippingConfig {
        let mut emitter = FinancialAgent::new("ACME COBRANCAS LTDA", "12.345.678/0001-95");
        emitter.agency = Some("1234-5".parse().unwrap());
        emitter.account = Some("123456-7".parse().unwrap());
        ShippingConfig {
            emitter,
            wallet: "09".into(),
            shipping_number: 42,
            shipping_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            company_code: None,
        }
    }

    fn billet() -> Billet {
        let mut payer = FinancialAgent::new("José da Silva", "123.456.789-09");
        payer.address = Some("Rua das Acácias, 10".into());
        payer.district = Some("Centro".into());
        payer.postal_code = Some("01310-100".into());
        let mut b = Billet::new(
            "09",
            "12345678901",
            Decimal::from_str("1500.00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 6).unwrap(),
            payer,
        );
        b.document_number = "DOC-1".into();
        b.control_number = "CTRL0001".into();
        b.document_date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        b
    }

    fn generate(billets: Vec<Billet>) -> String {
        let mut builder = ShippingFileBuilder::new(Bradesco, config());
        for b in billets {
            builder.add_billet(b).unwrap();
        }
        builder.generate().unwrap()
    }

    #[test]
    fn test_remessa_scenario() {
        let file = generate(vec![billet()]);
        let lines: Vec<&str> = file.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l.len() == 400));

        let header = lines[0];
        assert!(header.starts_with('0'));
        assert_eq!(&header[76..79], "237");
        assert_eq!(&header[2..9], "REMESSA");
        assert_eq!(&header[108..110], "MX");
        assert_eq!(&header[94..100], "070325");
        assert_eq!(&header[394..400], "000001");

        let tx = lines[1];
        assert!(tx.starts_with('1'));
        // Due date ddmmyy at columns 121-126.
        assert_eq!(&tx[120..126], "060425");
        // Document value 13,2 at 127-139.
        assert_eq!(&tx[126..139], "0000000150000");
        // Registration occurrence.
        assert_eq!(&tx[108..110], "01");
        // Payer is a CPF holder.
        assert_eq!(&tx[218..220], "01");
        assert_eq!(&tx[234..247], "JOSE DA SILVA");

        let trailer = lines[2];
        assert!(trailer.starts_with('9'));
        assert_eq!(&trailer[394..400], "000003");
    }

    #[test]
    fn test_remessa_sequence_grows_with_billets() {
        let file = generate(vec![billet(), billet(), billet()]);
        let lines: Vec<&str> = file.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(&lines[4][394..400], "000005");
    }

    #[test]
    fn test_company_code_derivation() {
        let code = Bradesco::company_code(&config()).unwrap();
        assert_eq!(code.len(), 20);
        assert_eq!(code, "00000090123401234567");
    }

    #[test]
    fn test_fine_and_interest_fields() {
        let mut b = billet();
        b.fine = FineRule::Percentage(Decimal::from_str("2.00").unwrap());
        b.interest = InterestRule::DailyRate(Decimal::from_str("0.1").unwrap());
        let file = generate(vec![b]);
        let tx: &str = file.split("\r\n").nth(1).unwrap();
        assert_eq!(&tx[65..66], "2");
        assert_eq!(&tx[66..70], "0200");
        // percent(1500.00, 0.1) = 1.50 per day.
        assert_eq!(&tx[160..173], "0000000000150");
    }

    #[test]
    fn test_fixed_fine_becomes_percentage() {
        let mut b = billet();
        b.fine = FineRule::Fixed(Decimal::from_str("30.00").unwrap());
        // 30 / 1500 = 2%.
        assert_eq!(
            Bradesco::fine_percentage(&b).unwrap(),
            Some(Decimal::from_str("2.00").unwrap())
        );
    }

    #[test]
    fn test_post_expiration_instruction_fields() {
        let mut b = billet();
        b.post_expiration = Some((Instruction::ProtestAfterDue, 5));
        let file = generate(vec![b]);
        let tx: &str = file.split("\r\n").nth(1).unwrap();
        assert_eq!(&tx[156..158], "06");
        assert_eq!(&tx[158..160], "05");
    }

    #[test]
    fn test_guarantor_over_message() {
        let mut b = billet();
        b.message = Some("PAGAVEL EM QUALQUER BANCO".into());
        b.guarantor = Some(FinancialAgent::new("Fiadora Ltda", "12.345.678/0001-95"));
        let file = generate(vec![b]);
        let tx: &str = file.split("\r\n").nth(1).unwrap();
        assert!(tx[334..394].starts_with("FIADORA LTDA"));
    }

    #[test]
    fn test_file_name() {
        let layout = Bradesco;
        let date = NaiveDate::from_ymd_opt(2025, 3, 7).unwrap();
        assert_eq!(layout.file_name(date, 0).unwrap(), "CB070300.REM");
        assert_eq!(layout.file_name(date, 10).unwrap(), "CB07030A.REM");
        assert_eq!(layout.file_name(date, 1295).unwrap(), "CB0703ZZ.REM");
        assert!(layout.file_name(date, 1296).is_err());
    }

    /// Build one synthetic retorno transaction line at the documented
    /// columns.
    fn retorno_transaction_line(occurrence: &str, paid: &str, sequence: u32) -> String {
        let mut line = LineBuffer::new(400);
        line.write(1, 1, "1").unwrap();
        line.write(22, 24, "009").unwrap();
        line.write(38, 62, "CTRL0001").unwrap();
        line.write(71, 81, "12345678901").unwrap();
        line.write(109, 110, occurrence).unwrap();
        line.write(111, 116, "100425").unwrap();
        line.write(117, 126, "DOC-1").unwrap();
        line.write(147, 152, "060425").unwrap();
        line.write(153, 165, "0000000150000").unwrap();
        line.write(176, 188, "0000000000350").unwrap();
        line.write(254, 266, paid).unwrap();
        line.write(296, 301, "110425").unwrap();
        line.write(319, 328, "0000000000").unwrap();
        line.write(395, 400, &format!("{:06}", sequence)).unwrap();
        line.into_string()
    }

    fn retorno_lines() -> Vec<String> {
        let mut header = LineBuffer::new(400);
        header.write(1, 9, "02RETORNO").unwrap();
        header.write(10, 11, "01").unwrap();
        header.write(12, 26, "COBRANCA").unwrap();
        header.write(27, 46, "00000090123401234567").unwrap();
        header.write(47, 76, "ACME COBRANCAS LTDA").unwrap();
        header.write(77, 79, "237").unwrap();
        header.write(80, 94, "BRADESCO").unwrap();
        header.write(95, 100, "120425").unwrap();
        header.write(109, 113, "00042").unwrap();
        header.write(395, 400, "000001").unwrap();

        let mut trailer = LineBuffer::new(400);
        trailer.write(1, 1, "9").unwrap();
        trailer.write(18, 25, "00000002").unwrap();
        trailer.write(26, 39, "00000000300000").unwrap();
        trailer.write(86, 90, "00001").unwrap();
        trailer.write(395, 400, "000004").unwrap();

        vec![
            header.into_string(),
            retorno_transaction_line("02", "0000000000000", 2),
            retorno_transaction_line("06", "0000000150000", 3),
            trailer.into_string(),
        ]
    }

    #[test]
    fn test_parse_return() {
        let file = parse_return(&retorno_lines()).unwrap();
        assert_eq!(file.bank_code, "237");
        assert_eq!(file.header.agency.as_deref(), Some("01234"));
        assert_eq!(file.header.account.as_deref(), Some("0123456"));
        assert_eq!(
            file.header.file_date,
            NaiveDate::from_ymd_opt(2025, 4, 12).unwrap()
        );
        assert_eq!(file.len(), 2);

        let entry = file.get(1).unwrap();
        assert_eq!(entry.occurrence_code, 2);
        assert_eq!(entry.occurrence_description().unwrap(), "Entrada confirmada");
        assert!(!entry.is_settlement());

        let paid = file.get(2).unwrap();
        assert!(paid.is_settlement());
        assert_eq!(paid.paid_value, Decimal::from_str("1500.00").unwrap());
        assert_eq!(paid.tariff_value, Decimal::from_str("3.50").unwrap());
        assert_eq!(paid.net_credited(), Decimal::from_str("1496.50").unwrap());
        assert_eq!(
            paid.credit_date,
            NaiveDate::from_ymd_opt(2025, 4, 11)
        );

        assert_eq!(file.trailer.bond_count, 2);
        assert_eq!(file.trailer.paid_count, 1);
        assert_eq!(
            file.trailer.bond_value,
            Decimal::from_str("3000.00").unwrap()
        );
    }

    #[test]
    fn test_cursor_semantics() {
        let file = parse_return(&retorno_lines()).unwrap();
        let mut cursor = file.cursor();
        assert!(cursor.valid());
        assert_eq!(cursor.position(), 1);
        assert!(cursor.next().is_some());
        assert_eq!(cursor.position(), 2);
        cursor.seek(5);
        assert!(!cursor.valid());
        cursor.rewind();
        assert_eq!(cursor.by_ref().count(), 2);
    }

    #[test]
    fn test_parse_return_via_factory_bytes() {
        let wire = retorno_lines().join("\r\n") + "\r\n";
        let file = crate::retorno::ReturnFileFactory::from_bytes(wire.as_bytes()).unwrap();
        assert_eq!(file.bank_code, "237");
        assert_eq!(file.len(), 2);
    }

    #[test]
    fn test_rejection_description() {
        assert_eq!(rejection_description(8).unwrap(), "Nosso número inválido");
        assert!(matches!(
            rejection_description(999),
            Err(Error::InvalidCode { code: 999, .. })
        ));
    }
}
