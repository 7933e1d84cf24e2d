//! Remessa (shipping) file builder.
//!
//! A remessa file instructs the bank to register, modify, protest,
//! discharge or negativate billets. The file is three fixed stages —
//! header, one transaction line per billet, trailer — with a monotonic
//! 6-digit record sequence starting at 1 on the header.
//!
//! Column positions are bank-specific: each bank implements
//! [`ShippingLayout`] once and the builder stays bank-agnostic.

use crate::billet::Billet;
use crate::codes::{BilletInstruction, Instruction};
use crate::encoding;
use crate::error::{Error, Result};
use crate::field::LineBuffer;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Beneficiary-side configuration shared by every line of one file.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    /// Emitter (beneficiário): must carry agency and account references.
    pub emitter: crate::agent::FinancialAgent,

    /// Billing product code (carteira).
    pub wallet: String,

    /// Sequential number of this shipment, assigned by the caller.
    pub shipping_number: u32,

    /// Date stamped on the header.
    pub shipping_date: NaiveDate,

    /// Company code at the bank. When absent it is derived from
    /// wallet + agency + account + check digit.
    pub company_code: Option<String>,
}

impl ShippingConfig {
    /// Names of required fields that are missing, in declaration order.
    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.emitter.name.trim().is_empty() {
            missing.push("emitter.name".to_string());
        }
        if self.emitter.agency.is_none() {
            missing.push("emitter.agency".to_string());
        }
        if self.emitter.account.is_none() {
            missing.push("emitter.account".to_string());
        }
        if self.wallet.trim().is_empty() {
            missing.push("wallet".to_string());
        }
        if self.shipping_number == 0 {
            missing.push("shipping_number".to_string());
        }
        missing
    }
}

/// Per-bank layout capability: how one bank lays out its remessa lines.
pub trait ShippingLayout {
    /// Three-digit bank code as printed on the wire (e.g. `"237"`).
    fn bank_code(&self) -> &'static str;

    /// Bank name as printed on the header.
    fn bank_name(&self) -> &'static str;

    /// Record length in columns.
    fn line_length(&self) -> usize;

    /// End-of-line marker between records.
    fn eol(&self) -> &'static str {
        "\r\n"
    }

    /// Build the header record (record type `0`).
    fn header(&self, config: &ShippingConfig, sequence: u32) -> Result<LineBuffer>;

    /// Build one transaction record (record type `1`).
    fn transaction(
        &self,
        config: &ShippingConfig,
        billet: &Billet,
        sequence: u32,
    ) -> Result<LineBuffer>;

    /// Build the trailer record (record type `9`).
    fn trailer(&self, sequence: u32) -> Result<LineBuffer>;

    /// File name for the shipment generated on `date` with the given
    /// per-day counter. Errors once the counter exceeds the bank's limit.
    fn file_name(&self, date: NaiveDate, counter: u32) -> Result<String>;
}

/// Builds exactly one remessa file. Not reusable across files.
pub struct ShippingFileBuilder<L: ShippingLayout> {
    layout: L,
    config: ShippingConfig,
    billets: Vec<Billet>,
}

impl<L: ShippingLayout> ShippingFileBuilder<L> {
    pub fn new(layout: L, config: ShippingConfig) -> Self {
        ShippingFileBuilder {
            layout,
            config,
            billets: Vec::new(),
        }
    }

    /// Queue a billet for the file.
    ///
    /// Domain rules tied to the billet itself are checked here, before
    /// any line is written: `CancelProtestOrNegativation` is only legal
    /// when the primary instruction is `Modification`.
    pub fn add_billet(&mut self, billet: Billet) -> Result<()> {
        if let Some((instruction, _days)) = billet.post_expiration {
            if instruction == Instruction::CancelProtestOrNegativation
                && billet.instruction != BilletInstruction::Modification
            {
                return Err(Error::DomainRule(format!(
                    "'{}' is only valid in a modification transaction, got '{}'",
                    instruction.description(),
                    billet.instruction.description()
                )));
            }
        }
        self.billets.push(billet);
        Ok(())
    }

    /// Number of queued transactions.
    pub fn billet_count(&self) -> usize {
        self.billets.len()
    }

    /// Generate the complete file.
    ///
    /// Either returns a full valid file or fails — there is no partial
    /// output. The result is passed through the UTF-8 repair so the
    /// string is safe to hold internally; conversion back to the wire
    /// encoding happens when the caller writes it out.
    pub fn generate(&self) -> Result<String> {
        let missing = self.config.missing_fields();
        if !missing.is_empty() {
            return Err(Error::MissingFields(missing));
        }
        if self.billets.is_empty() {
            return Err(Error::Validation(
                "a remessa file needs at least one transaction".into(),
            ));
        }

        let mut sequence: u32 = 1;
        let mut output = String::new();

        let header = self.layout.header(&self.config, sequence)?;
        self.push_line(&mut output, header)?;

        for billet in &self.billets {
            sequence += 1;
            let line = self.layout.transaction(&self.config, billet, sequence)?;
            self.push_line(&mut output, line)?;
        }

        sequence += 1;
        let trailer = self.layout.trailer(sequence)?;
        self.push_line(&mut output, trailer)?;

        Ok(encoding::to_utf8(output.as_bytes()))
    }

    /// File name for this shipment. `counter` is the per-day shipment
    /// counter maintained by the caller.
    pub fn file_name(&self, counter: u32) -> Result<String> {
        self.layout.file_name(self.config.shipping_date, counter)
    }

    fn push_line(&self, output: &mut String, line: LineBuffer) -> Result<()> {
        if line.line_length() != self.layout.line_length() {
            return Err(Error::Validation(format!(
                "layout produced a {}-column line, expected {}",
                line.line_length(),
                self.layout.line_length()
            )));
        }
        output.push_str(&line.into_string());
        output.push_str(self.layout.eol());
        Ok(())
    }
}

/// Percentage of `value` at `rate` percent, rounded half-up to 2 decimal
/// places. Rates below the 0.01% threshold yield zero.
pub fn percent(value: Decimal, rate: Decimal) -> Decimal {
    if rate < Decimal::new(1, 2) {
        return Decimal::ZERO;
    }
    (value * rate / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FinancialAgent;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    /// Minimal two-column-honest layout for builder state tests.
    struct StubLayout;

    impl ShippingLayout for StubLayout {
        fn bank_code(&self) -> &'static str {
            "000"
        }
        fn bank_name(&self) -> &'static str {
            "STUB"
        }
        fn line_length(&self) -> usize {
            40
        }
        fn header(&self, _config: &ShippingConfig, sequence: u32) -> Result<LineBuffer> {
            let mut line = LineBuffer::new(40);
            line.write(1, 1, "0")?;
            line.write(35, 40, &format!("{:06}", sequence))?;
            Ok(line)
        }
        fn transaction(
            &self,
            _config: &ShippingConfig,
            _billet: &Billet,
            sequence: u32,
        ) -> Result<LineBuffer> {
            let mut line = LineBuffer::new(40);
            line.write(1, 1, "1")?;
            line.write(35, 40, &format!("{:06}", sequence))?;
            Ok(line)
        }
        fn trailer(&self, sequence: u32) -> Result<LineBuffer> {
            let mut line = LineBuffer::new(40);
            line.write(1, 1, "9")?;
            line.write(35, 40, &format!("{:06}", sequence))?;
            Ok(line)
        }
        fn file_name(&self, _date: NaiveDate, _counter: u32) -> Result<String> {
            Ok("STUB.REM".into())
        }
    }

    fn config() -> ShippingConfig {
        let mut emitter = FinancialAgent::new("ACME LTDA", "12.345.678/0001-95");
        emitter.agency = Some("1234-5".parse().unwrap());
        emitter.account = Some("123456-7".parse().unwrap());
        ShippingConfig {
            emitter,
            wallet: "09".into(),
            shipping_number: 1,
            shipping_date: NaiveDate::from_ymd_opt(2025, 3, 7).unwrap(),
            company_code: None,
        }
    }

    fn billet() -> Billet {
        let payer = FinancialAgent::new("JOSE DA SILVA", "123.456.789-09");
        Billet::new(
            "09",
            "12345678901",
            Decimal::from_str("1500.00").unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 6).unwrap(),
            payer,
        )
    }

    #[test]
    fn test_line_count_and_sequence() {
        let mut builder = ShippingFileBuilder::new(StubLayout, config());
        for _ in 0..3 {
            builder.add_billet(billet()).unwrap();
        }
        let file = builder.generate().unwrap();
        let lines: Vec<&str> = file.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with('0'));
        assert!(lines[4].starts_with('9'));
        assert_eq!(&lines[4][34..40], "000005");
        assert!(lines.iter().all(|l| l.len() == 40));
    }

    #[test]
    fn test_generate_requires_transactions() {
        let builder = ShippingFileBuilder::new(StubLayout, config());
        assert!(matches!(builder.generate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_generate_lists_missing_fields() {
        let mut cfg = config();
        cfg.emitter.agency = None;
        cfg.wallet = String::new();
        let mut builder = ShippingFileBuilder::new(StubLayout, cfg);
        builder.add_billet(billet()).unwrap();
        match builder.generate() {
            Err(Error::MissingFields(fields)) => {
                assert_eq!(fields, vec!["emitter.agency".to_string(), "wallet".to_string()]);
            }
            other => panic!("expected MissingFields, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_cancel_protest_needs_modification() {
        let mut builder = ShippingFileBuilder::new(StubLayout, config());
        let mut b = billet();
        b.post_expiration = Some((Instruction::CancelProtestOrNegativation, 0));
        assert!(matches!(
            builder.add_billet(b.clone()),
            Err(Error::DomainRule(_))
        ));

        b.instruction = BilletInstruction::Modification;
        builder.add_billet(b).unwrap();
        assert_eq!(builder.billet_count(), 1);
    }

    #[test]
    fn test_percent() {
        let value = Decimal::from_str("1000.00").unwrap();
        assert_eq!(
            percent(value, Decimal::from_str("2.5").unwrap()),
            Decimal::from_str("25.00").unwrap()
        );
        // Below the 0.01% threshold.
        assert_eq!(
            percent(
                Decimal::from_str("100.00").unwrap(),
                Decimal::from_str("0.005").unwrap()
            ),
            Decimal::ZERO
        );
        // Half-up rounding: 1001 * 2.5% = 25.025 -> 25.03.
        assert_eq!(
            percent(
                Decimal::from_str("1001.00").unwrap(),
                Decimal::from_str("2.5").unwrap()
            ),
            Decimal::from_str("25.03").unwrap()
        );
    }
}
