//! Billet (boleto) value object consumed by the shipping file builder.
//!
//! The billing workflow owns billet persistence and business rules; this
//! type only carries the data a bank layout needs to emit one transaction
//! record.

use crate::agent::FinancialAgent;
use crate::codes::{BilletInstruction, Instruction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the fine for late payment is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FineRule {
    /// No fine.
    None,
    /// Percentage of the document value.
    Percentage(Decimal),
    /// Fixed amount.
    Fixed(Decimal),
}

/// How arrears interest accrues after the due date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InterestRule {
    /// No interest.
    None,
    /// Fixed amount per day of delay.
    DailyValue(Decimal),
    /// Daily percentage of the document value.
    DailyRate(Decimal),
}

/// Early-payment discount schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    /// Last date the discount applies.
    pub deadline: NaiveDate,
    /// Discount amount.
    pub value: Decimal,
    /// Additional discount granted per day of anticipation.
    pub per_day: Option<Decimal>,
}

/// A payment slip to be registered (or modified) at the bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Billet {
    /// Bank billing product code (carteira).
    pub wallet: String,

    /// Bank identification number (nosso número), without check digit.
    pub our_number: String,

    /// Check digit of the nosso número, when the bank assigns one.
    pub our_number_digit: Option<String>,

    /// Document number printed on the slip.
    pub document_number: String,

    /// Beneficiary's own control number (uso da empresa).
    pub control_number: String,

    /// Face value of the document.
    pub value: Decimal,

    /// Due date.
    pub due_date: NaiveDate,

    /// Emission date of the document.
    pub document_date: NaiveDate,

    /// Species of the document ("01" duplicata mercantil, "99" outros).
    pub species: String,

    /// Fine applied after the due date.
    pub fine: FineRule,

    /// Arrears interest rule.
    pub interest: InterestRule,

    /// Early-payment discount, when offered.
    pub discount: Option<Discount>,

    /// Primary instruction for this shipment.
    pub instruction: BilletInstruction,

    /// What the bank does after the due date, with a day count.
    pub post_expiration: Option<(Instruction, u32)>,

    /// The payer.
    pub payer: FinancialAgent,

    /// Optional guarantor (sacador avalista).
    pub guarantor: Option<FinancialAgent>,

    /// Free-text message printed when there is no guarantor.
    pub message: Option<String>,
}

impl Billet {
    /// A registration billet with the minimum required data. Remaining
    /// fields start empty/none and are set directly.
    pub fn new(
        wallet: impl Into<String>,
        our_number: impl Into<String>,
        value: Decimal,
        due_date: NaiveDate,
        payer: FinancialAgent,
    ) -> Self {
        Billet {
            wallet: wallet.into(),
            our_number: our_number.into(),
            our_number_digit: None,
            document_number: String::new(),
            control_number: String::new(),
            value,
            due_date,
            document_date: due_date,
            species: "01".into(),
            fine: FineRule::None,
            interest: InterestRule::None,
            discount: None,
            instruction: BilletInstruction::Registration,
            post_expiration: None,
            payer,
            guarantor: None,
            message: None,
        }
    }
}
