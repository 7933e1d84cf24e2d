//! Closed code vocabularies for billet lifecycle events.
//!
//! Every vocabulary is a closed enum over the integer codes the billing
//! system exchanges with the banks, with a fixed description table in
//! Portuguese (the language of the bank manuals and of the operators who
//! read these descriptions). Unknown codes are rejected — there is no
//! open-ended fallback.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Primary instruction sent with a billet in a remessa file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BilletInstruction {
    /// Register the billet with the bank.
    Registration,
    /// Discharge (baixa) a registered billet.
    Discharge,
    /// Grant an abatement on the document value.
    AbatementGrant,
    /// Cancel a previously granted abatement.
    AbatementCancel,
    /// Change the due date.
    DueDateChange,
    /// Send the billet to protest.
    Protest,
    /// Suspend protest and discharge the billet.
    ProtestSuspendDischarge,
    /// Suspend protest and keep the billet registered.
    ProtestSuspendKeep,
    /// Modify other registered data.
    Modification,
    /// Negativate the payer without protest.
    Negativation,
}

impl BilletInstruction {
    /// Resolve an instruction from its integer code.
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(BilletInstruction::Registration),
            2 => Ok(BilletInstruction::Discharge),
            4 => Ok(BilletInstruction::AbatementGrant),
            5 => Ok(BilletInstruction::AbatementCancel),
            6 => Ok(BilletInstruction::DueDateChange),
            7 => Ok(BilletInstruction::Protest),
            8 => Ok(BilletInstruction::ProtestSuspendDischarge),
            9 => Ok(BilletInstruction::ProtestSuspendKeep),
            31 => Ok(BilletInstruction::Modification),
            45 => Ok(BilletInstruction::Negativation),
            _ => Err(Error::InvalidCode {
                vocabulary: "BilletInstruction",
                code,
            }),
        }
    }

    /// The instruction's integer code.
    pub fn code(&self) -> u32 {
        match self {
            BilletInstruction::Registration => 1,
            BilletInstruction::Discharge => 2,
            BilletInstruction::AbatementGrant => 4,
            BilletInstruction::AbatementCancel => 5,
            BilletInstruction::DueDateChange => 6,
            BilletInstruction::Protest => 7,
            BilletInstruction::ProtestSuspendDischarge => 8,
            BilletInstruction::ProtestSuspendKeep => 9,
            BilletInstruction::Modification => 31,
            BilletInstruction::Negativation => 45,
        }
    }

    /// Canonical description, as shown to billing operators.
    pub fn description(&self) -> &'static str {
        match self {
            BilletInstruction::Registration => "Remessa",
            BilletInstruction::Discharge => "Pedido de baixa",
            BilletInstruction::AbatementGrant => "Concessão de abatimento",
            BilletInstruction::AbatementCancel => "Cancelamento de abatimento",
            BilletInstruction::DueDateChange => "Alteração de vencimento",
            BilletInstruction::Protest => "Pedido de protesto",
            BilletInstruction::ProtestSuspendDischarge => "Sustação de protesto e baixa de título",
            BilletInstruction::ProtestSuspendKeep => {
                "Sustação de protesto e manutenção em carteira"
            }
            BilletInstruction::Modification => "Alteração de outros dados",
            BilletInstruction::Negativation => "Negativação sem protesto",
        }
    }

    /// Description for an integer code.
    pub fn describe(code: u32) -> Result<&'static str> {
        Ok(Self::from_code(code)?.description())
    }
}

/// Post-expiration instruction: what the bank does with a billet after its
/// due date, with an associated day count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Protest the billet N days after the due date.
    ProtestAfterDue,
    /// Negativate the payer N days after the due date.
    NegativateAfterDue,
    /// Drop (baixar/devolver) the billet N days after the due date.
    DropAfterDue,
    /// Cancel a pending protest or negativation.
    CancelProtestOrNegativation,
}

impl Instruction {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            6 => Ok(Instruction::ProtestAfterDue),
            7 => Ok(Instruction::NegativateAfterDue),
            9 => Ok(Instruction::DropAfterDue),
            18 => Ok(Instruction::CancelProtestOrNegativation),
            _ => Err(Error::InvalidCode {
                vocabulary: "Instruction",
                code,
            }),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Instruction::ProtestAfterDue => 6,
            Instruction::NegativateAfterDue => 7,
            Instruction::DropAfterDue => 9,
            Instruction::CancelProtestOrNegativation => 18,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Instruction::ProtestAfterDue => "Protestar após o vencimento",
            Instruction::NegativateAfterDue => "Negativar após o vencimento",
            Instruction::DropAfterDue => "Baixar/devolver após o vencimento",
            Instruction::CancelProtestOrNegativation => "Cancelar protesto ou negativação",
        }
    }

    /// Pure membership test used before a code is written to a remessa.
    pub fn is_valid(code: u32) -> bool {
        Self::from_code(code).is_ok()
    }
}

/// Occurrence reported for a billet in a retorno file (canonical codes,
/// shared by the documented banks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BilletOccurrence {
    EntryConfirmed,
    EntryRejected,
    Settlement,
    AutomaticDischarge,
    RequestedDischarge,
    AbatementGranted,
    AbatementCancelled,
    DueDateChanged,
    NotarySettlement,
    SettlementAfterDischarge,
    ProtestInstructionConfirmed,
    ProtestSuspensionConfirmed,
    PaymentCancelled,
    SentToNotary,
    DischargeRejected,
    TariffDebit,
    InstructionRejected,
    ModificationConfirmed,
    RemovedFromNotary,
}

impl BilletOccurrence {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            2 => Ok(BilletOccurrence::EntryConfirmed),
            3 => Ok(BilletOccurrence::EntryRejected),
            6 => Ok(BilletOccurrence::Settlement),
            9 => Ok(BilletOccurrence::AutomaticDischarge),
            10 => Ok(BilletOccurrence::RequestedDischarge),
            12 => Ok(BilletOccurrence::AbatementGranted),
            13 => Ok(BilletOccurrence::AbatementCancelled),
            14 => Ok(BilletOccurrence::DueDateChanged),
            15 => Ok(BilletOccurrence::NotarySettlement),
            17 => Ok(BilletOccurrence::SettlementAfterDischarge),
            19 => Ok(BilletOccurrence::ProtestInstructionConfirmed),
            20 => Ok(BilletOccurrence::ProtestSuspensionConfirmed),
            22 => Ok(BilletOccurrence::PaymentCancelled),
            23 => Ok(BilletOccurrence::SentToNotary),
            27 => Ok(BilletOccurrence::DischargeRejected),
            28 => Ok(BilletOccurrence::TariffDebit),
            32 => Ok(BilletOccurrence::InstructionRejected),
            33 => Ok(BilletOccurrence::ModificationConfirmed),
            34 => Ok(BilletOccurrence::RemovedFromNotary),
            _ => Err(Error::InvalidCode {
                vocabulary: "BilletOccurrence",
                code,
            }),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            BilletOccurrence::EntryConfirmed => 2,
            BilletOccurrence::EntryRejected => 3,
            BilletOccurrence::Settlement => 6,
            BilletOccurrence::AutomaticDischarge => 9,
            BilletOccurrence::RequestedDischarge => 10,
            BilletOccurrence::AbatementGranted => 12,
            BilletOccurrence::AbatementCancelled => 13,
            BilletOccurrence::DueDateChanged => 14,
            BilletOccurrence::NotarySettlement => 15,
            BilletOccurrence::SettlementAfterDischarge => 17,
            BilletOccurrence::ProtestInstructionConfirmed => 19,
            BilletOccurrence::ProtestSuspensionConfirmed => 20,
            BilletOccurrence::PaymentCancelled => 22,
            BilletOccurrence::SentToNotary => 23,
            BilletOccurrence::DischargeRejected => 27,
            BilletOccurrence::TariffDebit => 28,
            BilletOccurrence::InstructionRejected => 32,
            BilletOccurrence::ModificationConfirmed => 33,
            BilletOccurrence::RemovedFromNotary => 34,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BilletOccurrence::EntryConfirmed => "Entrada confirmada",
            BilletOccurrence::EntryRejected => "Entrada rejeitada",
            BilletOccurrence::Settlement => "Liquidação normal",
            BilletOccurrence::AutomaticDischarge => "Baixado automaticamente via arquivo",
            BilletOccurrence::RequestedDischarge => "Baixado conforme instruções da agência",
            BilletOccurrence::AbatementGranted => "Abatimento concedido",
            BilletOccurrence::AbatementCancelled => "Abatimento cancelado",
            BilletOccurrence::DueDateChanged => "Vencimento alterado",
            BilletOccurrence::NotarySettlement => "Liquidação em cartório",
            BilletOccurrence::SettlementAfterDischarge => "Liquidação após baixa",
            BilletOccurrence::ProtestInstructionConfirmed => {
                "Confirmação de recebimento de instrução de protesto"
            }
            BilletOccurrence::ProtestSuspensionConfirmed => {
                "Confirmação de recebimento de instrução de sustação de protesto"
            }
            BilletOccurrence::PaymentCancelled => "Título com pagamento cancelado",
            BilletOccurrence::SentToNotary => "Entrada do título em cartório",
            BilletOccurrence::DischargeRejected => "Baixa rejeitada",
            BilletOccurrence::TariffDebit => "Débito de tarifas e custas",
            BilletOccurrence::InstructionRejected => "Instrução rejeitada",
            BilletOccurrence::ModificationConfirmed => {
                "Confirmação de pedido de alteração de outros dados"
            }
            BilletOccurrence::RemovedFromNotary => {
                "Retirado de cartório e manutenção em carteira"
            }
        }
    }

    /// Whether this occurrence settles the billet (money was credited).
    pub fn is_settlement(&self) -> bool {
        matches!(
            self,
            BilletOccurrence::Settlement
                | BilletOccurrence::NotarySettlement
                | BilletOccurrence::SettlementAfterDischarge
        )
    }

    /// Whether this occurrence rejects a shipped instruction.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BilletOccurrence::EntryRejected
                | BilletOccurrence::DischargeRejected
                | BilletOccurrence::InstructionRejected
        )
    }
}

/// Lifecycle status of a billet in the billing database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BilletStatus {
    Pending,
    Registered,
    Paid,
    Discharged,
    Protested,
    Negativated,
    Cancelled,
    Expired,
}

impl BilletStatus {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(BilletStatus::Pending),
            2 => Ok(BilletStatus::Registered),
            3 => Ok(BilletStatus::Paid),
            4 => Ok(BilletStatus::Discharged),
            5 => Ok(BilletStatus::Protested),
            6 => Ok(BilletStatus::Negativated),
            7 => Ok(BilletStatus::Cancelled),
            8 => Ok(BilletStatus::Expired),
            _ => Err(Error::InvalidCode {
                vocabulary: "BilletStatus",
                code,
            }),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            BilletStatus::Pending => 1,
            BilletStatus::Registered => 2,
            BilletStatus::Paid => 3,
            BilletStatus::Discharged => 4,
            BilletStatus::Protested => 5,
            BilletStatus::Negativated => 6,
            BilletStatus::Cancelled => 7,
            BilletStatus::Expired => 8,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BilletStatus::Pending => "Aguardando registro",
            BilletStatus::Registered => "Registrado",
            BilletStatus::Paid => "Pago",
            BilletStatus::Discharged => "Baixado",
            BilletStatus::Protested => "Protestado",
            BilletStatus::Negativated => "Negativado",
            BilletStatus::Cancelled => "Cancelado",
            BilletStatus::Expired => "Vencido",
        }
    }
}

/// Payment situation of an invoice as seen by the billing workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentSituation {
    Open,
    Paid,
    PartiallyPaid,
    Dropped,
    Cancelled,
}

impl PaymentSituation {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(PaymentSituation::Open),
            2 => Ok(PaymentSituation::Paid),
            3 => Ok(PaymentSituation::PartiallyPaid),
            4 => Ok(PaymentSituation::Dropped),
            5 => Ok(PaymentSituation::Cancelled),
            _ => Err(Error::InvalidCode {
                vocabulary: "PaymentSituation",
                code,
            }),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            PaymentSituation::Open => 1,
            PaymentSituation::Paid => 2,
            PaymentSituation::PartiallyPaid => 3,
            PaymentSituation::Dropped => 4,
            PaymentSituation::Cancelled => 5,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentSituation::Open => "Em aberto",
            PaymentSituation::Paid => "Pago",
            PaymentSituation::PartiallyPaid => "Pago parcialmente",
            PaymentSituation::Dropped => "Baixado",
            PaymentSituation::Cancelled => "Cancelado",
        }
    }
}

/// Currency of a billet (CNAB "moeda" code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    Real,
}

impl Currency {
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            9 => Ok(Currency::Real),
            _ => Err(Error::InvalidCode {
                vocabulary: "Currency",
                code,
            }),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            Currency::Real => 9,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Currency::Real => "Real (R$)",
        }
    }
}

/// Bitmask of payment restrictions applied to a payer.
///
/// Membership is tested with bitwise AND; descriptions exist for every
/// combination of the three flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRestriction(u8);

impl PaymentRestriction {
    pub const NONE: PaymentRestriction = PaymentRestriction(0);
    pub const PROTESTED: PaymentRestriction = PaymentRestriction(1);
    pub const CREDIT_BLOCKED: PaymentRestriction = PaymentRestriction(2);
    pub const SENT_TO_DUNNING_AGENCY: PaymentRestriction = PaymentRestriction(4);

    /// Build from a raw bitmask. Bits outside the known flags are rejected.
    pub fn from_bits(bits: u8) -> Result<Self> {
        if bits > 7 {
            return Err(Error::InvalidCode {
                vocabulary: "PaymentRestriction",
                code: bits as u32,
            });
        }
        Ok(PaymentRestriction(bits))
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn contains(&self, flag: PaymentRestriction) -> bool {
        self.0 & flag.0 == flag.0 && flag.0 != 0
    }

    pub fn is_protested(&self) -> bool {
        self.contains(Self::PROTESTED)
    }

    pub fn is_credit_blocked(&self) -> bool {
        self.contains(Self::CREDIT_BLOCKED)
    }

    pub fn is_sent_to_dunning_agency(&self) -> bool {
        self.contains(Self::SENT_TO_DUNNING_AGENCY)
    }

    pub fn with(&self, flag: PaymentRestriction) -> PaymentRestriction {
        PaymentRestriction(self.0 | flag.0)
    }

    /// Pre-enumerated description for every flag combination.
    pub fn description(&self) -> &'static str {
        match self.0 {
            0 => "Sem restrições",
            1 => "Protestado",
            2 => "Crédito bloqueado",
            3 => "Protestado, crédito bloqueado",
            4 => "Enviado para agência de cobrança",
            5 => "Protestado, enviado para agência de cobrança",
            6 => "Crédito bloqueado, enviado para agência de cobrança",
            7 => "Protestado, crédito bloqueado, enviado para agência de cobrança",
            _ => unreachable!("from_bits rejects bits above 7"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_instruction_descriptions() {
        assert_eq!(
            BilletInstruction::describe(7).unwrap(),
            "Pedido de protesto"
        );
        assert_eq!(BilletInstruction::describe(1).unwrap(), "Remessa");
        assert!(matches!(
            BilletInstruction::describe(999),
            Err(Error::InvalidCode { code: 999, .. })
        ));
    }

    #[test]
    fn test_instruction_code_round_trip() {
        for code in [1, 2, 4, 5, 6, 7, 8, 9, 31, 45] {
            assert_eq!(BilletInstruction::from_code(code).unwrap().code(), code);
        }
    }

    #[test]
    fn test_post_expiration_membership() {
        assert!(Instruction::is_valid(6));
        assert!(Instruction::is_valid(18));
        assert!(!Instruction::is_valid(99));
    }

    #[test]
    fn test_occurrence_predicates() {
        assert!(BilletOccurrence::from_code(6).unwrap().is_settlement());
        assert!(BilletOccurrence::from_code(15).unwrap().is_settlement());
        assert!(BilletOccurrence::from_code(3).unwrap().is_rejection());
        assert!(!BilletOccurrence::from_code(2).unwrap().is_settlement());
        assert!(BilletOccurrence::from_code(99).is_err());
    }

    #[test]
    fn test_payment_restriction_bitmask() {
        let r = PaymentRestriction::PROTESTED.with(PaymentRestriction::CREDIT_BLOCKED);
        assert!(r.is_protested());
        assert!(r.is_credit_blocked());
        assert!(!r.is_sent_to_dunning_agency());
        assert_eq!(r.description(), "Protestado, crédito bloqueado");
        assert_eq!(PaymentRestriction::NONE.description(), "Sem restrições");
        assert!(PaymentRestriction::from_bits(8).is_err());
    }

    #[test]
    fn test_status_and_situation() {
        assert_eq!(BilletStatus::from_code(3).unwrap().description(), "Pago");
        assert_eq!(
            PaymentSituation::from_code(1).unwrap().description(),
            "Em aberto"
        );
        assert_eq!(Currency::Real.code(), 9);
    }
}
