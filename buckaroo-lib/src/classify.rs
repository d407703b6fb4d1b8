//! Classification of gateway status and transaction-type codes.
//!
//! The gateway reports outcomes as opaque codes. The tables below are kept
//! declarative so they can be diffed against the gateway's status-code and
//! transaction-type references; they are indexed into hash maps on first use.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::payment_method::PaymentMethod;

/// Outcome of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Processed successfully.
    Success,
    /// Failed (technical or validation failure).
    Failed,
    /// Rejected by the gateway or issuer.
    Rejected,
    /// Still in progress.
    Pending,
    /// Cancelled by the consumer or merchant.
    Cancelled,
}

impl TransactionStatus {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
            Self::Pending => "pending",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// One-off payment.
    Payment,
    /// Payment that starts or continues a recurring series.
    PaymentRecurrent,
    /// Refund of an earlier payment.
    Refund,
    /// Reversal (chargeback) of an earlier payment.
    Reversal,
}

impl TransactionType {
    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Payment => "payment",
            Self::PaymentRecurrent => "payment_recurrent",
            Self::Refund => "refund",
            Self::Reversal => "reversal",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which leg of a payment a transaction-type code belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionLeg {
    /// Money in.
    Payment,
    /// Money returned by the merchant.
    Refund,
    /// Money reclaimed by the consumer or bank.
    Reversal,
}

/// Result of looking up a transaction-type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TypeCodeEntry {
    /// Payment, refund or reversal.
    pub leg: TransactionLeg,
    /// Payment method the code belongs to.
    pub payment_method: PaymentMethod,
}

const STATUS_CODES: &[(&str, TransactionStatus)] = &[
    ("190", TransactionStatus::Success),
    ("490", TransactionStatus::Failed),
    ("491", TransactionStatus::Failed),
    ("492", TransactionStatus::Failed),
    ("690", TransactionStatus::Rejected),
    ("790", TransactionStatus::Pending),
    ("791", TransactionStatus::Pending),
    ("792", TransactionStatus::Pending),
    ("793", TransactionStatus::Pending),
    ("890", TransactionStatus::Cancelled),
    ("891", TransactionStatus::Cancelled),
];

struct CodeGroup {
    leg: TransactionLeg,
    payment_method: PaymentMethod,
    codes: &'static [&'static str],
}

const fn group(
    leg: TransactionLeg,
    payment_method: PaymentMethod,
    codes: &'static [&'static str],
) -> CodeGroup {
    CodeGroup {
        leg,
        payment_method,
        codes,
    }
}

use crate::payment_method::PaymentMethod as M;
use self::TransactionLeg as L;

#[rustfmt::skip]
const TYPE_CODES: &[CodeGroup] = &[
    // Payments
    group(L::Payment, M::Ideal, &["C021", "V021"]),
    group(L::Payment, M::SepaDirectDebit, &["C002", "C004", "C005"]),
    group(L::Payment, M::PayPal, &["V010", "V014"]),
    group(L::Payment, M::BancontactMisterCash, &["C090", "V090"]),
    group(L::Payment, M::Sofort, &["N074", "C075"]),
    group(L::Payment, M::Transfer, &["C001"]),
    group(L::Payment, M::Visa, &[
        "C044", "C192", "C283", "C293", "C318", "C345", "C880", "C963", "V002", "V032",
        "V038", "V044", "V192", "V283", "V293", "V313", "V318", "V345", "V696",
    ]),
    group(L::Payment, M::MasterCard, &[
        "C043", "C089", "C273", "C303", "C328", "C355", "C876", "C969", "V001", "V031",
        "V037", "V043", "V089", "V273", "V303", "V328", "V355", "V702",
    ]),
    group(L::Payment, M::Maestro, &[
        "C046", "C251", "C288", "C308", "C333", "C872", "C972", "V034", "V040", "V046",
        "V094", "V245", "V288", "V308", "V333", "V705",
    ]),
    group(L::Payment, M::AmericanExpress, &["V003", "V030", "V036", "V042"]),

    // Refunds
    group(L::Refund, M::Ideal, &["C121"]),
    group(L::Refund, M::SepaDirectDebit, &["C102", "C500"]),
    group(L::Refund, M::PayPal, &["V110"]),
    group(L::Refund, M::BancontactMisterCash, &["C092", "V092"]),
    group(L::Refund, M::Sofort, &["N540", "C543"]),
    group(L::Refund, M::Transfer, &["C101"]),
    group(L::Refund, M::Visa, &[
        "C080", "C194", "C281", "C290", "C315", "C342", "C881", "C961", "V068", "V074",
        "V080", "V102", "V194", "V281", "V290", "V315", "V342", "V694",
    ]),
    group(L::Refund, M::MasterCard, &[
        "C079", "C197", "C300", "C325", "C352", "C371", "C877", "C967", "V067", "V073",
        "V079", "V101", "V149", "V197", "V300", "V325", "V352", "V371", "V700",
    ]),
    group(L::Refund, M::Maestro, &[
        "C082", "C252", "C286", "C305", "C330", "C873", "C970", "V070", "V076", "V082",
        "V246", "V286", "V305", "V330", "V703",
    ]),
    group(L::Refund, M::AmericanExpress, &["V066", "V072", "V078", "V103"]),

    // Reversals
    group(L::Reversal, M::SepaDirectDebit, &["C501", "C502", "C562"]),
    group(L::Reversal, M::PayPal, &["V111"]),
    group(L::Reversal, M::Sofort, &["C544"]),
    group(L::Reversal, M::Visa, &["C554", "C593", "C882", "V132", "V138", "V144", "V544", "V592"]),
    group(L::Reversal, M::MasterCard, &["C553", "C589", "C878", "V131", "V137", "V143", "V543", "V589"]),
    group(L::Reversal, M::Maestro, &["C546", "C551", "C874", "V134", "V140", "V146", "V545", "V546"]),
    group(L::Reversal, M::AmericanExpress, &["V130", "V136", "V142"]),
];

fn status_table() -> &'static HashMap<&'static str, TransactionStatus> {
    static TABLE: OnceLock<HashMap<&'static str, TransactionStatus>> = OnceLock::new();
    TABLE.get_or_init(|| STATUS_CODES.iter().copied().collect())
}

fn type_table() -> &'static HashMap<&'static str, TypeCodeEntry> {
    static TABLE: OnceLock<HashMap<&'static str, TypeCodeEntry>> = OnceLock::new();
    TABLE.get_or_init(|| {
        TYPE_CODES
            .iter()
            .flat_map(|group| {
                let entry = TypeCodeEntry {
                    leg: group.leg,
                    payment_method: group.payment_method,
                };
                group.codes.iter().map(move |&code| (code, entry))
            })
            .collect()
    })
}

/// Map a `brq_statuscode` to a status. Unknown codes yield `None`.
pub fn classify_status(code: &str) -> Option<TransactionStatus> {
    status_table().get(code).copied()
}

/// Look up the leg and payment method of a `brq_transaction_type` code.
pub fn lookup_type_code(code: &str) -> Option<TypeCodeEntry> {
    type_table().get(code).copied()
}

/// Map a `brq_transaction_type` code plus `brq_recurring` flag to a type.
///
/// An empty or absent code classifies as [`TransactionType::Payment`]; card
/// cancellations are reported without one. Unknown codes yield `None`.
pub fn classify_type(code: Option<&str>, recurring: Option<&str>) -> Option<TransactionType> {
    let code = match code {
        Some(code) if !code.is_empty() => code,
        _ => return Some(TransactionType::Payment),
    };

    let entry = lookup_type_code(code)?;
    Some(match entry.leg {
        TransactionLeg::Payment => {
            if recurring.is_some_and(|flag| flag.eq_ignore_ascii_case("true")) {
                TransactionType::PaymentRecurrent
            } else {
                TransactionType::Payment
            }
        }
        TransactionLeg::Refund => TransactionType::Refund,
        TransactionLeg::Reversal => TransactionType::Reversal,
    })
}
