//! Payment methods, service actions, operations and cultures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{BuckarooError, Result};

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Payment method (gateway service code).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// iDEAL
    #[serde(rename = "ideal")]
    Ideal,
    /// iDEAL via the processing service
    #[serde(rename = "idealprocessing")]
    IdealProcessing,
    /// SEPA direct debit
    #[serde(rename = "sepadirectdebit")]
    SepaDirectDebit,
    /// PayPal
    #[serde(rename = "paypal")]
    PayPal,
    /// Bancontact / Mister Cash
    #[serde(rename = "bancontactmrcash")]
    BancontactMisterCash,
    /// Sofort banking
    #[serde(rename = "sofortueberweisung")]
    Sofort,
    /// Giropay
    #[serde(rename = "giropay")]
    Giropay,
    /// Bank transfer
    #[serde(rename = "transfer")]
    Transfer,
    /// Visa
    #[serde(rename = "visa")]
    Visa,
    /// MasterCard
    #[serde(rename = "mastercard")]
    MasterCard,
    /// Maestro
    #[serde(rename = "maestro")]
    Maestro,
    /// American Express
    #[serde(rename = "amex")]
    AmericanExpress,
}

impl PaymentMethod {
    /// Every supported payment method.
    pub const ALL: [PaymentMethod; 12] = [
        Self::Ideal,
        Self::IdealProcessing,
        Self::SepaDirectDebit,
        Self::PayPal,
        Self::BancontactMisterCash,
        Self::Sofort,
        Self::Giropay,
        Self::Transfer,
        Self::Visa,
        Self::MasterCard,
        Self::Maestro,
        Self::AmericanExpress,
    ];

    /// Service code as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ideal => "ideal",
            Self::IdealProcessing => "idealprocessing",
            Self::SepaDirectDebit => "sepadirectdebit",
            Self::PayPal => "paypal",
            Self::BancontactMisterCash => "bancontactmrcash",
            Self::Sofort => "sofortueberweisung",
            Self::Giropay => "giropay",
            Self::Transfer => "transfer",
            Self::Visa => "visa",
            Self::MasterCard => "mastercard",
            Self::Maestro => "maestro",
            Self::AmericanExpress => "amex",
        }
    }

    /// Returns true for the two iDEAL services.
    pub fn is_ideal(&self) -> bool {
        matches!(self, Self::Ideal | Self::IdealProcessing)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = BuckarooError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BuckarooError::invalid_argument("payment method", s))
    }
}

/// Action requested from a payment service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Start a payment.
    Pay,
    /// Continue a recurring series.
    PayRecurrent,
    /// Refund a payment.
    Refund,
    /// Attach extra information (SEPA mandates).
    ExtraInfo,
    /// Generate a payment request.
    Generate,
}

impl Action {
    /// Action name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pay => "Pay",
            Self::PayRecurrent => "PayRecurrent",
            Self::Refund => "Refund",
            Self::ExtraInfo => "ExtraInfo",
            Self::Generate => "Generate",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// NVP operation, sent as the `op` query parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Cancel a pending transaction.
    CancelTransaction,
    /// Data request (no money flow).
    DataRequest,
    /// Refund information for a transaction.
    RefundInfo,
    /// New transaction (payment, recurrent payment or refund).
    TransactionRequest,
    /// Field specification of one or more services.
    TransactionRequestSpecification,
    /// Status of a transaction.
    TransactionStatus,
}

impl Operation {
    /// Operation name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CancelTransaction => "CancelTransaction",
            Self::DataRequest => "DataRequest",
            Self::RefundInfo => "RefundInfo",
            Self::TransactionRequest => "TransactionRequest",
            Self::TransactionRequestSpecification => "TransactionRequestSpecification",
            Self::TransactionStatus => "TransactionStatus",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Culture for gateway-hosted pages and messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// Dutch
    #[default]
    #[serde(rename = "nl-NL")]
    Dutch,
    /// English
    #[serde(rename = "en-US")]
    English,
    /// German
    #[serde(rename = "de-DE")]
    German,
    /// French
    #[serde(rename = "fr-FR")]
    French,
}

impl Language {
    /// Culture code as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dutch => "nl-NL",
            Self::English => "en-US",
            Self::German => "de-DE",
            Self::French => "fr-FR",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
