//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use buckaroo_lib::prelude::*;
//! ```

// Error handling
pub use crate::errors::{BuckarooError, BuckarooErrorCode};
pub use crate::Result;

// Configuration
pub use crate::config::{GatewayConfig, GatewayMode};
pub use crate::signature::{HashMethod, Signer};

// Requests
pub use crate::amount::Amount;
pub use crate::payment_method::{Language, PaymentMethod};
pub use crate::request::{
    PaymentMethodSelection, RecurrentTransactionOptions, RefundTransactionOptions,
    SetupTransactionOptions, StatusOptions, TransactionSpecificationOptions,
};

// Responses
pub use crate::classify::{TransactionStatus, TransactionType};
pub use crate::response::{TransactionResponse, TransactionSummary};

// Gateway
pub use crate::gateway::Gateway;
pub use crate::transport::{HttpTransport, Transport};
