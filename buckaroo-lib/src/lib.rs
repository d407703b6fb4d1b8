//! Buckaroo NVP gateway library.
//!
//! The core of the crate is synchronous and free of I/O: a case-insensitive
//! parameter map, the form codec, request signing and verification, the
//! indexed field mapper and the status / transaction-type classifiers.
//! [`Gateway`] wraps these behind a pluggable async [`Transport`].
//!
//! # Features
//!
//! - **http-transport**: reqwest-based [`HttpTransport`]
//! - **test-utils**: mock transport and signed fixtures for tests
//!
//! # Example
//!
//! ```
//! use buckaroo_lib::{HashMethod, ParameterSet, Signer};
//!
//! let signer = Signer::new("secret", HashMethod::Sha1);
//! let mut params = ParameterSet::new();
//! params.insert("brq_websitekey", "12345");
//! params.insert("brq_amount", "10.00");
//! signer.append_signature(&mut params);
//!
//! assert!(signer.verify(&params).is_ok());
//! ```

pub mod amount;
pub mod classify;
pub mod codec;
pub mod config;
pub mod errors;
pub mod field_mapper;
pub mod gateway;
pub mod iban;
pub mod ideal;
pub mod params;
pub mod payment_method;
pub mod prelude;
pub mod request;
pub mod response;
pub mod signature;
pub mod transport;

/// Mock transport and fixtures.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use amount::Amount;
pub use classify::{classify_status, classify_type, TransactionStatus, TransactionType};
pub use config::{GatewayConfig, GatewayMode, Secret};
pub use errors::{BuckarooError, BuckarooErrorCode};
pub use field_mapper::{map_fields, FieldValue, IndexedGroup};
pub use gateway::Gateway;
pub use params::{CaseInsensitiveMap, ParamValue, ParameterSet, ResponseParams};
pub use payment_method::{Language, PaymentMethod};
pub use signature::{HashMethod, Signer};
pub use transport::{HttpTransport, Transport};

/// Common result alias for gateway operations.
pub type Result<T> = std::result::Result<T, BuckarooError>;
