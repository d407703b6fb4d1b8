//! Test utilities for the gateway.
//!
//! - [`MockTransport`] records every request and replays queued bodies
//! - fixtures build configurations and signed response bodies
//!
//! ## Usage
//!
//! ```rust,ignore
//! use buckaroo_lib::test_utils::{signed_body, test_config, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.push_body(signed_body(&[("brq_apiresult", "Success")])).await;
//! let gateway = Gateway::with_transport(test_config(), transport)?;
//! ```

mod fixtures;
mod mock_transport;

pub use fixtures::{
    decoded_request, signed_body, test_config, test_signer, TestFixtures,
};
pub use mock_transport::{MockTransport, RecordedRequest};
