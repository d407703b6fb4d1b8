//! Configurations and signed bodies for tests.

use crate::codec;
use crate::config::{GatewayConfig, GatewayMode};
use crate::params::{ParameterSet, ResponseParams};
use crate::signature::{HashMethod, Signer};

use super::RecordedRequest;

/// Commonly used test values.
pub struct TestFixtures;

impl TestFixtures {
    /// Website key.
    pub const WEBSITE: &'static str = "12345678";

    /// Shared secret.
    pub const SECRET: &'static str = "7C222FB2927D828AF22F592134E8932480637C0D";

    /// A transaction key as issued by the gateway.
    pub const TRANSACTION_ID: &'static str = "41C48B55FA9164E123CC73B1157459E840BE5D24";

    /// A payment key as issued by the gateway.
    pub const PAYMENT_ID: &'static str = "E86256B2787EE7FF0C33D0D4BBC2A65F";

    /// Return URL.
    pub const RETURN_URL: &'static str = "http://www.return.url/";
}

/// Test-mode configuration using the fixture website and secret.
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        website: TestFixtures::WEBSITE.to_string(),
        secret: TestFixtures::SECRET.into(),
        hash_method: HashMethod::Sha1,
        mode: GatewayMode::Test,
        timeout_secs: 30,
        api_url: None,
    }
}

/// Signer matching [`test_config`].
pub fn test_signer() -> Signer {
    Signer::from_config(&test_config())
}

/// Encode `pairs` and sign them with the fixture secret.
pub fn signed_body(pairs: &[(&str, &str)]) -> Vec<u8> {
    let mut params: ParameterSet = pairs.iter().copied().collect();
    test_signer().append_signature(&mut params);
    codec::encode_to_bytes(&params)
}

/// Decode the body of a recorded request.
pub fn decoded_request(request: &RecordedRequest) -> ResponseParams {
    codec::decode_str(&request.body)
}
