//! Digital signature over an NVP parameter set.
//!
//! The signing input is built from every `brq_`, `add_` and `cust_`
//! parameter (except `brq_signature` itself), sorted with the gateway's own
//! collation, concatenated as `key=value` without separators and followed by
//! the shared secret. The digest is returned as lowercase hex.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::config::{GatewayConfig, Secret};
use crate::params::{starts_with_ignore_case, CaseInsensitiveMap, ParamValue, ParameterSet};
use crate::{BuckarooError, Result};

/// Name of the signature parameter.
pub const SIGNATURE_KEY: &str = "brq_signature";

/// Parameter prefixes covered by the signature.
pub const SIGNED_PREFIXES: [&str; 3] = ["brq_", "add_", "cust_"];

/// Digest algorithm used for signing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashMethod {
    /// SHA-1 (gateway default).
    #[default]
    #[serde(alias = "SHA1", alias = "sha-1", alias = "SHA-1")]
    Sha1,
    /// SHA-256.
    #[serde(alias = "SHA256", alias = "sha-256", alias = "SHA-256")]
    Sha256,
    /// SHA-512.
    #[serde(alias = "SHA512", alias = "sha-512", alias = "SHA-512")]
    Sha512,
}

impl HashMethod {
    /// Lowercase name of the algorithm.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Hex digest of `input`.
    pub fn hex_digest(&self, input: &[u8]) -> String {
        match self {
            Self::Sha1 => hex::encode(Sha1::digest(input)),
            Self::Sha256 => hex::encode(Sha256::digest(input)),
            Self::Sha512 => hex::encode(Sha512::digest(input)),
        }
    }
}

impl Display for HashMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashMethod {
    type Err = BuckarooError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(BuckarooError::invalid_config(
                "hash_method",
                format!("{} (expected sha1, sha256 or sha512)", s),
            )),
        }
    }
}

/// Signs and verifies parameter sets with a shared secret.
#[derive(Clone, Debug)]
pub struct Signer {
    secret: Secret,
    hash_method: HashMethod,
}

impl Signer {
    /// Create a signer for the given secret and algorithm.
    pub fn new(secret: impl Into<Secret>, hash_method: HashMethod) -> Self {
        Self {
            secret: secret.into(),
            hash_method,
        }
    }

    /// Create a signer from gateway configuration.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.secret.clone(), config.hash_method)
    }

    /// The configured digest algorithm.
    pub fn hash_method(&self) -> HashMethod {
        self.hash_method
    }

    /// Compute the signature of `params`.
    ///
    /// Any `brq_signature` already present is ignored.
    pub fn sign<V: Display>(&self, params: &CaseInsensitiveMap<V>) -> String {
        let input = Zeroizing::new(signature_string(params, self.secret.expose()));
        self.hash_method.hex_digest(input.as_bytes())
    }

    /// Replace any existing signature with a fresh one appended last.
    pub fn append_signature(&self, params: &mut ParameterSet) {
        params.remove(SIGNATURE_KEY);
        let signature = self.sign(params);
        params.insert(SIGNATURE_KEY, ParamValue::Str(signature));
    }

    /// Verify the `brq_signature` carried by `params`.
    ///
    /// A missing signature is a mismatch.
    pub fn verify<V: Display>(&self, params: &CaseInsensitiveMap<V>) -> Result<()> {
        let sent = params.get(SIGNATURE_KEY).map(|value| value.to_string());
        let generated = self.sign(params);

        let matches = sent
            .as_deref()
            .is_some_and(|sent| constant_time_eq(sent.as_bytes(), generated.as_bytes()));
        if matches {
            return Ok(());
        }

        tracing::warn!(
            sent = sent.as_deref().unwrap_or(""),
            generated = %generated,
            "signature verification failed"
        );
        Err(BuckarooError::SignatureMismatch { sent, generated })
    }
}

/// Build the string that is hashed: sorted signed parameters plus `secret`.
pub fn signature_string<V: Display>(params: &CaseInsensitiveMap<V>, secret: &str) -> String {
    let mut signed: Vec<(&str, &V)> = params
        .iter()
        .filter(|(key, _)| is_signed_key(key))
        .collect();
    signed.sort_by(|a, b| collate(a.0, b.0));

    let mut input = String::new();
    for (key, value) in signed {
        input.push_str(key);
        input.push('=');
        input.push_str(&value.to_string());
    }
    input.push_str(secret);
    input
}

/// Returns true if `key` takes part in the signature.
pub fn is_signed_key(key: &str) -> bool {
    SIGNED_PREFIXES
        .iter()
        .any(|prefix| starts_with_ignore_case(key, prefix))
        && !key.eq_ignore_ascii_case(SIGNATURE_KEY)
}

/// Compare two parameter names with the signing collation.
///
/// Names are ASCII case-folded and compared character by character: `_`
/// first, then `0`-`9`, then `a`-`z`, then anything else by code point. A
/// strict prefix sorts before the longer name.
pub fn collate(a: &str, b: &str) -> Ordering {
    let left = a.chars().map(|c| c.to_ascii_lowercase()).map(collation_rank);
    let right = b.chars().map(|c| c.to_ascii_lowercase()).map(collation_rank);
    left.cmp(right)
}

fn collation_rank(c: char) -> (u8, u32) {
    match c {
        '_' => (0, 0),
        '0'..='9' => (1, c as u32),
        'a'..='z' => (2, c as u32),
        _ => (3, c as u32),
    }
}

/// Compare two byte strings without an early exit on the first difference.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ResponseParams;

    const SHA1_DIGEST: &str = "c864c2abad67580274b2df00fd2a53739952b924";
    const SHA256_DIGEST: &str = "79afb9eac4182fdc2de222b558bcb0d3978f57bd4bf24eb2e7ea791943443716";
    const SHA512_DIGEST: &str = "161e485fd71c708fa7f39c1732349fae1e5b8a0c05cd4f9d806ad570b2414f5b99b4aaf89ed48c55c188b82b9565d93471d3d20163002909360f31f29f4a988d";

    fn sample_params() -> ParameterSet {
        let mut params = ParameterSet::new();
        params.insert("brq_test", "abcdef");
        params.insert("brq_test2", "foobar");
        params
    }

    #[test]
    fn test_sign_with_each_hash_method() {
        let params = sample_params();

        assert_eq!(Signer::new("secret", HashMethod::Sha1).sign(&params), SHA1_DIGEST);
        assert_eq!(Signer::new("secret", HashMethod::Sha256).sign(&params), SHA256_DIGEST);
        assert_eq!(Signer::new("secret", HashMethod::Sha512).sign(&params), SHA512_DIGEST);
    }

    #[test]
    fn test_signature_string_skips_unsigned_keys() {
        let mut params = ParameterSet::new();
        params.insert("brq_test", true);
        params.insert("add_test", true);
        params.insert("cust_test", true);
        params.insert("not_test", true);
        params.insert("brq_signature", "abcdef");
        params.insert("BRQ_SIGNATURE", "ignored");

        assert_eq!(
            signature_string(&params, "secret"),
            "add_test=truebrq_test=truecust_test=truesecret"
        );
    }

    #[test]
    fn test_signature_string_renders_typed_values() {
        let mut params = ParameterSet::new();
        params.insert("brq_boolean", true);
        params.insert("brq_integer", 1337);
        params.insert("brq_nil", ParamValue::Nil);
        params.insert("brq_string", "foobar");

        assert_eq!(
            signature_string(&params, "secret"),
            "brq_boolean=truebrq_integer=1337brq_nil=brq_string=foobarsecret"
        );
    }

    #[test]
    fn test_signature_string_preserves_casing() {
        let mut params = ParameterSet::new();
        params.insert("BRQ_TESTB", "abcDEF");
        params.insert("brq_testA", "Foobar");
        params.insert("BRQ_TestC", "test");

        assert_eq!(
            signature_string(&params, "secret"),
            "brq_testA=FoobarBRQ_TESTB=abcDEFBRQ_TestC=testsecret"
        );
    }

    #[test]
    fn test_signature_string_uses_gateway_collation() {
        let mut params = ParameterSet::new();
        for key in [
            "brq_aCa", "brq_aba", "brq_aab", "brq_aaA", "brq_a1a", "brq_a0a", "brq_a0", "brq_a_a",
        ] {
            params.insert(key, "foo");
        }

        assert_eq!(
            signature_string(&params, "secret"),
            "brq_a_a=foobrq_a0=foobrq_a0a=foobrq_a1a=foobrq_aaA=foobrq_aab=foobrq_aba=foobrq_aCa=foosecret"
        );
    }

    #[test]
    fn test_collate_precedence() {
        assert_eq!(collate("a_", "a0"), Ordering::Less);
        assert_eq!(collate("a9", "aa"), Ordering::Less);
        assert_eq!(collate("a", "a_"), Ordering::Less);
        assert_eq!(collate("aZ", "az"), Ordering::Equal);
        assert_eq!(collate("az", "a-"), Ordering::Less);
        assert_eq!(collate("a-", "a."), Ordering::Less);
        // non-ASCII letters are not folded
        assert_eq!(collate("aÄ", "aä"), Ordering::Less);
        assert_eq!(collate("az", "aä"), Ordering::Less);
    }

    #[test]
    fn test_append_signature_is_last_and_unique() {
        let signer = Signer::new("secret", HashMethod::Sha1);
        let mut params = sample_params();
        params.insert("BRQ_SIGNATURE", "stale");
        params.insert("brq_after", "x");

        signer.append_signature(&mut params);

        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, vec!["brq_test", "brq_test2", "brq_after", "brq_signature"]);
        let signature = params.get(SIGNATURE_KEY).map(ToString::to_string);
        assert_eq!(signature, Some(signer.sign(&params)));
    }

    #[test]
    fn test_verify_accepts_valid_signature() {
        let signer = Signer::new("secret", HashMethod::Sha1);
        let mut params: ResponseParams = vec![("brq_test", "abcdef"), ("brq_test2", "foobar")]
            .into_iter()
            .collect();
        params.insert("brq_signature", SHA1_DIGEST);

        assert!(signer.verify(&params).is_ok());
    }

    #[test]
    fn test_verify_rejects_tampered_signature() {
        let signer = Signer::new("secret", HashMethod::Sha1);
        let mut params: ResponseParams = vec![("brq_test", "abcdef"), ("brq_test2", "foobar")]
            .into_iter()
            .collect();
        params.insert("brq_signature", "abcdefgh12345");

        match signer.verify(&params) {
            Err(BuckarooError::SignatureMismatch { sent, generated }) => {
                assert_eq!(sent.as_deref(), Some("abcdefgh12345"));
                assert_eq!(generated, SHA1_DIGEST);
            }
            other => panic!("expected signature mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_missing_signature() {
        let signer = Signer::new("secret", HashMethod::Sha1);
        let params: ResponseParams = vec![("brq_test", "abcdef")].into_iter().collect();

        match signer.verify(&params) {
            Err(BuckarooError::SignatureMismatch { sent, .. }) => assert!(sent.is_none()),
            other => panic!("expected signature mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let mut params = sample_params();
        Signer::new("secret", HashMethod::Sha256).append_signature(&mut params);

        assert!(Signer::new("secret", HashMethod::Sha256).verify(&params).is_ok());
        assert!(Signer::new("other", HashMethod::Sha256).verify(&params).is_err());
        assert!(Signer::new("secret", HashMethod::Sha1).verify(&params).is_err());
    }

    #[test]
    fn test_hash_method_parsing() {
        assert_eq!("SHA1".parse::<HashMethod>().unwrap(), HashMethod::Sha1);
        assert_eq!("sha-256".parse::<HashMethod>().unwrap(), HashMethod::Sha256);
        assert_eq!("Sha512".parse::<HashMethod>().unwrap(), HashMethod::Sha512);
        assert!("md5".parse::<HashMethod>().is_err());
        assert_eq!(HashMethod::default(), HashMethod::Sha1);
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn test_signer_debug_hides_secret() {
        let signer = Signer::new("supersecret", HashMethod::Sha1);
        assert!(!format!("{:?}", signer).contains("supersecret"));
    }
}
