//! Sign and verify commands

use anyhow::{bail, Result};
use buckaroo_lib::signature::SIGNATURE_KEY;
use buckaroo_lib::{codec, BuckarooError, HashMethod, ParameterSet, Signer};
use serde_json::json;

use super::{read_body, Output};
use crate::ui;

/// Parse `key=value` arguments in order.
pub fn parse_pairs(args: &[String]) -> Result<ParameterSet> {
    let mut params = ParameterSet::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("Expected key=value, got '{}'", arg);
        };
        if key.is_empty() {
            bail!("Empty parameter name in '{}'", arg);
        }
        params.insert(key, value);
    }
    Ok(params)
}

pub fn sign(args: &[String], secret: &str, hash_method: HashMethod, output: Output) -> Result<()> {
    let mut params = parse_pairs(args)?;
    let signer = Signer::new(secret, hash_method);
    signer.append_signature(&mut params);

    let signature = params
        .get(SIGNATURE_KEY)
        .map(ToString::to_string)
        .unwrap_or_default();
    let body = codec::encode(&params);

    if output.json {
        ui::json(&json!({
            "hash_method": hash_method.as_str(),
            "signature": signature,
            "body": body,
        }));
        return Ok(());
    }

    ui::header("Signed Request");
    if output.verbose {
        ui::key_value("Parameters", &params.len().to_string());
    }
    ui::key_value("Hash method", hash_method.as_str());
    ui::key_value("Signature", &signature);
    ui::separator();
    println!("{}", body);
    Ok(())
}

pub fn verify(body: &str, secret: &str, hash_method: HashMethod, output: Output) -> Result<()> {
    let body = read_body(body)?;
    let params = codec::decode_str(&body);
    let signer = Signer::new(secret, hash_method);

    let result = signer.verify(&params);

    if output.json {
        let value = match &result {
            Ok(()) => json!({ "valid": true }),
            Err(BuckarooError::SignatureMismatch { sent, generated }) => json!({
                "valid": false,
                "sent": sent,
                "generated": generated,
            }),
            Err(e) => json!({ "valid": false, "error": e.to_string() }),
        };
        ui::json(&value);
        return result.map_err(Into::into);
    }

    match result {
        Ok(()) => {
            ui::success("Signature valid");
            Ok(())
        }
        Err(e) => {
            if output.verbose {
                ui::key_value("Parameters", &params.len().to_string());
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_keeps_order() {
        let args = vec!["brq_b=2".to_string(), "brq_a=x=y".to_string()];
        let params = parse_pairs(&args).unwrap();

        let keys: Vec<_> = params.keys().collect();
        assert_eq!(keys, vec!["brq_b", "brq_a"]);
        assert_eq!(params.get("brq_a").map(ToString::to_string).as_deref(), Some("x=y"));
    }

    #[test]
    fn test_parse_pairs_rejects_bad_input() {
        assert!(parse_pairs(&["novalue".to_string()]).is_err());
        assert!(parse_pairs(&["=value".to_string()]).is_err());
    }
}
