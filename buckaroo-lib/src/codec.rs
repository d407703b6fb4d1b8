//! `application/x-www-form-urlencoded` codec for NVP bodies.
//!
//! Encoding keeps the caller's parameter order. Values are form-escaped
//! (space becomes `+`); keys made only of `[A-Za-z0-9_.-]` go out verbatim.
//! Decoding keeps the first occurrence of a repeated key.

use std::fmt::Display;

use url::form_urlencoded;

use crate::params::{CaseInsensitiveMap, ResponseParams};

/// Serialize parameters to a form-encoded string, preserving order.
pub fn encode<V: Display>(params: &CaseInsensitiveMap<V>) -> String {
    let mut body = String::new();

    for (key, value) in params.iter() {
        if !body.is_empty() {
            body.push('&');
        }
        push_key(&mut body, key);
        body.push('=');
        body.extend(form_urlencoded::byte_serialize(value.to_string().as_bytes()));
    }

    body
}

/// Serialize parameters to form-encoded bytes.
pub fn encode_to_bytes<V: Display>(params: &CaseInsensitiveMap<V>) -> Vec<u8> {
    encode(params).into_bytes()
}

fn push_key(body: &mut String, key: &str) {
    if key.bytes().all(is_plain_key_byte) {
        body.push_str(key);
    } else {
        body.extend(form_urlencoded::byte_serialize(key.as_bytes()));
    }
}

fn is_plain_key_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.' | b'-')
}

/// Parse a form-encoded body into case-insensitive string pairs.
///
/// An empty body yields an empty map; detecting a missing result is left to
/// the caller.
pub fn decode(body: &[u8]) -> ResponseParams {
    let mut params = ResponseParams::new();

    for (key, value) in form_urlencoded::parse(body) {
        if !params.contains_key(&key) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }

    params
}

/// Parse a form-encoded string. See [`decode`].
pub fn decode_str(body: &str) -> ResponseParams {
    decode(body.as_bytes())
}
