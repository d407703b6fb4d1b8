//! IBAN construction from domestic account details.

use crate::{BuckarooError, Result};

/// Build an IBAN from a domestic account number and bank code.
///
/// The account number is left-padded with zeros to ten characters and the
/// check digits are computed with ISO 7064 mod 97-10.
pub fn calculate_iban(account_number: &str, bank_code: &str, country_code: &str) -> Result<String> {
    if account_number.is_empty() || !account_number.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(BuckarooError::invalid_argument(
            "account number",
            account_number,
        ));
    }

    if bank_code.is_empty() || !bank_code.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return Err(BuckarooError::invalid_argument("bank code", bank_code));
    }

    if country_code.len() != 2 || !country_code.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(BuckarooError::invalid_argument(
            "country code",
            format!("{} (expected two uppercase letters)", country_code),
        ));
    }

    let account_identification = format!(
        "{}{:0>10}",
        bank_code.to_ascii_uppercase(),
        account_number.to_ascii_uppercase()
    );

    let remainder = format!("{}{}00", account_identification, country_code)
        .bytes()
        .fold(0u32, |acc, byte| match byte {
            b'0'..=b'9' => (acc * 10 + u32::from(byte - b'0')) % 97,
            _ => (acc * 100 + u32::from(byte - b'A' + 10)) % 97,
        });
    let check_digits = 98 - remainder;

    Ok(format!(
        "{}{:02}{}",
        country_code, check_digits, account_identification
    ))
}
