//! Issuer list and IBAN commands

use anyhow::Result;
use buckaroo_lib::iban::calculate_iban;
use buckaroo_lib::ideal::ISSUERS;
use serde_json::json;

use super::Output;
use crate::ui;

pub fn issuers(output: Output) -> Result<()> {
    if output.json {
        let list: Vec<_> = ISSUERS
            .iter()
            .map(|(bic, name)| json!({ "bic": bic, "name": name }))
            .collect();
        ui::json(&json!(list));
        return Ok(());
    }

    ui::header("iDEAL Issuers");
    for (bic, name) in ISSUERS {
        ui::key_value(bic, name);
    }
    Ok(())
}

pub fn iban(account: &str, bank: &str, country: &str, output: Output) -> Result<()> {
    let iban = calculate_iban(account, bank, country)?;

    if output.json {
        ui::json(&json!({ "iban": iban }));
        return Ok(());
    }

    if output.verbose {
        ui::key_value("Account", account);
        ui::key_value("Bank", bank);
        ui::key_value("Country", country);
    }
    ui::success(&iban);
    Ok(())
}
