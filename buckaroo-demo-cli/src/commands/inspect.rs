//! Decoding and classification commands

use anyhow::Result;
use buckaroo_lib::classify::lookup_type_code;
use buckaroo_lib::{codec, FieldValue, IndexedGroup};
use colored::Colorize;
use serde_json::{json, Map, Value};

use super::{read_body, Output};
use crate::ui;

pub fn decode(body: &str, output: Output) -> Result<()> {
    let params = codec::decode_str(&read_body(body)?);

    if output.json {
        let object: Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(v.as_str())))
            .collect();
        ui::json(&Value::Object(object));
        return Ok(());
    }

    ui::header("Parameters");
    if params.is_empty() {
        ui::info("No parameters found");
        return Ok(());
    }
    for (key, value) in &params {
        ui::key_value(key, value);
    }
    Ok(())
}

pub fn map_fields(body: &str, prefix: &str, output: Output) -> Result<()> {
    let params = codec::decode_str(&read_body(body)?);
    let groups = buckaroo_lib::map_fields(&params, prefix);

    if output.json {
        ui::json(&groups_to_json(&groups));
        return Ok(());
    }

    ui::header(&format!("Fields under {}", prefix));
    if groups.is_empty() {
        ui::info("No indexed fields found");
        return Ok(());
    }
    print_groups(&groups, 1);
    Ok(())
}

/// Convert grouped fields to a JSON array of objects.
pub fn groups_to_json(groups: &[IndexedGroup]) -> Value {
    Value::Array(
        groups
            .iter()
            .map(|group| {
                let object: Map<String, Value> = group
                    .iter()
                    .map(|(name, value)| {
                        let value = match value {
                            FieldValue::Value(text) => Value::from(text.as_str()),
                            FieldValue::Groups(nested) => groups_to_json(nested),
                        };
                        (name.to_string(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect(),
    )
}

fn print_groups(groups: &[IndexedGroup], depth: usize) {
    let indent = "  ".repeat(depth);
    for (index, group) in groups.iter().enumerate() {
        println!("{}{}", indent, format!("[{}]", index + 1).bold());
        for (name, value) in group {
            match value {
                FieldValue::Value(text) => println!("{}  {}: {}", indent, name.cyan(), text),
                FieldValue::Groups(nested) => {
                    println!("{}  {}:", indent, name.cyan());
                    print_groups(nested, depth + 2);
                }
            }
        }
    }
}

pub fn classify_status(code: &str, output: Output) -> Result<()> {
    let status = buckaroo_lib::classify_status(code);

    if output.json {
        ui::json(&json!({ "code": code, "status": status }));
        return Ok(());
    }

    match status {
        Some(status) => ui::key_value(code, status.as_str()),
        None => ui::warning(&format!("Unknown status code: {}", code)),
    }
    Ok(())
}

pub fn classify_type(code: Option<&str>, recurring: Option<&str>, output: Output) -> Result<()> {
    let transaction_type = buckaroo_lib::classify_type(code, recurring);
    let entry = code.and_then(lookup_type_code);

    if output.json {
        ui::json(&json!({
            "code": code,
            "type": transaction_type,
            "payment_method": entry.map(|e| e.payment_method.as_str()),
        }));
        return Ok(());
    }

    let label = code.unwrap_or("(none)");
    match transaction_type {
        Some(kind) => {
            ui::key_value(label, kind.as_str());
            if let Some(entry) = entry {
                ui::key_value("Payment method", entry.payment_method.as_str());
            }
        }
        None => ui::warning(&format!("Unknown transaction type: {}", label)),
    }
    Ok(())
}
