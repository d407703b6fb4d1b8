//! Live status query

use anyhow::{bail, Context, Result};
use buckaroo_lib::prelude::*;

use super::Output;
use crate::ui;

pub async fn run(
    transaction: Option<String>,
    payment: Option<String>,
    output: Output,
) -> Result<()> {
    let options = StatusOptions {
        transaction_id: transaction,
        payment_id: payment,
    };
    if options.validate().is_err() {
        bail!("Pass --transaction or --payment");
    }

    let config = GatewayConfig::from_env().context("Failed to load BUCKAROO_* configuration")?;
    if !cfg!(feature = "http-transport") {
        ui::warning("Built without the 'http-transport' feature; the request will not be sent");
    }
    if output.verbose {
        ui::info(&format!("Website: {}", config.website));
        ui::info(&format!("Endpoint: {}", config.api_url()));
    }

    tracing::debug!(mode = ?config.mode, timeout = config.timeout_secs, "querying status");
    let gateway = Gateway::new(config)?;
    let response = gateway
        .status(&options)
        .await
        .context("Status request failed")?;
    let summary = response.summary();

    if output.json {
        ui::json(&serde_json::to_value(&summary)?);
        return Ok(());
    }

    ui::header("Transaction Status");
    let status = summary
        .transaction_status
        .map(|s| s.as_str())
        .unwrap_or("unknown");
    ui::key_value("Status", status);
    if let Some(kind) = summary.transaction_type {
        ui::key_value("Type", kind.as_str());
    }
    if let Some(method) = &summary.payment_method {
        ui::key_value("Payment method", method);
    }
    if let Some(id) = &summary.transaction_id {
        ui::key_value("Transaction", id);
    }
    if let Some(invoice) = &summary.invoicenumber {
        ui::key_value("Invoice", invoice);
    }
    ui::separator();
    ui::key_value(
        "Cancellable",
        if response.is_cancellable() { "yes" } else { "no" },
    );
    Ok(())
}
