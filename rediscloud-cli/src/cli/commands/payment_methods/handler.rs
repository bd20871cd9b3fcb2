//! Payment methods command handler

use anyhow::{Context, Result};
use colored::*;

use super::PaymentMethodsArgs;
use crate::api::ProvisioningClient;
use crate::api::extract::identifier_text;
use crate::config::{Settings, env};

/// Print the payment methods visible to the configured account
pub async fn handle_payment_methods_command(args: PaymentMethodsArgs, settings: &Settings) -> Result<()> {
    let api = settings.api_config()?;
    let client = ProvisioningClient::new(&api)?;
    let methods = client
        .list_payment_methods()
        .await
        .context("Failed to list payment methods")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&methods)?);
        return Ok(());
    }

    if methods.is_empty() {
        println!("{}", "No payment methods found for this account".yellow());
        return Ok(());
    }

    println!("{}", "Payment methods:".bold());
    for method in &methods {
        let card = method
            .credit_card_ends_with
            .as_ref()
            .and_then(identifier_text)
            .map(|end| format!(" ending in {}", end))
            .unwrap_or_default();
        println!(
            "  {}  {}{}",
            method.id_text().bright_green().bold(),
            method.method_type.as_deref().unwrap_or("unknown"),
            card
        );
    }
    println!();
    println!("Set {} to one of the ids above", env::PAYMENT_METHOD_ID.cyan());
    Ok(())
}
