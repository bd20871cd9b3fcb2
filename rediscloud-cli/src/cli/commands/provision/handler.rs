//! Provision command handler

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;

use super::ProvisionArgs;
use crate::api::{ProvisioningClient, SubscriptionShape};
use crate::cli::UsageError;
use crate::config::Settings;
use crate::payload::build_provision_request;
use crate::sizing::{SheetSource, SizingOptions, load_sheet};
use crate::types::ProvisionRequest;
use crate::workflow::ProvisioningWorkflow;

/// Create the subscription and its databases
pub async fn handle_provision_command(args: ProvisionArgs, settings: &Settings) -> Result<()> {
    let mut config = settings.provision_config()?;
    if let Some(shape) = args.shape {
        config.shape = shape.into();
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let request = read_request(&args, stdin.lock(), interactive)?;
    println!(
        "Provisioning {} database(s) in {} / {} as subscription '{}'",
        request.databases.len(),
        config.target.provider.cyan(),
        config.target.region.cyan(),
        config.target.subscription_name.bold()
    );

    let client = ProvisioningClient::from_config(&config)?;
    let mut workflow = ProvisioningWorkflow::new(&client);
    let report = workflow
        .run(&request)
        .await
        .with_context(|| format!("Provisioning stopped during {}", workflow.state()))?;

    println!(
        "Subscription {} is {}",
        report.subscription_id.bright_green().bold(),
        report.subscription.raw_status
    );
    match report.shape {
        SubscriptionShape::CreationPlan => {
            for db in &report.databases {
                println!("  {} {} (id {})", "✓".green(), db.name, db.id.dimmed());
            }
        }
        SubscriptionShape::DatabasesInline => {
            for name in &report.inline_databases {
                println!("  {} {} (created with the subscription)", "✓".green(), name);
            }
        }
    }
    println!("{}", "Provisioning complete".green().bold());
    Ok(())
}

/// Load the workflow input from --payload, --sheet, or a piped stdin.
/// An interactive stdin is refused rather than waited on.
pub fn read_request<R: Read>(
    args: &ProvisionArgs,
    mut stdin: R,
    stdin_is_terminal: bool,
) -> Result<ProvisionRequest> {
    if let Some(path) = &args.payload {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file: {}", path.display()))?;
        return ProvisionRequest::from_json(&text)
            .with_context(|| format!("Invalid payload file: {}", path.display()));
    }

    if let Some(path) = &args.sheet {
        let source = SheetSource {
            sheet: args.sheet_name.as_deref(),
            environment: None,
        };
        let options = SizingOptions {
            precision: args.precision,
        };
        let sheet = load_sheet(path, &source, &options)?;
        return Ok(build_provision_request(sheet.databases, args.precision));
    }

    if stdin_is_terminal {
        return Err(UsageError::new(
            "Pipe the request JSON into stdin, e.g. `cat redis_payloads.json | rediscloud-cli provision`, or pass --payload <file>",
        )
        .into());
    }

    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read request from stdin")?;
    ProvisionRequest::from_json(&text).context("Invalid request JSON on stdin")
}
