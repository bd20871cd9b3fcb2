//! Payload command handler

use anyhow::Result;
use colored::*;

use super::PayloadArgs;
use crate::cli::commands::report_skipped;
use crate::payload::{build_provision_request, write_json};
use crate::sizing::{SheetSource, SizingOptions, load_sheet};

/// Convert a sizing sheet into the provisioning request files
pub fn handle_payload_command(args: PayloadArgs) -> Result<()> {
    let source = SheetSource {
        sheet: args.sheet.as_deref(),
        environment: args.env.as_deref(),
    };
    let options = SizingOptions {
        precision: args.precision,
    };

    let sheet = load_sheet(&args.input, &source, &options)?;
    report_skipped(&sheet);
    let request = build_provision_request(sheet.databases, args.precision);

    if let Some(path) = &args.out_databases {
        write_json(path, &request.databases)?;
        println!("Wrote databases payload: {}", path.display().to_string().cyan());
    }

    if let Some(path) = &args.out_subscription {
        write_json(path, &request.subscription)?;
        println!("Wrote subscription payload: {}", path.display().to_string().cyan());
    }

    write_json(&args.out_combined, &request)?;
    println!(
        "Wrote combined payload: {} ({} databases)",
        args.out_combined.display().to_string().cyan(),
        request.databases.len()
    );
    Ok(())
}
