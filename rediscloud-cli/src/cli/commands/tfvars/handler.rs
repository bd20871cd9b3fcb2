//! Tfvars command handler

use anyhow::Result;
use colored::*;

use super::TfvarsArgs;
use crate::cli::commands::report_skipped;
use crate::payload::{TfVars, render_hcl_snippet, write_json, write_text};
use crate::sizing::{SheetSource, SizingOptions, load_sheet};

/// Convert a sizing sheet into `terraform.auto.tfvars.json` (and optionally HCL)
pub fn handle_tfvars_command(args: TfvarsArgs) -> Result<()> {
    let source = SheetSource {
        sheet: args.sheet.as_deref(),
        environment: args.env.as_deref(),
    };
    let options = SizingOptions {
        precision: args.precision,
    };

    let sheet = load_sheet(&args.input, &source, &options)?;
    if sheet.databases.is_empty() {
        log::warn!("No usable rows in {}; writing an empty variables file", args.input.display());
    }

    let tfvars = TfVars::from_databases(&sheet.databases);
    write_json(&args.out, &tfvars)?;
    println!(
        "Wrote {} ({} databases, {} creation plans)",
        args.out.display().to_string().cyan(),
        tfvars.databases.len(),
        tfvars.creation_plans.len()
    );

    if let Some(hcl_path) = &args.emit_hcl {
        write_text(hcl_path, &render_hcl_snippet())?;
        println!("Wrote {}", hcl_path.display().to_string().cyan());
    }

    report_skipped(&sheet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn test_tfvars_command_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sizing.csv");
        fs::File::create(&input)
            .unwrap()
            .write_all(b"Database Name,Qty,Memory GB,Throughput,Replication\ncacheA,2,2.4,5000,yes\n")
            .unwrap();

        let args = TfvarsArgs {
            input,
            sheet: None,
            env: None,
            out: dir.path().join("out/terraform.auto.tfvars.json"),
            emit_hcl: Some(dir.path().join("out/databases.tf")),
            precision: 3,
        };
        handle_tfvars_command(args.clone()).unwrap();

        let tfvars: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&args.out).unwrap()).unwrap();
        assert_eq!(tfvars["databases"]["cacheA-2"]["dataset_size_in_gb"], 2);
        assert_eq!(tfvars["creation_plans"][0]["quantity"], 2);

        let hcl = fs::read_to_string(args.emit_hcl.unwrap()).unwrap();
        assert!(hcl.contains("for_each = var.databases"));
    }

    #[test]
    fn test_duplicate_names_abort_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sizing.csv");
        // "orders" x2 expands to orders-1, which collides with the second row
        fs::write(&input, "name,size,quantity\norders,1,2\norders-1,3,1\n").unwrap();

        let args = TfvarsArgs {
            input,
            sheet: None,
            env: None,
            out: dir.path().join("terraform.auto.tfvars.json"),
            emit_hcl: None,
            precision: 3,
        };
        let err = handle_tfvars_command(args.clone()).unwrap_err();
        assert!(format!("{:#}", err).contains("Duplicate database name 'orders-1'"));
        assert!(!args.out.exists());
    }
}
