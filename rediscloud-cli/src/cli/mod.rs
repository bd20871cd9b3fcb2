//! Command-line interface

pub mod commands;

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;
use commands::payload::{PayloadArgs, handle_payload_command};
use commands::payment_methods::{PaymentMethodsArgs, handle_payment_methods_command};
use commands::provision::{ProvisionArgs, handle_provision_command};
use commands::tfvars::{TfvarsArgs, handle_tfvars_command};

#[derive(Parser, Debug)]
#[command(name = "rediscloud-cli")]
#[command(about = "Turn Redis sizing sheets into Terraform variables and provision them on Redis Cloud")]
#[command(version)]
pub struct Cli {
    /// Settings file (default: <config dir>/rediscloud-cli/config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a Terraform variables file (and optional HCL snippet) from a sizing sheet
    Tfvars(TfvarsArgs),
    /// Write provisioning request JSON from a sizing sheet
    Payload(PayloadArgs),
    /// Create a subscription and its databases from a request or sizing sheet
    Provision(ProvisionArgs),
    /// List the account's payment methods
    PaymentMethods(PaymentMethodsArgs),
}

/// Misuse of the command line that clap cannot catch (exit status 2)
#[derive(Debug)]
pub struct UsageError {
    message: String,
}

impl UsageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UsageError {}

/// Process exit status for a failed command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<UsageError>().is_some() {
        2
    } else {
        1
    }
}

/// Dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Tfvars(args) => handle_tfvars_command(args),
        Commands::Payload(args) => handle_payload_command(args),
        Commands::Provision(args) => {
            let settings = Settings::load(cli.config.as_deref())?;
            handle_provision_command(args, &settings).await
        }
        Commands::PaymentMethods(args) => {
            let settings = Settings::load(cli.config.as_deref())?;
            handle_payment_methods_command(args, &settings).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_tfvars_defaults() {
        let cli = Cli::try_parse_from(["rediscloud-cli", "tfvars", "--input", "sizing.csv"]).unwrap();
        match cli.command {
            Commands::Tfvars(args) => {
                assert_eq!(args.out, PathBuf::from("terraform.auto.tfvars.json"));
                assert_eq!(args.precision, 3);
                assert!(args.emit_hcl.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_payload_defaults() {
        let cli = Cli::try_parse_from(["rediscloud-cli", "payload", "-i", "sizing.xlsx", "--sheet", "dbs"]).unwrap();
        match cli.command {
            Commands::Payload(args) => {
                assert_eq!(args.out_combined, PathBuf::from("redis_payloads.json"));
                assert_eq!(args.sheet.as_deref(), Some("dbs"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_provision_payload_and_sheet_conflict() {
        let result = Cli::try_parse_from([
            "rediscloud-cli",
            "provision",
            "--payload",
            "a.json",
            "--sheet",
            "b.csv",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_precision_is_bounded() {
        let parse = |precision: &str| {
            Cli::try_parse_from(["rediscloud-cli", "tfvars", "-i", "s.csv", "--precision", precision])
        };
        assert!(parse("9").is_ok());
        assert!(parse("10").is_err());
        assert!(parse("400").is_err());

        let provision = Cli::try_parse_from(["rediscloud-cli", "provision", "--sheet", "s.csv", "--precision", "12"]);
        assert!(provision.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["rediscloud-cli", "payment-methods", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_usage_errors_exit_with_two() {
        let usage: anyhow::Error = UsageError::new("no input").into();
        assert_eq!(exit_code(&usage), 2);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }
}
