//! `tfvars`: sizing sheet → Terraform variables file

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::sizing::DEFAULT_SIZE_PRECISION;
use crate::types::MAX_SIZE_PRECISION;

pub use handler::handle_tfvars_command;

#[derive(Args, Debug, Clone)]
pub struct TfvarsArgs {
    /// Sizing sheet (CSV, XLSX, XLS, XLSM or ODS)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Worksheet name for Excel input (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Only keep rows whose `env` column matches
    #[arg(long)]
    pub env: Option<String>,

    /// Variables file to write
    #[arg(short, long, default_value = "terraform.auto.tfvars.json")]
    pub out: PathBuf,

    /// Also write an HCL snippet wiring resources to the variables
    #[arg(long, value_name = "FILE")]
    pub emit_hcl: Option<PathBuf>,

    /// Decimal places kept for dataset sizes before rounding to whole GB
    #[arg(
        long,
        default_value_t = DEFAULT_SIZE_PRECISION,
        value_parser = clap::value_parser!(u32).range(0..=MAX_SIZE_PRECISION as i64)
    )]
    pub precision: u32,
}
