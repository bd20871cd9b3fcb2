//! `payload`: sizing sheet → provisioning request JSON

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::sizing::DEFAULT_SIZE_PRECISION;
use crate::types::MAX_SIZE_PRECISION;

pub use handler::handle_payload_command;

#[derive(Args, Debug, Clone)]
pub struct PayloadArgs {
    /// Sizing sheet (CSV, XLSX, XLS, XLSM or ODS)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Worksheet name for Excel input (default: first sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Only keep rows whose `env` column matches
    #[arg(long)]
    pub env: Option<String>,

    /// Write the databases array on its own
    #[arg(long, value_name = "FILE")]
    pub out_databases: Option<PathBuf>,

    /// Write the subscription block (creation plan) on its own
    #[arg(long, value_name = "FILE")]
    pub out_subscription: Option<PathBuf>,

    /// Combined request consumed by `provision`
    #[arg(long, value_name = "FILE", default_value = "redis_payloads.json")]
    pub out_combined: PathBuf,

    /// Decimal places kept for dataset sizes
    #[arg(
        long,
        default_value_t = DEFAULT_SIZE_PRECISION,
        value_parser = clap::value_parser!(u32).range(0..=MAX_SIZE_PRECISION as i64)
    )]
    pub precision: u32,
}
