//! `provision`: run the subscription + databases workflow

pub mod handler;

use std::path::PathBuf;

use clap::Args;

use crate::api::SubscriptionShape;
use crate::sizing::DEFAULT_SIZE_PRECISION;
use crate::types::MAX_SIZE_PRECISION;

pub use handler::{handle_provision_command, read_request};

#[derive(Args, Debug, Clone)]
pub struct ProvisionArgs {
    /// Combined request JSON (as written by `payload`); read from stdin when omitted
    #[arg(long, value_name = "FILE", conflicts_with = "sheet")]
    pub payload: Option<PathBuf>,

    /// Build the request straight from a sizing sheet
    #[arg(long, value_name = "FILE")]
    pub sheet: Option<PathBuf>,

    /// Worksheet name when --sheet is an Excel file
    #[arg(long, requires = "sheet")]
    pub sheet_name: Option<String>,

    /// Decimal places kept for dataset sizes when reading --sheet
    #[arg(
        long,
        default_value_t = DEFAULT_SIZE_PRECISION,
        value_parser = clap::value_parser!(u32).range(0..=MAX_SIZE_PRECISION as i64)
    )]
    pub precision: u32,

    /// Subscription request shape (overrides settings)
    #[arg(long, value_enum)]
    pub shape: Option<ShapeArg>,
}

/// CLI spelling of [`SubscriptionShape`]
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeArg {
    CreationPlan,
    DatabasesInline,
}

impl From<ShapeArg> for SubscriptionShape {
    fn from(arg: ShapeArg) -> Self {
        match arg {
            ShapeArg::CreationPlan => SubscriptionShape::CreationPlan,
            ShapeArg::DatabasesInline => SubscriptionShape::DatabasesInline,
        }
    }
}
