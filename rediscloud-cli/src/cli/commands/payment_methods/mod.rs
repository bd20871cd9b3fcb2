//! `payment-methods`: list payment method ids for the account

pub mod handler;

use clap::Args;

pub use handler::handle_payment_methods_command;

#[derive(Args, Debug, Clone)]
pub struct PaymentMethodsArgs {
    /// Print the raw JSON entries instead of a table
    #[arg(long)]
    pub json: bool,
}
