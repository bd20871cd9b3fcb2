use clap::Parser;
use colored::*;

use rediscloud_cli::cli::{self, Cli};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(err) = cli::run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        std::process::exit(cli::exit_code(&err));
    }
}
