mod aggregate;
mod classifier;
mod cli;
mod engine;
mod error;
mod export;
mod fmt;
mod ledger;
mod models;
mod resolver;
mod settings;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::analyze::Reports;
use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            company,
            account,
            output_dir,
            api_base,
        } => cli::init::run(company, account, output_dir, api_base),
        Commands::Status => cli::status::run(),
        Commands::Analyze(args) => cli::analyze::run(args, Reports::Both),
        Commands::Lines(args) => cli::analyze::run(args, Reports::Lines),
        Commands::Monthly(args) => cli::analyze::run(args, Reports::Monthly),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
