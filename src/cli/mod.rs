pub mod analyze;
pub mod init;
pub mod status;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "kassaflyt",
    about = "Categorized cash-flow reports for one Fiken bank account."
)]
pub struct Cli {
    /// Log progress (same as RUST_LOG=info)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save company, bank account and API token to the settings file.
    Init {
        /// Fiken company slug, e.g. 'acme-as'
        #[arg(long)]
        company: Option<String>,
        /// Bank account code to analyze, e.g. '1920:10001'
        #[arg(long)]
        account: Option<String>,
        /// Directory for CSV reports
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Fiken API base URL
        #[arg(long = "api-base")]
        api_base: Option<String>,
    },
    /// Show the effective settings.
    Status,
    /// Write the line report and the monthly report, and print both summaries.
    Analyze(RunArgs),
    /// Write the line-level report and print the per-category summary.
    Lines(RunArgs),
    /// Write the month × category report and print the monthly summary.
    Monthly(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Start date: YYYY-MM-DD (inclusive)
    #[arg(long = "from")]
    pub from_date: String,
    /// End date: YYYY-MM-DD (inclusive)
    #[arg(long = "to")]
    pub to_date: String,
    /// Bank account code (overrides settings)
    #[arg(long)]
    pub account: Option<String>,
    /// Fiken company slug (overrides settings)
    #[arg(long)]
    pub company: Option<String>,
    /// Directory for CSV reports (overrides settings)
    #[arg(long = "output-dir")]
    pub output_dir: Option<String>,
    /// Read journal entries and transactions from a JSON snapshot instead of the API
    #[arg(long)]
    pub snapshot: Option<String>,
    /// Report each invoice number found in descriptions only once
    #[arg(long = "dedupe-invoices")]
    pub dedupe_invoices: bool,
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
    fn test_analyze_args() {
        let cli = Cli::try_parse_from([
            "kassaflyt", "analyze", "--from", "2025-10-01", "--to", "2025-10-31", "--account", "1920:20002",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.from_date, "2025-10-01");
                assert_eq!(args.account.as_deref(), Some("1920:20002"));
                assert!(!args.dedupe_invoices);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_window_is_required() {
        assert!(Cli::try_parse_from(["kassaflyt", "lines", "--from", "2025-10-01"]).is_err());
    }
}
