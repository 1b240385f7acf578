use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregate::{category_totals, Bucket, MonthlyReport};
use crate::cli::RunArgs;
use crate::engine::{bank_entries, Classification, Engine};
use crate::error::Result;
use crate::export;
use crate::fmt::money;
use crate::ledger::fiken::FikenClient;
use crate::ledger::snapshot::SnapshotLedger;
use crate::ledger::{DateWindow, Ledger};
use crate::models::Category;
use crate::resolver::ContextCache;
use crate::settings::{load_settings, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reports {
    Lines,
    Monthly,
    Both,
}

impl Reports {
    fn lines(self) -> bool {
        matches!(self, Self::Lines | Self::Both)
    }

    fn monthly(self) -> bool {
        matches!(self, Self::Monthly | Self::Both)
    }
}

fn effective_settings(args: &RunArgs) -> Settings {
    let mut settings = load_settings();
    if let Some(account) = &args.account {
        settings.bank_account = account.trim().to_string();
    }
    if let Some(company) = &args.company {
        settings.company_slug = company.clone();
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }
    if args.dedupe_invoices {
        settings.dedupe_invoices = true;
    }
    settings
}

fn open_ledger(args: &RunArgs, settings: &Settings) -> Result<Box<dyn Ledger>> {
    match &args.snapshot {
        Some(path) => Ok(Box::new(SnapshotLedger::load(Path::new(path))?)),
        None => Ok(Box::new(FikenClient::new(
            &settings.api_base,
            &settings.company_slug,
            &settings.token(),
        )?)),
    }
}

pub fn run(args: RunArgs, reports: Reports) -> Result<()> {
    let settings = effective_settings(&args);
    let window = DateWindow::parse(&args.from_date, &args.to_date)?;
    let ledger = open_ledger(&args, &settings)?;
    let bank = settings.bank_account.as_str();
    let out_dir = PathBuf::from(&settings.output_dir);

    let source = args.snapshot.as_deref().unwrap_or(&settings.company_slug);
    println!("Fetching journal entries for {source} {}..{} ...", window.from, window.to);
    let entries = ledger.list_journal_entries(&window)?;
    println!("Fetched {} journal entries.", entries.len());

    let filtered = bank_entries(&entries, bank);
    println!("Kept {} entries hitting account {bank}.", filtered.len());

    let engine = Engine::new(ledger.as_ref(), &settings.rules, bank)
        .with_invoice_dedupe(settings.dedupe_invoices)?;
    let mut cache = ContextCache::new();
    let mut last_pass: Option<Classification> = None;

    if reports.lines() {
        let pass = engine.classify(&filtered, &mut cache);
        let path = export::lines_path(&out_dir, &window);
        let written = export::write_lines_file(&pass.rows, &path)?;
        println!("Net report: Wrote {written} rows to {}", path.display());
        print_category_summary(&category_totals(&pass.rows));
        last_pass = Some(pass);
    }

    if reports.monthly() {
        let pass = engine.classify(&filtered, &mut cache);
        let report = MonthlyReport::from_rows(&pass.rows);
        let path = export::monthly_path(&out_dir, &window);
        let written = export::write_monthly_file(&report, &path)?;
        println!("Monthly analysis: Wrote {written} rows to {}", path.display());
        print_monthly_summary(&report);
        last_pass = Some(pass);
    }

    if let Some(pass) = &last_pass {
        print_exclusions(pass);
    }
    tracing::info!(fetches = cache.fetches(), "transaction lookups issued");
    Ok(())
}

fn net_cell(net: i64) -> Cell {
    if net >= 0 {
        Cell::new(money(net).green().to_string())
    } else {
        Cell::new(money(net).red().to_string())
    }
}

fn print_category_summary(totals: &[(Category, Bucket)]) {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Inflow", "Outflow", "Net", "Count"]);
    let mut total = Bucket::default();
    for (category, b) in totals {
        table.add_row(vec![
            Cell::new(category.label()),
            Cell::new(money(b.inflow)),
            Cell::new(money(b.outflow)),
            net_cell(b.net()),
            Cell::new(b.count),
        ]);
        total.inflow += b.inflow;
        total.outflow += b.outflow;
        total.count += b.count;
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(total.inflow)),
        Cell::new(money(total.outflow)),
        net_cell(total.net()),
        Cell::new(total.count),
    ]);
    println!("\nCash Flow Summary\n{table}");
}

fn print_monthly_summary(report: &MonthlyReport) {
    if report.is_empty() {
        println!("\nNo bank movements in this window.");
        return;
    }

    let mut header = vec!["Month".to_string()];
    header.extend(Category::ALL.iter().map(|c| c.label().to_string()));
    header.push("Total".to_string());

    let mut table = Table::new();
    table.set_header(header);
    for (month, buckets) in report.months() {
        let mut row = vec![Cell::new(month)];
        row.extend(buckets.iter().map(|b| net_cell(b.net())));
        row.push(net_cell(buckets.iter().map(Bucket::net).sum()));
        table.add_row(row);
    }

    let totals = report.category_totals();
    let mut row = vec![Cell::new("Total".bold())];
    row.extend(totals.iter().map(|b| net_cell(b.net())));
    row.push(net_cell(totals.iter().map(Bucket::net).sum()));
    table.add_row(row);

    println!("\nMonthly Cash Flow (net)\n{table}");
}

fn print_exclusions(pass: &Classification) {
    if pass.cancelled > 0 {
        println!("Excluded {} cancelled transactions.", pass.cancelled);
    }
    if pass.duplicate_invoices > 0 {
        println!("Dropped {} rows for repeated invoice numbers.", pass.duplicate_invoices);
    }
    if !pass.skipped.is_empty() {
        eprintln!(
            "{}",
            format!(
                "Warning: {} transactions could not be fetched and are missing from every total",
                pass.skipped.len()
            )
            .yellow()
        );
        for s in &pass.skipped {
            eprintln!("  transaction {}: {}", s.id, s.cause);
        }
    }
}
