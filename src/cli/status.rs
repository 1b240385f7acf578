use crate::error::Result;
use crate::fmt::mask;
use crate::settings::{load_settings, settings_file_exists, settings_path, TOKEN_ENV};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = settings_path();

    println!("Settings:   {}", path.display());
    if !settings_file_exists() {
        println!("            (not found, using defaults; run `kassaflyt init`)");
    }
    println!(
        "Company:    {}",
        if settings.company_slug.is_empty() { "(not set)" } else { settings.company_slug.as_str() }
    );
    println!("API base:   {}", settings.api_base);

    let token = settings.token();
    let token_source = if std::env::var(TOKEN_ENV).map(|t| !t.trim().is_empty()).unwrap_or(false) {
        TOKEN_ENV
    } else {
        "settings"
    };
    if token.is_empty() {
        println!("API token:  (not set)");
    } else {
        println!("API token:  {} (from {token_source})", mask(&token));
    }

    println!("Bank:       {}", settings.bank_account);
    println!("Output dir: {}", settings.output_dir);
    println!(
        "Invoices:   {}",
        if settings.dedupe_invoices { "deduplicated" } else { "as booked" }
    );

    let rules = &settings.rules;
    println!();
    println!("Personnel accounts:  {}", join(rules.personnel_accounts.iter()));
    println!("Software accounts:   {}", join(rules.software_accounts.iter()));
    println!("Cancellation type:   {}", rules.cancellation_type);
    println!("Type mappings:");
    for (kind, category) in &rules.type_categories {
        match category {
            Some(c) => println!("  {kind:<32} {c}"),
            None => println!("  {kind:<32} (by accounts)"),
        }
    }

    Ok(())
}

fn join<'a>(items: impl Iterator<Item = &'a String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}
