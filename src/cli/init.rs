use std::io::Write;

use zeroize::Zeroize;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, TOKEN_ENV};

pub fn run(
    company: Option<String>,
    account: Option<String>,
    output_dir: Option<String>,
    api_base: Option<String>,
) -> Result<()> {
    let mut settings = load_settings();

    if let Some(slug) = company {
        settings.company_slug = slug.trim().to_string();
    } else if settings.company_slug.is_empty() {
        print!("Fiken company slug: ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        settings.company_slug = input.trim().to_string();
    }
    if let Some(code) = account {
        settings.bank_account = code.trim().to_string();
    }
    if let Some(dir) = output_dir {
        settings.output_dir = dir;
    }
    if let Some(base) = api_base {
        settings.api_base = base;
    }

    let mut token = rpassword::prompt_password(format!(
        "Fiken API token (blank keeps the current one; {TOKEN_ENV} overrides): "
    ))?;
    if !token.trim().is_empty() {
        settings.api_token = token.trim().to_string();
    }
    token.zeroize();

    save_settings(&settings)?;
    settings.api_token.zeroize();

    println!("Saved settings to {}", settings_path().display());
    Ok(())
}
