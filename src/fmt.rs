/// Render øre as kroner with two decimals and no grouping: 2500.75
pub fn major(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Render øre as a kroner amount with thousands separators: kr 1,234.56
pub fn money(minor: i64) -> String {
    let negative = minor < 0;
    let abs = minor.unsigned_abs();
    let int_part = (abs / 100).to_string();
    let dec_part = abs % 100;

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-kr {with_commas}.{dec_part:02}")
    } else {
        format!("kr {with_commas}.{dec_part:02}")
    }
}

/// Show only the last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}
