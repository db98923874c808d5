pub mod table;
pub mod page;
pub mod errors;
pub mod ratelimit;
pub mod cg_ratelimit;
pub mod encryption;
pub mod view;

pub use table::Table;
pub use page::Page;
pub use errors::extract_clean_error;
pub use ratelimit::{check_cooldown, check_global_rate_limit, get_cooldown_seconds};

/// Group an integer string with thousands separators
fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// USD amount with thousands separators; sub-dollar prices keep more precision
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "N/A".to_string();
    }

    let decimals = if amount.abs() >= 1.0 || amount == 0.0 { 2 } else { 6 };
    let formatted = format!("{:.*}", decimals, amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), ""));
    let sign = if amount < 0.0 { "-" } else { "" };

    if fraction.is_empty() {
        format!("{}${}", sign, group_thousands(whole))
    } else {
        format!("{}${}.{}", sign, group_thousands(whole), fraction)
    }
}

/// Signed percentage with two decimals, e.g. `+1.25%`
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    format!("{:+.2}%", value)
}
