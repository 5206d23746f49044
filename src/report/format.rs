/// Insert a comma every three digits of an unsigned digit string
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

/// Two decimal places with thousands separators, no sign
fn format_magnitude(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    format!("{}.{frac}", group_digits(whole))
}

/// Statement amount: `₦1,234.50`, deductions in parentheses `(₦1,234.50)`
pub fn format_money(value: f64, currency_symbol: &str) -> String {
    let magnitude = format_magnitude(value);
    if value < 0.0 && magnitude != "0.00" {
        format!("({currency_symbol}{magnitude})")
    } else {
        format!("{currency_symbol}{magnitude}")
    }
}

/// Ledger amount with the sign spelled out: `+₦450,000.00` / `-₦120,000.00`
pub fn format_signed(value: f64, currency_symbol: &str) -> String {
    let sign = if value < 0.0 { '-' } else { '+' };
    format!("{sign}{currency_symbol}{}", format_magnitude(value))
}
