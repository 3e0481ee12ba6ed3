//! Display formatting for prices, percentages and volumes

/// Price with precision scaled to its magnitude
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "N/A".to_string();
    }
    if price < 0.01 {
        format!("${:.8}", price)
    } else if price < 1.0 {
        format!("${:.4}", price)
    } else if price < 1000.0 {
        format!("${:.2}", price)
    } else {
        format!("${}", group_thousands(price.round() as i64))
    }
}

/// Signed percentage with a direction marker
pub fn format_percentage(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    if value > 0.0 {
        format!("📈 +{:.2}%", value)
    } else if value < 0.0 {
        format!("📉 {:.2}%", value)
    } else {
        format!("➡️ {:.2}%", value)
    }
}

/// Large amount with a T/B/M/K suffix
pub fn format_number(num: f64) -> String {
    if !num.is_finite() {
        return "N/A".to_string();
    }
    if num >= 1e12 {
        format!("${:.2}T", num / 1e12)
    } else if num >= 1e9 {
        format!("${:.2}B", num / 1e9)
    } else if num >= 1e6 {
        format!("${:.2}M", num / 1e6)
    } else if num >= 1e3 {
        format!("${:.2}K", num / 1e3)
    } else {
        format!("${:.2}", num)
    }
}

/// Dollar price for a single quote; sub-dollar coins keep their
/// significant digits
pub fn format_quote_price(price: f64) -> String {
    if price > 0.0 && price < 1.0 {
        format_price(price)
    } else if price.is_finite() {
        format!("${}", format_amount(price))
    } else {
        "N/A".to_string()
    }
}

/// Two-decimal amount with thousands separators, e.g. `65,000.50`
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return "N/A".to_string();
    }
    let cents = (value.abs() * 100.0).round() as i64;
    let sign = if value < 0.0 && cents != 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

fn group_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
