//! Number formatting shared by ledger values and the CLI.
//!
//! Quantities show at most two decimals with trailing zeros removed
//! (`9`, `1.5`, `0.33`); money always shows two decimals with thousands
//! separators (`1,500.00`).

/// Format a quantity with up to two decimals, dropping trailing zeros.
///
/// ```rust
/// use estimate_core::format::format_num;
///
/// assert_eq!(format_num(9.0), "9");
/// assert_eq!(format_num(1.5), "1.5");
/// assert_eq!(format_num(2.0 / 3.0), "0.67");
/// ```
pub fn format_num(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.2}", n);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Format a dollar amount with two decimals and comma thousands separators.
///
/// ```rust
/// use estimate_core::format::format_money;
///
/// assert_eq!(format_money(1500.0), "1,500.00");
/// assert_eq!(format_money(987654.321), "987,654.32");
/// ```
pub fn format_money(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let fixed = format!("{:.2}", n.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = n < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_num_integers() {
        assert_eq!(format_num(0.0), "0");
        assert_eq!(format_num(10.0), "10");
        assert_eq!(format_num(-0.0), "0");
        assert_eq!(format_num(3000.0), "3000");
    }

    #[test]
    fn test_format_num_fractions() {
        assert_eq!(format_num(1.2), "1.2");
        assert_eq!(format_num(0.75), "0.75");
        assert_eq!(format_num(1.0 / 3.0), "0.33");
        assert_eq!(format_num(10.000000000000002), "10");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(150.0), "150.00");
        assert_eq!(format_money(1500.0), "1,500.00");
        assert_eq!(format_money(1234567.5), "1,234,567.50");
        assert_eq!(format_money(-2400.0), "-2,400.00");
    }
}
