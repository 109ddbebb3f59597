//! Number formatting shared by the terminal and image renderers.


/// Format an amount as whole reais with thousands separators, e.g. `R$ 1,234`.
///
/// The fractional part is truncated, matching how totals are displayed on tiles.
pub fn format_currency(amount: f64) -> String {
    let whole = amount.trunc() as i64;
    let sign = if whole < 0 { "-" } else { "" };
    format!("R$ {}{}", sign, group_thousands(whole.unsigned_abs()))
}


/// Format number with suffix.
pub fn format_compact(num: f64) -> String {
    let abs = num.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.1}B", num / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.1}M", num / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        format!("{}", num.trunc() as i64)
    }
}


/// Format a count with commas.
pub fn format_count(n: usize) -> String {
    group_thousands(n as u64)
}


fn group_thousands(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}


/// Truncate to `width` characters, never splitting a multi-byte character.
pub fn truncate_chars(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "R$ 0");
        assert_eq!(format_currency(100.0), "R$ 100");
        assert_eq!(format_currency(1234567.89), "R$ 1,234,567");
        assert_eq!(format_currency(-1500.5), "R$ -1,500");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(999.0), "999");
        assert_eq!(format_compact(1500.0), "1.5K");
        assert_eq!(format_compact(2_500_000.0), "2.5M");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("CALÇAS JEANS", 5), "CALÇA");
        assert_eq!(truncate_chars("TÊNIS", 10), "TÊNIS");
    }
}
