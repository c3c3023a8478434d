/// Formats a price as `1,234,567.89` (two decimals, comma thousands separator).
pub fn format_rupiah(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rupiah() {
        assert_eq!(format_rupiah(0.0), "0.00");
        assert_eq!(format_rupiah(999.5), "999.50");
        assert_eq!(format_rupiah(1000.0), "1,000.00");
        assert_eq!(format_rupiah(1_234_567.891), "1,234,567.89");
        assert_eq!(format_rupiah(2_990_000_000.0), "2,990,000,000.00");
        assert_eq!(format_rupiah(-15_000.0), "-15,000.00");
    }
}
