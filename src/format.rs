//! USD formatting for the market-cap display

/// Render a USD market cap the way the ticker shows it: `$0` for unknown or
/// non-positive values, a truncated `$<N>k` form from 100k upward, and
/// comma-grouped whole dollars below that.
pub fn format_market_cap_usd(value: f64) -> String {
    if !value.is_finite() || value <= 0.0 {
        return "$0".to_string();
    }
    if value >= 100_000.0 {
        let thousands = (value / 1000.0).floor() as i64;
        return format!("${}k", thousands);
    }
    format!("${}", group_thousands(value.floor() as i64))
}

/// Comma-group a non-negative whole-dollar amount.
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_render_as_zero() {
        assert_eq!(format_market_cap_usd(0.0), "$0");
        assert_eq!(format_market_cap_usd(-5.0), "$0");
    }

    #[test]
    fn non_finite_degrades_to_zero() {
        assert_eq!(format_market_cap_usd(f64::NAN), "$0");
        assert_eq!(format_market_cap_usd(f64::INFINITY), "$0");
        assert_eq!(format_market_cap_usd(f64::NEG_INFINITY), "$0");
    }

    #[test]
    fn small_values_floor_to_grouped_dollars() {
        assert_eq!(format_market_cap_usd(1234.9), "$1,234");
        assert_eq!(format_market_cap_usd(7.0), "$7");
        assert_eq!(format_market_cap_usd(99_999.9), "$99,999");
    }

    #[test]
    fn compact_form_starts_at_one_hundred_thousand() {
        assert_eq!(format_market_cap_usd(100_000.0), "$100k");
        assert_eq!(format_market_cap_usd(123_456_789.0), "$123456k");
    }

    #[test]
    fn compact_form_truncates_rather_than_rounds() {
        assert_eq!(format_market_cap_usd(199_999.0), "$199k");
    }
}
