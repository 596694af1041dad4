//! Brazilian Portuguese number formatting for popups, metrics and leaderboards.

/// `1234567.891` → `"1.234.567,891"`. At most three fraction digits,
/// trailing zeros dropped, `.` groups thousands.
pub fn format_pt_br(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let scaled = (value.abs() * 1000.0).round() as u128;
    let int_part = scaled / 1000;
    let frac_part = scaled % 1000;

    let mut out = String::new();
    if value < 0.0 && scaled != 0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if frac_part != 0 {
        let frac = format!("{frac_part:03}");
        out.push(',');
        out.push_str(frac.trim_end_matches('0'));
    }
    out
}

/// Rounds to an integer and groups thousands: `1234567.6` → `"1.234.568"`.
pub fn format_integer(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = group_thousands(rounded.abs() as u128);
    if rounded < 0.0 {
        format!("-{digits}")
    } else {
        digits
    }
}

/// `R$ 1.234,5 mil`
pub fn format_currency_thousands(value: f64) -> String {
    format!("R$ {} mil", format_pt_br(value))
}

/// Whole percent of a [0, 1] share: `0.456` → `"46"`.
pub fn format_percent(share: f64) -> String {
    format!("{}", (share * 100.0).round() as i64)
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pt_br_grouping_and_decimals() {
        assert_eq!(format_pt_br(0.0), "0");
        assert_eq!(format_pt_br(999.0), "999");
        assert_eq!(format_pt_br(1000.0), "1.000");
        assert_eq!(format_pt_br(1234567.891), "1.234.567,891");
        assert_eq!(format_pt_br(12.5), "12,5");
        assert_eq!(format_pt_br(0.12345), "0,123");
        assert_eq!(format_pt_br(-2500.25), "-2.500,25");
    }

    #[test]
    fn integer_rounds_half_away_from_zero() {
        assert_eq!(format_integer(1234567.6), "1.234.568");
        assert_eq!(format_integer(2.5), "3");
        assert_eq!(format_integer(0.4), "0");
        assert_eq!(format_integer(-1500.0), "-1.500");
    }

    #[test]
    fn currency_and_percent() {
        assert_eq!(format_currency_thousands(15300.0), "R$ 15.300 mil");
        assert_eq!(format_percent(1.0), "100");
        assert_eq!(format_percent(0.456), "46");
        assert_eq!(format_percent(1.5), "150");
    }
}
