//! Display helpers shared by the booking and court views.

use chrono::{DateTime, Utc};

/// Formats an amount as US dollars: `$1,234.50`, `-$3.00`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}${grouped}.{cents}")
}

/// Returns the hours between `start` and `end`, rounded to one decimal.
///
/// Negative when `end` is before `start`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn calculate_duration(start: &DateTime<Utc>, end: &DateTime<Utc>) -> f64 {
    let hours = (*end - *start).num_milliseconds() as f64 / 3_600_000.0;
    (hours * 10.0).round() / 10.0
}

/// Formats a 10-digit phone number as `(XXX) XXX-XXXX`.
///
/// Non-digits are ignored when counting. Anything that does not have exactly
/// ten digits is returned unchanged.
#[must_use]
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 10 {
        return phone.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(25.5), "$25.50");
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_currency(-3.0), "-$3.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
    }

    #[test]
    fn test_calculate_duration_rounds_to_one_decimal() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

        let end = Utc.with_ymd_and_hms(2024, 6, 1, 11, 30, 0).unwrap();
        assert!((calculate_duration(&start, &end) - 1.5).abs() < f64::EPSILON);

        let end = Utc.with_ymd_and_hms(2024, 6, 1, 10, 20, 0).unwrap();
        assert!((calculate_duration(&start, &end) - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_phone_number() {
        assert_eq!(format_phone_number("5551234567"), "(555) 123-4567");
        assert_eq!(format_phone_number("555-123-4567"), "(555) 123-4567");
        assert_eq!(format_phone_number("+1 555 123 4567"), "+1 555 123 4567");
        assert_eq!(format_phone_number("12345"), "12345");
    }
}
