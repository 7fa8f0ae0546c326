use alloy_primitives::U256;

use crate::ParseError;

/// Converts a decimal amount in display units into its integer base-unit
/// value (`"1.5"` with 18 decimals → `1500000000000000000`).
///
/// Rejects signs, exponents, empty parts and any fractional digit beyond
/// `decimals`, so the conversion is always exact.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, ParseError> {
    let invalid = || ParseError::InvalidAmount(amount.to_owned());
    let trimmed = amount.trim();

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(ParseError::PrecisionLoss {
            amount: amount.to_owned(),
            decimals,
        });
    }

    let mut digits = String::with_capacity(whole.len() + decimals as usize);
    digits.push_str(whole);
    digits.push_str(fraction);
    digits.extend(std::iter::repeat_n('0', decimals as usize - fraction.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }

    U256::from_str_radix(digits, 10).map_err(|_| ParseError::Overflow(amount.to_owned()))
}

/// Renders a base-unit value as a decimal display amount.
///
/// Trailing fractional zeros are dropped but one fractional digit is always
/// kept (`1000000` @ 6 → `"1.0"`, `2500000` @ 6 → `"2.5"`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let raw = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return format!("{raw}.0");
    }

    let padded = if raw.len() <= decimals {
        format!("{}{raw}", "0".repeat(decimals + 1 - raw.len()))
    } else {
        raw
    };

    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fractional_ether() {
        let value = parse_units("1.5", 18).unwrap();
        assert_eq!(value, U256::from(1_500_000_000_000_000_000_u128));
    }

    #[test]
    fn parses_whole_and_leading_dot_amounts() {
        assert_eq!(parse_units("2", 6).unwrap(), U256::from(2_000_000_u64));
        assert_eq!(parse_units(".25", 2).unwrap(), U256::from(25_u64));
        assert_eq!(parse_units("3.", 1).unwrap(), U256::from(30_u64));
    }

    #[test]
    fn zero_parses_to_zero() {
        assert_eq!(parse_units("0", 18).unwrap(), U256::ZERO);
        assert_eq!(parse_units("0.000", 18).unwrap(), U256::ZERO);
    }

    #[test]
    fn rejects_signs_and_garbage() {
        for input in ["-1", "+1", "1e18", "abc", "", ".", "1.2.3", " "] {
            assert!(parse_units(input, 18).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn rejects_precision_loss() {
        assert!(matches!(
            parse_units("0.1234567", 6),
            Err(ParseError::PrecisionLoss { decimals: 6, .. })
        ));
    }

    #[test]
    fn rejects_values_past_256_bits() {
        let huge = "9".repeat(80);
        assert!(matches!(parse_units(&huge, 0), Err(ParseError::Overflow(_))));
    }

    #[test]
    fn formats_token_balances() {
        assert_eq!(format_units(U256::from(2_500_000_u64), 6), "2.5");
        assert_eq!(format_units(U256::from(1_000_000_u64), 6), "1.0");
        assert_eq!(format_units(U256::from(5_u64), 6), "0.000005");
        assert_eq!(format_units(U256::ZERO, 18), "0.0");
        assert_eq!(format_units(U256::from(42_u64), 0), "42.0");
    }

    #[test]
    fn formats_with_decimals_wider_than_u256() {
        let formatted = format_units(U256::from(1_u64), 200);
        assert!(formatted.starts_with("0.000"));
        assert!(formatted.ends_with('1'));
        assert_eq!(formatted.len(), 202);
    }
}
