//! Number and quantity formatting for results and traces.

use crate::settings::NumberFormat;

/// Placeholder written for NaN and infinities
pub const INVALID: &str = "Invalid";

impl NumberFormat {
    /// Format `value` to the configured significant digits.
    ///
    /// ```rust
    /// use calc_core::settings::NumberFormat;
    ///
    /// let format = NumberFormat::default();
    /// assert_eq!(format.format(0.6666666666), "0.666667");
    /// assert_eq!(format.format(14_000.0), "14000");
    /// assert_eq!(format.format(2.5e-6), "2.5e-6");
    /// assert_eq!(format.format(f64::NAN), "Invalid");
    /// ```
    pub fn format(&self, value: f64) -> String {
        if !value.is_finite() {
            return INVALID.to_string();
        }
        if value == 0.0 {
            return "0".to_string();
        }

        let digits = self.significant_digits.clamp(1, 17);
        let scientific = format!("{:.*e}", digits - 1, value);
        let (mantissa, exponent) = match scientific.split_once('e') {
            Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
            None => return scientific,
        };

        // Thresholds apply to the value as it will be shown, after rounding
        let magnitude = scientific.parse::<f64>().unwrap_or(value).abs();
        if magnitude < self.scientific_below || magnitude >= self.scientific_at_or_above {
            return format!("{}e{}", trim_zeros(mantissa), exponent);
        }

        let decimals = (digits as i32 - 1 - exponent).max(0) as usize;
        let text = trim_zeros(&format!("{:.*}", decimals, value)).to_string();
        if text == "-0" {
            "0".to_string()
        } else {
            text
        }
    }

    /// Format `value` for substitution into an expression.
    ///
    /// Negative numbers are parenthesized so `a·b` stays readable.
    pub fn operand(&self, value: f64) -> String {
        let text = self.format(value);
        if text.starts_with('-') {
            format!("({})", text)
        } else {
            text
        }
    }

    /// Format `value` followed by `unit`. The dimensionless unit "1" is omitted.
    pub fn quantity(&self, value: f64, unit: &str) -> String {
        let text = self.format(value);
        if unit.is_empty() || unit == "1" {
            text
        } else {
            format!("{} {}", text, unit)
        }
    }
}

fn trim_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format() -> NumberFormat {
        NumberFormat::default()
    }

    #[test]
    fn test_fixed_notation_trims_zeros() {
        assert_eq!(format().format(8.0), "8");
        assert_eq!(format().format(751.8297), "751.83");
        assert_eq!(format().format(0.016955455), "0.0169555");
        assert_eq!(format().format(-2.0), "-2");
        assert_eq!(format().format(999_999.0), "999999");
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(format().format(1.0e6), "1e6");
        assert_eq!(format().format(1.234_567_8e7), "1.23457e7");
        assert_eq!(format().format(-3.3e-5), "-3.3e-5");
    }

    #[test]
    fn test_zero_and_negative_zero() {
        assert_eq!(format().format(0.0), "0");
        assert_eq!(format().format(-0.0), "0");
        assert_eq!(format().format(-1.0e-12 * 0.0), "0");
    }

    #[test]
    fn test_rounding_to_next_power() {
        assert_eq!(format().format(9.9999999), "10");
    }

    #[test]
    fn test_rounding_across_thresholds() {
        // rounds up into scientific range
        assert_eq!(format().format(999_999.7), "1e6");
        assert_eq!(format().format(-999_999.7), "-1e6");
        // rounds up out of it
        assert_eq!(format().format(9.999_999_6e-5), "0.0001");
    }

    #[test]
    fn test_non_finite_is_invalid() {
        assert_eq!(format().format(f64::INFINITY), INVALID);
        assert_eq!(format().format(f64::NAN), INVALID);
    }

    #[test]
    fn test_operand_parenthesizes_negatives() {
        assert_eq!(format().operand(-2.0), "(-2)");
        assert_eq!(format().operand(5.0), "5");
    }

    #[test]
    fn test_quantity_omits_dimensionless_unit() {
        assert_eq!(format().quantity(0.85, "1"), "0.85");
        assert_eq!(format().quantity(8.0, "V"), "8 V");
        assert_eq!(format().quantity(10.0, "°API"), "10 °API");
    }

    #[test]
    fn test_fewer_digits() {
        let format = NumberFormat {
            significant_digits: 3,
            ..Default::default()
        };
        assert_eq!(format.format(0.6666666), "0.667");
        assert_eq!(format.format(12345.0), "12345");
    }
}
