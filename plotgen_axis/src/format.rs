// Copyright 2025 the Plotgen Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::format;
use alloc::string::String;

/// Significant digits used for tick labels.
pub const LABEL_PRECISION: usize = 14;

/// Formats `v` the way C's `%.*g` does.
///
/// Uses `precision` significant digits, drops trailing zeros, and switches
/// to scientific notation (`1.5e-05`, `1e+20`) when the decimal exponent is
/// below `-4` or at least `precision`.
#[must_use]
pub fn format_g(v: f64, precision: usize) -> String {
    if v == 0.0 {
        return String::from("0");
    }
    if !v.is_finite() {
        return format!("{v}");
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let p = i32::try_from(precision).unwrap_or(i32::MAX);
    if exp < -4 || exp >= p {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_zeros(mantissa), exp.unsigned_abs())
    } else {
        let decimals = usize::try_from(p - 1 - exp).unwrap_or(0);
        String::from(trim_zeros(&format!("{v:.decimals$}")))
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::{LABEL_PRECISION, format_g};

    #[test]
    fn fixed_notation_trims_zeros() {
        assert_eq!(format_g(0.1 + 0.2, LABEL_PRECISION), "0.3");
        assert_eq!(format_g(-2.5, LABEL_PRECISION), "-2.5");
        assert_eq!(format_g(123_456.0, LABEL_PRECISION), "123456");
        assert_eq!(format_g(0.0001, LABEL_PRECISION), "0.0001");
        assert_eq!(format_g(-0.0, LABEL_PRECISION), "0");
    }

    #[test]
    fn scientific_outside_range() {
        assert_eq!(format_g(1.5e-5, LABEL_PRECISION), "1.5e-05");
        assert_eq!(format_g(1e20, LABEL_PRECISION), "1e+20");
        assert_eq!(format_g(123_456.0, 3), "1.23e+05");
        assert_eq!(format_g(-3.25e-7, LABEL_PRECISION), "-3.25e-07");
    }
}
