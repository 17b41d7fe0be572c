//! Arbitrary-precision money helpers.
//!
//! Internal amounts are always `rust_decimal::Decimal`. Gateways speak in
//! minor currency units (kobo for NGN, cents for USD, ...); these helpers
//! are the only place that boundary conversion happens.

use rust_decimal::Decimal;

/// Number of minor-unit decimal places for a currency code.
///
/// Only the currencies this service actually routes through Paystack /
/// Flutterwave are listed; unknown codes default to 2 (the common case).
pub fn minor_unit_exponent(currency_code: &str) -> u32 {
    match currency_code.to_uppercase().as_str() {
        "JPY" | "KRW" => 0,
        _ => 2,
    }
}

/// Converts a decimal amount to the gateway's smallest integer unit.
///
/// `Decimal` doesn't expose a checked scale-shift, so this rescales to the
/// target exponent and reads the unscaled integer back out.
pub fn to_minor_units(amount: Decimal, currency_code: &str) -> i64 {
    let exponent = minor_unit_exponent(currency_code);
    let scaled = amount.round_dp(exponent) * Decimal::from(10u64.pow(exponent));
    scaled
        .trunc()
        .to_string()
        .parse::<i64>()
        .unwrap_or_default()
}

/// Converts a gateway minor-unit amount back to a decimal.
pub fn from_minor_units(minor: i64, currency_code: &str) -> Decimal {
    let exponent = minor_unit_exponent(currency_code);
    Decimal::from(minor) / Decimal::from(10u64.pow(exponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_ngn_to_kobo_and_back() {
        let amount = dec!(1000.00);
        let minor = to_minor_units(amount, "NGN");
        assert_eq!(minor, 100_000);
        assert_eq!(from_minor_units(minor, "NGN"), amount);
    }

    #[test]
    fn jpy_has_no_minor_unit() {
        let amount = dec!(500);
        assert_eq!(to_minor_units(amount, "JPY"), 500);
    }
}
