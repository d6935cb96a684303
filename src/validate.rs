// Field validators. Each one is a pure predicate over the proposed input
// that either accepts it or explains why not; the prompt layer decides how
// to show the rejection.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Signature shared by every validator.
pub type Validator = fn(&str) -> Result<(), String>;

fn letters(input: &str, count: usize, what: &str) -> Result<(), String> {
    let trimmed = input.trim();
    if trimmed.chars().count() == count && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(())
    } else {
        Err(format!("{} must be exactly {} letters", what, count))
    }
}

/// ISO 3166 alpha-2 country code, e.g. `US`.
pub fn country_code(input: &str) -> Result<(), String> {
    letters(input, 2, "Country code")
}

/// ISO 4217 currency code, e.g. `USD`.
pub fn currency_code(input: &str) -> Result<(), String> {
    letters(input, 3, "Currency code")
}

pub fn required(input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        Err("A value is required".into())
    } else {
        Ok(())
    }
}

/// A positive whole number. `"20"` and `"20.0"` both pass.
pub fn whole_number(input: &str) -> Result<(), String> {
    parse_whole_number(input).map(|_| ())
}

/// Parse a quantity accepted by [`whole_number`].
pub fn parse_whole_number(input: &str) -> Result<u32, String> {
    let rejected = || format!("'{}' is not a whole number", input.trim());
    let value = Decimal::from_str(input.trim()).map_err(|_| rejected())?;
    if !value.fract().is_zero() {
        return Err(rejected());
    }
    let whole = value.to_u32().ok_or_else(rejected)?;
    if whole == 0 {
        return Err("Quantity must be at least 1".into());
    }
    Ok(whole)
}

/// A decimal amount that is zero or more, e.g. weights and values.
pub fn non_negative_decimal(input: &str) -> Result<(), String> {
    match Decimal::from_str(input.trim()) {
        Ok(value) if value.is_sign_negative() && !value.is_zero() => {
            Err("The amount cannot be negative".into())
        }
        Ok(_) => Ok(()),
        Err(_) => Err(format!("'{}' is not a decimal number", input.trim())),
    }
}
