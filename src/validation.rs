use iso_currency::Currency;
use rust_decimal::Decimal;
use validator::ValidationError;

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Validates that a currency code is a valid ISO 4217 currency code
pub fn validate_currency_code(code: &str) -> Result<(), ValidationError> {
    Currency::from_code(code).ok_or_else(|| {
        let mut error = ValidationError::new("invalid_currency");
        error.message = Some(format!("'{}' is not a valid ISO 4217 currency code", code).into());
        error
    })?;
    Ok(())
}

/// Upper bound (exclusive) for a stored invoice amount; the column is NUMERIC(14,2)
pub const MAX_INVOICE_AMOUNT: i64 = 1_000_000_000_000;

/// Validates that an invoice amount is not negative and fits the storage column
pub fn validate_invoice_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid("invalid_amount", "Amount must be 0 or greater"));
    }
    if *amount >= Decimal::from(MAX_INVOICE_AMOUNT) {
        return Err(invalid(
            "invalid_amount",
            "Amount must be less than 1000000000000",
        ));
    }
    Ok(())
}

/// Validates that a name has at least one non-whitespace character
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "Value must not be blank"));
    }
    Ok(())
}
