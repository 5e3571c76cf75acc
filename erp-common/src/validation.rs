//! Input validation helpers shared by the services.

use crate::error::{CoreError, CoreResult};

/// Reject empty or whitespace-only required string fields.
pub fn require_field(field: &'static str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Minimal shape check on an email address.
///
/// Accepts `local@domain.tld`, rejects whitespace and missing parts. Real
/// deliverability is not this layer's concern.
pub fn require_email(value: &str) -> CoreResult<()> {
    require_field("email", value)?;
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(CoreError::validation("Invalid email address"));
    }
    Ok(())
}

/// Quantities on order lines must be at least one.
pub fn require_positive_quantity(quantity: i64) -> CoreResult<()> {
    if quantity < 1 {
        return Err(CoreError::validation("Quantity must be at least 1"));
    }
    Ok(())
}

/// Stock counts may be zero but never negative.
pub fn require_non_negative_stock(stock: i64) -> CoreResult<()> {
    if stock < 0 {
        return Err(CoreError::validation("Stock cannot be negative"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_required_field() {
        assert!(require_field("name", "  ").is_err());
        assert!(require_field("name", "Acme").is_ok());
    }

    #[test]
    fn accepts_plain_email_shapes() {
        assert!(require_email("jane@example.com").is_ok());
        assert!(require_email("a.b+c@sub.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(require_email("").is_err());
        assert!(require_email("no-at-sign").is_err());
        assert!(require_email("@example.com").is_err());
        assert!(require_email("jane@nodot").is_err());
        assert!(require_email("jane doe@example.com").is_err());
        assert!(require_email("jane@.com").is_err());
    }

    #[test]
    fn quantity_must_be_positive() {
        assert!(require_positive_quantity(0).is_err());
        assert!(require_positive_quantity(-2).is_err());
        assert!(require_positive_quantity(1).is_ok());
    }

    #[test]
    fn stock_may_be_zero_but_not_negative() {
        assert!(require_non_negative_stock(0).is_ok());
        assert!(require_non_negative_stock(-1).is_err());
    }
}
