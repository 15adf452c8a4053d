//! Form validators.
//!
//! Pure functions that check and normalize user input before it reaches the
//! database. Each returns the cleaned value or an [`Error::Validation`] naming
//! the field, so the bot can echo a precise message back to the user.

use crate::errors::{Error, Result};

/// Largest single donation accepted
pub const MAX_DONATION: f64 = 1_000_000.0;
/// Smallest campaign target accepted
pub const MIN_TARGET: f64 = 1.0;
/// Longest donation message accepted
pub const MAX_MESSAGE_CHARS: usize = 500;

const MAX_EMAIL_CHARS: usize = 254;
const MIN_PASSWORD_CHARS: usize = 6;
const MAX_PASSWORD_CHARS: usize = 128;

/// Rounds a dollar amount to whole cents.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Checks an email address and returns it trimmed and lowercased.
pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();

    if email.is_empty() {
        return Err(Error::validation("email", "is required"));
    }
    if email.chars().count() > MAX_EMAIL_CHARS {
        return Err(Error::validation("email", "is too long"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(Error::validation("email", "must not contain spaces"));
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(Error::validation("email", "must contain exactly one '@'"));
    };

    if local.is_empty() {
        return Err(Error::validation("email", "is missing the name before '@'"));
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(Error::validation("email", "has an invalid domain"));
    }
    if domain.contains("..") {
        return Err(Error::validation("email", "has an invalid domain"));
    }

    Ok(email)
}

/// Checks password strength: 6 to 128 characters with at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(Error::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(Error::validation(
            "password",
            format!("must be at most {MAX_PASSWORD_CHARS} characters"),
        ));
    }
    if !password.chars().any(char::is_alphabetic) {
        return Err(Error::validation("password", "must contain a letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(Error::validation("password", "must contain a digit"));
    }
    Ok(())
}

/// Checks a donation amount and returns it rounded to cents.
pub fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount <= 0.0 || amount > MAX_DONATION {
        return Err(Error::InvalidAmount { amount });
    }

    let rounded = round_to_cents(amount);
    if rounded <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(rounded)
}

/// Checks a campaign target amount and returns it rounded to cents.
pub fn validate_target_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || amount < MIN_TARGET {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(round_to_cents(amount))
}

fn validate_length(field: &'static str, value: &str, min: usize, max: usize) -> Result<String> {
    let value = value.trim();
    let len = value.chars().count();
    if len < min {
        return Err(Error::validation(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if len > max {
        return Err(Error::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(value.to_string())
}

/// Checks a display name (2 to 50 characters after trimming).
pub fn validate_display_name(name: &str) -> Result<String> {
    validate_length("display name", name, 2, 50)
}

/// Checks a campaign title (3 to 100 characters after trimming).
pub fn validate_title(title: &str) -> Result<String> {
    validate_length("title", title, 3, 100)
}

/// Checks a campaign's one-line summary (at most 150 characters). Empty is allowed.
pub fn validate_summary(summary: &str) -> Result<String> {
    validate_length("short description", summary, 0, 150)
}

/// Checks a campaign description (at most 2000 characters). Empty is allowed.
pub fn validate_description(description: &str) -> Result<String> {
    validate_length("description", description, 0, 2000)
}

/// Trims an optional donation message; blank messages become `None`.
pub fn validate_message(message: Option<String>) -> Result<Option<String>> {
    let Some(message) = message else {
        return Ok(None);
    };
    let trimmed = message.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_MESSAGE_CHARS {
        return Err(Error::validation(
            "message",
            format!("must be at most {MAX_MESSAGE_CHARS} characters"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Matches a category against the configured list, case-insensitively.
///
/// Returns the canonical spelling from `allowed`. When `allowed` is empty any
/// non-blank category is accepted as typed.
pub fn validate_category(category: &str, allowed: &[String]) -> Result<String> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::validation("category", "is required"));
    }
    if allowed.is_empty() {
        return Ok(category.to_string());
    }

    allowed
        .iter()
        .find(|c| c.eq_ignore_ascii_case(category))
        .cloned()
        .ok_or_else(|| {
            Error::validation(
                "category",
                format!("'{category}' is not one of: {}", allowed.join(", ")),
            )
        })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_validate_email_normalizes() {
        assert_eq!(
            validate_email("  Jane.Doe@Example.ORG ").unwrap(),
            "jane.doe@example.org"
        );
    }

    #[test]
    fn test_validate_email_rejects_malformed() {
        for bad in [
            "",
            "plainaddress",
            "@example.com",
            "jane@",
            "jane@example",
            "jane@.example.com",
            "jane@example.com.",
            "jane@@example.com",
            "ja ne@example.com",
            "jane@exa..mple.com",
        ] {
            assert!(
                matches!(validate_email(bad), Err(Error::Validation { field: "email", .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_password_rules() {
        assert!(validate_password("abc123").is_ok());
        assert!(validate_password("abc12").is_err()); // too short
        assert!(validate_password("abcdefgh").is_err()); // no digit
        assert!(validate_password("12345678").is_err()); // no letter
        assert!(validate_password(&format!("a1{}", "x".repeat(127))).is_err()); // too long
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(25.0).unwrap(), 25.0);
        assert_eq!(validate_amount(10.006).unwrap(), 10.01);

        for bad in [0.0, -5.0, 0.001, f64::NAN, f64::INFINITY, MAX_DONATION + 1.0] {
            assert!(
                matches!(validate_amount(bad), Err(Error::InvalidAmount { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_target_amount() {
        assert_eq!(validate_target_amount(5000.0).unwrap(), 5000.0);
        assert!(validate_target_amount(0.5).is_err());
        assert!(validate_target_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_display_name_and_title() {
        assert_eq!(validate_display_name("  Sam  ").unwrap(), "Sam");
        assert!(validate_display_name("S").is_err());
        assert!(validate_display_name(&"x".repeat(51)).is_err());

        assert_eq!(validate_title("Clean Water").unwrap(), "Clean Water");
        assert!(validate_title("ab").is_err());
    }

    #[test]
    fn test_validate_message() {
        assert_eq!(validate_message(None).unwrap(), None);
        assert_eq!(validate_message(Some("   ".to_string())).unwrap(), None);
        assert_eq!(
            validate_message(Some(" Good luck! ".to_string())).unwrap(),
            Some("Good luck!".to_string())
        );
        assert!(validate_message(Some("x".repeat(MAX_MESSAGE_CHARS + 1))).is_err());
    }

    #[test]
    fn test_validate_category() {
        let allowed = vec!["Health".to_string(), "Education".to_string()];
        assert_eq!(validate_category("health", &allowed).unwrap(), "Health");
        assert!(validate_category("Sports", &allowed).is_err());
        assert!(validate_category("  ", &allowed).is_err());
        assert_eq!(validate_category("Sports", &[]).unwrap(), "Sports");
    }
}
