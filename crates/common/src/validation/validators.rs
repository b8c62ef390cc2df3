// Field Validators - Reusable validation components
use once_cell::sync::Lazy;
use regex::Regex;

/// Trait for field validators
pub trait FieldValidator<T: ?Sized> {
    /// Validate a field value
    fn validate(&self, value: &T) -> Result<(), String>;
}

/// String validator with length and emptiness constraints
#[derive(Debug, Clone, Default)]
pub struct StringValidator {
    min_length: Option<usize>,
    max_length: Option<usize>,
    not_empty: bool,
    trim: bool,
}

impl StringValidator {
    /// Create a new string validator (trims by default)
    #[must_use]
    pub fn new() -> Self {
        Self { min_length: None, max_length: None, not_empty: false, trim: true }
    }

    /// Require non-empty string
    #[must_use]
    pub fn not_empty(mut self) -> Self {
        self.not_empty = true;
        self
    }

    /// Set minimum length
    #[must_use]
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Set maximum length
    #[must_use]
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Disable trimming before validation
    #[must_use]
    pub fn no_trim(mut self) -> Self {
        self.trim = false;
        self
    }
}

impl FieldValidator<str> for StringValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let value = if self.trim { value.trim() } else { value };

        if self.not_empty && value.is_empty() {
            return Err("Value must not be empty".to_string());
        }

        let length = value.chars().count();

        if let Some(min) = self.min_length {
            if length < min {
                return Err(format!("Value must be at least {min} characters"));
            }
        }

        if let Some(max) = self.max_length {
            if length > max {
                return Err(format!("Value must not exceed {max} characters"));
            }
        }

        Ok(())
    }
}

// Deliberately loose: the provider does the authoritative check, this only
// catches obvious typos before a round-trip
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // Literal pattern, cannot fail at runtime
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
});

/// Email address validator (RFC-ish pattern match)
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailValidator;

impl EmailValidator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FieldValidator<str> for EmailValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        if EMAIL_PATTERN.is_match(value.trim()) {
            Ok(())
        } else {
            Err("Invalid email address".to_string())
        }
    }
}

/// Phone number validator: at least `min_digits` digits, punctuation
/// ignored
#[derive(Debug, Clone, Copy)]
pub struct PhoneValidator {
    min_digits: usize,
}

impl Default for PhoneValidator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PhoneValidator {
    #[must_use]
    pub fn new(min_digits: usize) -> Self {
        Self { min_digits }
    }
}

impl FieldValidator<str> for PhoneValidator {
    fn validate(&self, value: &str) -> Result<(), String> {
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if digits >= self.min_digits {
            Ok(())
        } else {
            Err(format!("Phone number must contain at least {} digits", self.min_digits))
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for validation::validators.
    use super::*;

    /// Validates `StringValidator` behavior for the length bounds scenario.
    ///
    /// Assertions:
    /// - Ensures a value inside the bounds passes.
    /// - Ensures values one below the minimum and one above the maximum
    ///   fail.
    #[test]
    fn test_string_length_bounds() {
        let validator = StringValidator::new().min_length(2).max_length(100);

        assert!(validator.validate("Jubal").is_ok());
        assert!(validator.validate("J").is_err());
        assert!(validator.validate(&"x".repeat(101)).is_err());
        assert!(validator.validate(&"x".repeat(100)).is_ok());
    }

    /// Validates `StringValidator` behavior for the trimming scenario.
    ///
    /// Assertions:
    /// - Ensures surrounding whitespace does not count toward length.
    #[test]
    fn test_string_validator_trims_by_default() {
        let validator = StringValidator::new().not_empty().min_length(2);
        assert!(validator.validate("   ").is_err());
        assert!(validator.validate("  ab  ").is_ok());
    }

    /// Validates `EmailValidator` behavior for the pattern scenario.
    ///
    /// Assertions:
    /// - Ensures plausible addresses pass and malformed ones fail.
    #[test]
    fn test_email_pattern() {
        let validator = EmailValidator::new();
        assert!(validator.validate("tyler@lodge.example.org").is_ok());
        assert!(validator.validate("no-at-sign").is_err());
        assert!(validator.validate("two@@example.org").is_err());
        assert!(validator.validate("missing@tld").is_err());
    }

    /// Validates `PhoneValidator` behavior for the digit count scenario.
    ///
    /// Assertions:
    /// - Ensures formatting characters are ignored when counting digits.
    #[test]
    fn test_phone_digit_count() {
        let validator = PhoneValidator::default();
        assert!(validator.validate("(555) 010-0100").is_ok());
        assert!(validator.validate("+1 555 010 0100").is_ok());
        assert!(validator.validate("555-0100").is_err());
    }
}
