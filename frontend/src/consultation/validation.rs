use once_cell::sync::Lazy;
use regex::Regex;

use crate::consultation::errors::FieldError;
use crate::consultation::fields::{FieldKind, FieldSpec};
use crate::consultation::session::FieldValue;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d\s\-\+\(\)]+$").expect("phone pattern compiles"));

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationResult {
    pub field_name: String,
    pub is_valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    pub fn valid(field: &str) -> Self {
        Self {
            field_name: field.to_string(),
            is_valid: true,
            message: None,
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            field_name: field.to_string(),
            is_valid: false,
            message: Some(message.into()),
        }
    }

    pub fn into_result(self) -> Result<(), FieldError> {
        if self.is_valid {
            Ok(())
        } else {
            Err(FieldError::new(
                self.field_name,
                self.message.unwrap_or_else(|| "Invalid value".to_string()),
            ))
        }
    }
}

/// Field-level rule checks. `required` is the effective requiredness,
/// which may differ from `field.required` for conditional fields.
pub trait Validator {
    fn validate(&self, field: &FieldSpec, value: Option<&FieldValue>, required: bool) -> ValidationResult;
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone) && phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10
}

/// The site's standard rules: required, length bounds, email, phone and select options.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleValidator;

impl Validator for RuleValidator {
    fn validate(&self, field: &FieldSpec, value: Option<&FieldValue>, required: bool) -> ValidationResult {
        let name = field.name;

        if field.kind == FieldKind::Checkbox {
            let checked = value.map_or(false, FieldValue::is_checked);
            return if required && !checked {
                ValidationResult::invalid(name, "This field is required")
            } else {
                ValidationResult::valid(name)
            };
        }

        let text = value.map(FieldValue::as_text).unwrap_or("").trim();
        if text.is_empty() {
            return if required {
                ValidationResult::invalid(name, "This field is required")
            } else {
                ValidationResult::valid(name)
            };
        }

        let len = text.chars().count();
        if let Some(min) = field.min_len {
            if len < min {
                return ValidationResult::invalid(name, format!("Minimum {} characters required", min));
            }
        }
        if let Some(max) = field.max_len {
            if len > max {
                return ValidationResult::invalid(name, format!("Maximum {} characters allowed", max));
            }
        }

        match field.kind {
            FieldKind::Email if !is_valid_email(text) => {
                ValidationResult::invalid(name, "Please enter a valid email address")
            }
            FieldKind::Phone if !is_valid_phone(text) => {
                ValidationResult::invalid(name, "Please enter a valid phone number")
            }
            FieldKind::Select if !field.allows_option(text) => {
                ValidationResult::invalid(name, "Please choose a valid option")
            }
            _ => ValidationResult::valid(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(field: &FieldSpec, value: &str) -> ValidationResult {
        RuleValidator.validate(field, Some(&FieldValue::text(value)), field.required)
    }

    #[test]
    fn test_email_rules() {
        let email = FieldSpec::new("email", "Email", FieldKind::Email).required();
        assert!(check(&email, "ana@x.com").is_valid);

        let result = check(&email, "not-an-email");
        assert!(!result.is_valid);
        assert_eq!(result.message.as_deref(), Some("Please enter a valid email address"));

        let result = check(&email, "   ");
        assert_eq!(result.message.as_deref(), Some("This field is required"));
    }

    #[test]
    fn test_phone_needs_ten_digits() {
        assert!(is_valid_phone("+1 (555) 123-4567"));
        assert!(!is_valid_phone("555-1234"));
        assert!(!is_valid_phone("call me maybe"));
    }

    #[test]
    fn test_optional_empty_field_passes() {
        let phone = FieldSpec::new("phone", "Phone", FieldKind::Phone);
        assert!(RuleValidator.validate(&phone, None, false).is_valid);
        assert!(!check(&phone, "12").is_valid);
    }

    #[test]
    fn test_length_bounds() {
        let audience = FieldSpec::new("target-audience", "Audience", FieldKind::TextArea)
            .min_len(3)
            .max_len(5);
        assert_eq!(
            check(&audience, "ab").message.as_deref(),
            Some("Minimum 3 characters required")
        );
        assert_eq!(
            check(&audience, "abcdef").message.as_deref(),
            Some("Maximum 5 characters allowed")
        );
        assert!(check(&audience, "abcd").is_valid);
    }

    #[test]
    fn test_select_must_match_option() {
        let budget = FieldSpec::new("budget-range", "Budget", FieldKind::Select)
            .required()
            .options(&[("5k-10k", "$5k-$10k")]);
        assert!(check(&budget, "5k-10k").is_valid);
        assert!(!check(&budget, "15k-25k").is_valid);
    }

    #[test]
    fn test_required_checkbox() {
        let consent = FieldSpec::new("privacy-consent", "Consent", FieldKind::Checkbox).required();
        let result = RuleValidator.validate(&consent, Some(&FieldValue::Flag(false)), true);
        assert!(!result.is_valid);
        assert!(RuleValidator.validate(&consent, Some(&FieldValue::Flag(true)), true).is_valid);
    }

    #[test]
    fn test_into_result_carries_message() {
        let err = ValidationResult::invalid("email", "bad").into_result().unwrap_err();
        assert_eq!(err, FieldError::new("email", "bad"));
    }
}
