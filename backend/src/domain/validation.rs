//! Field-level validation for user input.
//!
//! Every validator returns a [`ValidationResult`] value; nothing here panics
//! or returns `Err`, so form layers can render the outcome directly next to
//! the offending field.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::ValidationResult;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_AMOUNT: f64 = 999_999_999.0;
pub const MIN_YEAR: i32 = 2000;
pub const MAX_YEAR: i32 = 2100;
pub const MAX_SANITIZED_LENGTH: usize = 500;

static MONTH_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("month pattern is valid"));

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Raw numeric input: either typed text or an already numeric value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericInput<'a> {
    Text(&'a str),
    Number(f64),
}

impl NumericInput<'_> {
    /// Finite value, or `None` when the input is not a usable number
    pub fn parse(&self) -> Option<f64> {
        let value = match self {
            NumericInput::Text(text) => text.trim().parse::<f64>().ok()?,
            NumericInput::Number(value) => *value,
        };
        value.is_finite().then_some(value)
    }
}

impl<'a> From<&'a str> for NumericInput<'a> {
    fn from(text: &'a str) -> Self {
        NumericInput::Text(text)
    }
}

impl<'a> From<&'a String> for NumericInput<'a> {
    fn from(text: &'a String) -> Self {
        NumericInput::Text(text.as_str())
    }
}

impl From<f64> for NumericInput<'_> {
    fn from(value: f64) -> Self {
        NumericInput::Number(value)
    }
}

/// Name of an income, expense or envelope
pub fn validate_name(name: &str) -> ValidationResult {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return ValidationResult::invalid("Name cannot be empty");
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return ValidationResult::invalid(format!(
            "Name cannot exceed {} characters",
            MAX_NAME_LENGTH
        ));
    }
    ValidationResult::ok()
}

pub fn validate_amount<'a>(amount: impl Into<NumericInput<'a>>) -> ValidationResult {
    let Some(amount) = amount.into().parse() else {
        return ValidationResult::invalid("Amount must be a valid number");
    };
    if amount < 0.0 {
        return ValidationResult::invalid("Amount cannot be negative");
    }
    if amount > MAX_AMOUNT {
        return ValidationResult::invalid("Amount is too large");
    }
    ValidationResult::ok()
}

pub fn validate_percentage<'a>(percentage: impl Into<NumericInput<'a>>) -> ValidationResult {
    let Some(percentage) = percentage.into().parse() else {
        return ValidationResult::invalid("Percentage must be a valid number");
    };
    if percentage < 0.0 {
        return ValidationResult::invalid("Percentage cannot be negative");
    }
    if percentage > 100.0 {
        return ValidationResult::invalid("Percentage cannot exceed 100%");
    }
    ValidationResult::ok()
}

/// True when `month` has the `YYYY-MM` shape; ranges are not checked
pub fn is_month_format(month: &str) -> bool {
    MONTH_PATTERN.is_match(month)
}

/// Plan month in `YYYY-MM` form
pub fn validate_month(month: &str) -> ValidationResult {
    if !is_month_format(month) {
        return ValidationResult::invalid("Invalid month format (expected YYYY-MM)");
    }

    let year: i32 = month.get(..4).and_then(|y| y.parse().ok()).unwrap_or_default();
    let month_number: u32 = month.get(5..).and_then(|m| m.parse().ok()).unwrap_or_default();

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return ValidationResult::invalid("Invalid year");
    }
    if !(1..=12).contains(&month_number) {
        return ValidationResult::invalid("Invalid month (1-12)");
    }
    ValidationResult::ok()
}

pub fn validate_email(email: &str) -> ValidationResult {
    if email.trim().is_empty() {
        return ValidationResult::invalid("Email cannot be empty");
    }
    if !EMAIL_PATTERN.is_match(email) {
        return ValidationResult::invalid("Invalid email format");
    }
    ValidationResult::ok()
}

/// Check that a list of percentages adds up to 100 within `tolerance`
pub fn validate_total_percentage(percentages: &[f64], tolerance: f64) -> ValidationResult {
    let total: f64 = percentages.iter().sum();
    if (total - 100.0).abs() > tolerance {
        return ValidationResult::invalid(format!(
            "Percentages must add up to 100% (currently: {:.1}%)",
            total
        ));
    }
    ValidationResult::ok()
}

pub fn validate_not_empty<T>(items: &[T], item_name: &str) -> ValidationResult {
    if items.is_empty() {
        return ValidationResult::invalid(format!("At least one {} is required", item_name));
    }
    ValidationResult::ok()
}

/// Merge several results; failures are joined with `, `
pub fn validate_multiple<I>(results: I) -> ValidationResult
where
    I: IntoIterator<Item = ValidationResult>,
{
    let errors: Vec<String> = results
        .into_iter()
        .filter(|result| !result.valid)
        .filter_map(|result| result.error)
        .collect();

    if errors.is_empty() {
        ValidationResult::ok()
    } else {
        ValidationResult::invalid(errors.join(", "))
    }
}

/// Trim, drop angle brackets and cap the length of free text
pub fn sanitize_string(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_SANITIZED_LENGTH)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Salaire").valid);
        assert!(validate_name("  Loyer  ").valid);
        assert_eq!(
            validate_name("   ").error.as_deref(),
            Some("Name cannot be empty")
        );

        let long_name = "x".repeat(51);
        let result = validate_name(&long_name);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("50"));

        assert!(validate_name(&"é".repeat(50)).valid);
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("2500").valid);
        assert!(validate_amount(" 12.5 ").valid);
        assert!(validate_amount(0.0).valid);
        assert!(validate_amount(999_999_999.0).valid);

        assert_eq!(
            validate_amount("abc").error.as_deref(),
            Some("Amount must be a valid number")
        );
        assert_eq!(
            validate_amount(-1.0).error.as_deref(),
            Some("Amount cannot be negative")
        );
        assert_eq!(
            validate_amount(1_000_000_000.0).error.as_deref(),
            Some("Amount is too large")
        );
        assert!(!validate_amount(f64::NAN).valid);
        assert!(!validate_amount("inf").valid);
    }

    #[test]
    fn test_validate_percentage() {
        assert!(validate_percentage("0").valid);
        assert!(validate_percentage(100.0).valid);
        assert!(validate_percentage("33.33").valid);

        assert!(!validate_percentage("").valid);
        assert_eq!(
            validate_percentage(-0.5).error.as_deref(),
            Some("Percentage cannot be negative")
        );
        assert_eq!(
            validate_percentage("100.01").error.as_deref(),
            Some("Percentage cannot exceed 100%")
        );
    }

    #[test]
    fn test_validate_month() {
        assert!(validate_month("2025-01").valid);
        assert!(validate_month("2000-12").valid);
        assert!(validate_month("2100-06").valid);

        assert_eq!(
            validate_month("2025-1").error.as_deref(),
            Some("Invalid month format (expected YYYY-MM)")
        );
        assert!(!validate_month("202501").valid);
        assert_eq!(validate_month("1999-05").error.as_deref(), Some("Invalid year"));
        assert_eq!(validate_month("2101-05").error.as_deref(), Some("Invalid year"));
        assert_eq!(
            validate_month("2025-13").error.as_deref(),
            Some("Invalid month (1-12)")
        );
        assert!(!validate_month("2025-00").valid);
    }

    #[test]
    fn test_validate_month_rejects_non_ascii_digits() {
        assert!(!is_month_format("٢٠٢٤-٠١"));
        assert_eq!(
            validate_month("१२३४-०१").error.as_deref(),
            Some("Invalid month format (expected YYYY-MM)")
        );
        assert!(!validate_month("２０２５-０１").valid);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("jean.dupont@example.fr").valid);

        assert_eq!(validate_email("  ").error.as_deref(), Some("Email cannot be empty"));
        assert_eq!(
            validate_email("jean.dupont@example").error.as_deref(),
            Some("Invalid email format")
        );
        assert!(!validate_email("jean dupont@example.fr").valid);
        assert!(!validate_email("@example.fr").valid);
    }

    #[test]
    fn test_validate_total_percentage() {
        assert!(validate_total_percentage(&[40.0, 30.0, 30.0], 0.01).valid);

        let result = validate_total_percentage(&[50.0, 60.0], 0.01);
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("110.0%"));
    }

    #[test]
    fn test_validate_multiple_joins_messages() {
        let result = validate_multiple([
            validate_name(""),
            validate_amount("12"),
            validate_amount(-3.0),
        ]);

        assert!(!result.valid);
        assert_eq!(
            result.error.as_deref(),
            Some("Name cannot be empty, Amount cannot be negative")
        );
        assert!(validate_multiple([validate_name("Loyer"), validate_amount(800.0)]).valid);
    }

    #[test]
    fn test_validate_not_empty() {
        let items: Vec<u8> = Vec::new();
        assert_eq!(
            validate_not_empty(&items, "income").error.as_deref(),
            Some("At least one income is required")
        );
        assert!(validate_not_empty(&[1], "income").valid);
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  <b>Courses</b> "), "bCourses/b");
        assert_eq!(sanitize_string(&"a".repeat(600)).len(), 500);
    }
}
