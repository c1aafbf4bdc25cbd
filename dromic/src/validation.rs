//! Field validation for request bodies.
//!
//! Rules collect every failure into a list of [`FieldError`]s so callers get the whole picture
//! in one `400 Validation failed` response.

use chrono::{Datelike, NaiveDate, Utc};

use crate::errors::{Error, FieldError};

/// Positions accepted at registration, matching the seeded user levels.
pub const POSITIONS: [&str; 9] = [
    "Super Admin",
    "Admin",
    "Secretary",
    "Director",
    "Regional Director",
    "Central Officer",
    "Field Officer",
    "Local Government Unit",
    "Team Leader",
];

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MIN_AGE_YEARS: i32 = 18;

/// Accumulates field errors.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn required(&mut self, field: &str, value: Option<&str>, label: &str) -> &mut Self {
        if value.is_none_or(|v| v.trim().is_empty()) {
            self.push(field, format!("{label} is required"));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !is_valid_email(value) {
            self.push(field, "Please enter a valid email address");
        }
        self
    }

    pub fn username(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().chars().count() < MIN_USERNAME_LENGTH {
            self.push(field, format!("Username must be at least {MIN_USERNAME_LENGTH} characters"));
        }
        self
    }

    /// Length bounds plus at least one lower case letter, upper case letter and digit.
    pub fn password(&mut self, field: &str, value: &str, min_length: usize, max_length: usize) -> &mut Self {
        if value.chars().count() < min_length {
            self.push(field, format!("Password must be at least {min_length} characters"));
        } else if value.len() > max_length {
            self.push(field, format!("Password must be no more than {max_length} characters"));
        }
        let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
        let has_digit = value.chars().any(|c| c.is_ascii_digit());
        if !(has_lower && has_upper && has_digit) {
            self.push(field, "Password must contain uppercase, lowercase, and number");
        }
        self
    }

    pub fn matches(&mut self, field: &str, value: &str, expected: &str) -> &mut Self {
        if value != expected {
            self.push(field, "Passwords do not match");
        }
        self
    }

    /// Parse a `YYYY-MM-DD` date of birth and require the minimum age.
    pub fn date_of_birth(&mut self, field: &str, value: Option<&str>) -> Option<NaiveDate> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            self.push(field, "Date of birth is required");
            return None;
        };
        let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
            self.push(field, "Date of birth must be a valid date (YYYY-MM-DD)");
            return None;
        };
        if age_on(date, Utc::now().date_naive()) < MIN_AGE_YEARS {
            self.push(field, format!("You must be at least {MIN_AGE_YEARS} years old"));
            return None;
        }
        Some(date)
    }

    pub fn position(&mut self, field: &str, value: &str) -> &mut Self {
        if !POSITIONS.contains(&value) {
            self.push(field, "Please select a valid position");
        }
        self
    }

    pub fn accepted(&mut self, field: &str, value: bool) -> &mut Self {
        if !value {
            self.push(field, "You must accept the terms and conditions");
        }
        self
    }

    pub fn finish(&mut self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation {
                errors: std::mem::take(&mut self.errors),
            })
        }
    }
}

/// Minimal structural check: one `@`, non-empty local part, a dotted domain, no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_errors(result: Result<(), Error>) -> Vec<FieldError> {
        match result {
            Err(Error::Validation { errors }) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_email_rules() {
        assert!(is_valid_email("juan@dswd.gov.ph"));
        assert!(!is_valid_email("juan"));
        assert!(!is_valid_email("@dswd.gov.ph"));
        assert!(!is_valid_email("juan@localhost"));
        assert!(!is_valid_email("juan@@dswd.gov.ph"));
        assert!(!is_valid_email("juan dela@dswd.gov.ph"));
        assert!(!is_valid_email("juan@dswd..ph"));
    }

    #[test]
    fn test_password_strength() {
        assert!(Validator::new().password("password", "Secur3Pass", 8, 72).finish().is_ok());

        let errors = field_errors(Validator::new().password("password", "short", 8, 72).finish());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].message, "Password must be at least 8 characters");

        let errors = field_errors(Validator::new().password("password", "alllowercase1", 8, 72).finish());
        assert_eq!(errors[0].message, "Password must contain uppercase, lowercase, and number");
    }

    #[test]
    fn test_collects_every_failure() {
        let errors = field_errors(
            Validator::new()
                .email("email", "nope")
                .username("username", "ab")
                .matches("confirmPassword", "Secur3Pass", "Different1")
                .position("position", "Janitor")
                .accepted("termsAccepted", false)
                .required("firstName", Some("  "), "First name")
                .finish(),
        );
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            ["email", "username", "confirmPassword", "position", "termsAccepted", "firstName"]
        );
    }

    #[test]
    fn test_age_on() {
        let birth = NaiveDate::from_ymd_opt(2000, 6, 15).unwrap();
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2018, 6, 14).unwrap()), 17);
        assert_eq!(age_on(birth, NaiveDate::from_ymd_opt(2018, 6, 15).unwrap()), 18);
    }

    #[test]
    fn test_date_of_birth() {
        let mut v = Validator::new();
        assert!(v.date_of_birth("dateOfBirth", Some("1990-01-31")).is_some());
        assert!(v.finish().is_ok());

        let today = Utc::now().date_naive();
        let minor = today.with_year(today.year() - 10).unwrap_or(today).format("%Y-%m-%d").to_string();
        let mut v = Validator::new();
        assert!(v.date_of_birth("dateOfBirth", Some(&minor)).is_none());
        assert_eq!(field_errors(v.finish())[0].message, "You must be at least 18 years old");

        let mut v = Validator::new();
        assert!(v.date_of_birth("dateOfBirth", Some("31/01/1990")).is_none());
        assert!(v.date_of_birth("dateOfBirth", None).is_none());
        assert_eq!(field_errors(v.finish()).len(), 2);
    }
}
