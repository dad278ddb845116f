//! Form validation for the login and signup screens
//!
//! Validation runs before any network call. Each field reports at most one
//! error; errors for different fields are collected together.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A form field that can fail validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Display name (signup only)
    Name,
    /// Email address
    Email,
    /// Password
    Password,
    /// Password confirmation (signup only)
    ConfirmPassword,
}

impl Field {
    /// Field identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirmPassword",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is blank after trimming
    #[error("Name is required")]
    NameRequired,

    /// Email is empty
    #[error("Email is required")]
    EmailRequired,

    /// Email does not look like local@domain.tld
    #[error("Email format is invalid")]
    EmailInvalid,

    /// Password is empty
    #[error("Password is required")]
    PasswordRequired,

    /// Password is shorter than the minimum
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum length
        min: usize,
    },

    /// Confirmation is empty
    #[error("Please confirm your password")]
    ConfirmPasswordRequired,

    /// Confirmation differs from the password
    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl ValidationError {
    /// The field this error belongs to
    pub fn field(&self) -> Field {
        match self {
            ValidationError::NameRequired => Field::Name,
            ValidationError::EmailRequired | ValidationError::EmailInvalid => Field::Email,
            ValidationError::PasswordRequired | ValidationError::PasswordTooShort { .. } => {
                Field::Password
            }
            ValidationError::ConfirmPasswordRequired | ValidationError::PasswordMismatch => {
                Field::ConfirmPassword
            }
        }
    }
}

/// All validation failures for a form, at most one per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error, keeping the first one per field
    pub fn push(&mut self, error: ValidationError) {
        if self.get(error.field()).is_none() {
            self.errors.push(error);
        }
    }

    /// Error for a field, if any
    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.iter().find(|e| e.field() == field)
    }

    /// Fields that failed, in form order
    pub fn fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.errors.iter().map(ValidationError::field).collect();
        fields.sort();
        fields
    }

    /// Iterate over the errors
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if nothing failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    // Unanchored: any substring of the shape x@y.z passes
    EMAIL_REGEX.get_or_init(|| Regex::new(r"\S+@\S+\.\S+").unwrap())
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !email_regex().is_match(email) {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(())
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Login form input. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
}

impl Credentials {
    /// Create login input
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validate every field
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_email(&self.email) {
            errors.push(e);
        }
        if let Err(e) = validate_password(&self.password) {
            errors.push(e);
        }
        errors.into_result()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Signup form input. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupFields {
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Password, typed again
    pub confirm_password: String,
}

impl SignupFields {
    /// Create signup input
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }

    /// Validate every field
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.push(ValidationError::NameRequired);
        }
        if let Err(e) = validate_email(&self.email) {
            errors.push(e);
        }
        if let Err(e) = validate_password(&self.password) {
            errors.push(e);
        }
        if self.confirm_password.is_empty() {
            errors.push(ValidationError::ConfirmPasswordRequired);
        } else if self.confirm_password != self.password {
            errors.push(ValidationError::PasswordMismatch);
        }

        errors.into_result()
    }
}

impl fmt::Debug for SignupFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupFields")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
