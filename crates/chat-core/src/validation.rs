//! Field validation rules
//!
//! Input types derive [`Validate`]; their `validated()` methods trim text,
//! run the derived checks and turn the first failure into a [`DomainError`],
//! so an invalid write never reaches the database. Lengths are counted in
//! characters, matching `VARCHAR(n)` semantics.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::DomainError;

pub const USERNAME_MAX: usize = 32;
pub const DISPLAY_NAME_MAX: usize = 32;
pub const EMAIL_MAX: usize = 254;
pub const LANGUAGE_MAX: usize = 16;
pub const BIO_MAX: usize = 190;
pub const CUSTOM_STATUS_MAX: usize = 128;
pub const PRONOUNS_MAX: usize = 40;
pub const NAME_MAX: usize = 100;
pub const MESSAGE_BODY_MAX: usize = 2000;
pub const IMAGE_MAX: usize = 512;

/// Field names used in `#[validate]` attributes
const FIELDS: &[&str] = &[
    "username",
    "display_name",
    "email",
    "language",
    "bio",
    "custom_status",
    "pronouns",
    "avatar",
    "name",
    "image",
    "body",
];

/// Error code of [`message_text`] for a blank body
const BLANK: &str = "blank";

/// Text-bearing field value, possibly wrapped in options
pub trait TextValue {
    fn text(&self) -> Option<&str>;
}

impl TextValue for str {
    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl TextValue for String {
    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl<T: TextValue> TextValue for Option<T> {
    fn text(&self) -> Option<&str> {
        self.as_ref().and_then(TextValue::text)
    }
}

impl<T: TextValue + ?Sized> TextValue for &T {
    fn text(&self) -> Option<&str> {
        (**self).text()
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// PostgreSQL text columns cannot hold NUL characters
pub fn no_nul<T: TextValue + ?Sized>(value: &T) -> Result<(), ValidationError> {
    match value.text() {
        Some(text) if text.contains('\0') => Err(error("nul", "must not contain NUL characters")),
        _ => Ok(()),
    }
}

/// Message body: a non-whitespace character and no NUL
pub fn message_text<T: TextValue + ?Sized>(value: &T) -> Result<(), ValidationError> {
    match value.text() {
        Some(text) if text.trim().is_empty() => Err(error(BLANK, "must not be empty")),
        _ => no_nul(value),
    }
}

/// Trim a required text field
pub fn trim(raw: &str) -> String {
    raw.trim().to_string()
}

/// Trim an optional text field; blank input is stored as absent
pub fn trim_optional(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Trim a nullable update field; `Some(blank)` clears the value
pub fn trim_nullable(raw: Option<Option<String>>) -> Option<Option<String>> {
    raw.map(trim_optional)
}

/// Convert the first (by field name) validation failure into a domain error
pub fn to_domain_error(errors: &ValidationErrors) -> DomainError {
    let field_errors = errors.field_errors();
    let mut failures: Vec<_> = field_errors.iter().collect();
    failures.sort_by(|a, b| (**a.0).cmp(&**b.0));

    let Some((key, errs)) = failures.first() else {
        return DomainError::invalid_field("input", "is invalid");
    };
    let name: &str = &***key;
    let field = FIELDS
        .iter()
        .copied()
        .find(|known| *known == name)
        .unwrap_or("input");

    if errs.iter().any(|e| e.code == BLANK) && field == "body" {
        return DomainError::EmptyBody;
    }

    let reason = errs
        .first()
        .map(|e| {
            e.message
                .as_ref()
                .map_or_else(|| e.code.to_string(), ToString::to_string)
        })
        .unwrap_or_else(|| "is invalid".to_string());

    DomainError::invalid_field(field, reason)
}

/// Run the derived checks of `input`
pub fn check(input: &impl Validate) -> Result<(), DomainError> {
    input.validate().map_err(|errors| to_domain_error(&errors))
}

#[derive(Validate)]
struct MessageBody {
    #[validate(
        length(max = 2000, message = "must be at most 2000 characters"),
        custom(function = "message_text")
    )]
    body: String,
}

/// Message body as stored by `edit`; it is not trimmed
pub fn message_body(raw: &str) -> Result<String, DomainError> {
    let input = MessageBody {
        body: raw.to_string(),
    };
    check(&input)?;
    Ok(input.body)
}
