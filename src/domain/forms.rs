//! Newsletter and contact submissions.
//!
//! Validation mirrors what the forms require before they are accepted. Nothing
//! is persisted; accepted submissions are only acknowledged and logged.

use crate::domain::error::DomainError;

const MAX_EMAIL_CHARS: usize = 254;
const MAX_NAME_CHARS: usize = 120;
const MAX_MESSAGE_CHARS: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsletterSignup {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl NewsletterSignup {
    pub fn parse(email: &str) -> Result<Self, DomainError> {
        Ok(Self {
            email: parse_email(email)?,
        })
    }
}

impl ContactMessage {
    pub fn parse(name: &str, email: &str, message: &str) -> Result<Self, DomainError> {
        let name = required("name", name, MAX_NAME_CHARS)?;
        let email = parse_email(email)?;
        let message = required("message", message, MAX_MESSAGE_CHARS)?;
        Ok(Self {
            name,
            email,
            message,
        })
    }
}

fn required(field: &'static str, value: &str, max_chars: usize) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(DomainError::validation(
            field,
            format!("must be at most {max_chars} characters"),
        ));
    }
    Ok(trimmed.to_string())
}

fn parse_email(value: &str) -> Result<String, DomainError> {
    let email = required("email", value, MAX_EMAIL_CHARS)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(DomainError::validation(
            "email",
            "must be a valid email address",
        ))
    }
}
