use lazy_static::lazy_static;
use regex::Regex;

use crate::users::dto::{CreateUser, UpdateUser};

pub const MIN_PASSWORD_LEN: usize = 6;

/// One rejected field with the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.is_empty() {
        errors.push(FieldError::new("name", "must not be empty"));
    }
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    if !is_valid_email(email) {
        errors.push(FieldError::new("email", "is not a valid email address"));
    }
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.len() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
}

/// Validate and normalize create input: name trimmed, email trimmed and
/// lowercased. All offending fields are reported together.
pub fn validate_create(input: CreateUser) -> Result<CreateUser, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = input.name.trim().to_string();
    check_name(&name, &mut errors);

    let email = input.email.trim().to_lowercase();
    check_email(&email, &mut errors);

    check_password(&input.password, &mut errors);

    if errors.is_empty() {
        Ok(CreateUser {
            name,
            email,
            password: input.password,
        })
    } else {
        Err(errors)
    }
}

/// Same rules as create, applied only to the fields that were supplied.
pub fn validate_update(input: UpdateUser) -> Result<UpdateUser, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = input.name.map(|n| n.trim().to_string());
    if let Some(ref name) = name {
        check_name(name, &mut errors);
    }

    let email = input.email.map(|e| e.trim().to_lowercase());
    if let Some(ref email) = email {
        check_email(email, &mut errors);
    }

    if let Some(ref password) = input.password {
        check_password(password, &mut errors);
    }

    if errors.is_empty() {
        Ok(UpdateUser {
            name,
            email,
            password: input.password,
        })
    } else {
        Err(errors)
    }
}
