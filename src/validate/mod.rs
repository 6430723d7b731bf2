//! Request payload validation.
//!
//! Handlers take raw `serde_json::Value` bodies and run them through one
//! of these before anything reaches a service, so malformed input always
//! produces a 400 with per-field messages instead of a serde type error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ApiError;
use crate::models::{ContactFields, ContactPatch, Subscription};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles")
});

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validated email/password pair, shared by register and login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn require_string(
    body: &Value,
    field: &str,
    errors: &mut HashMap<String, String>,
) -> Option<String> {
    match body.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            errors.insert(field.to_string(), format!("{field} must not be empty"));
            None
        }
        Some(_) => {
            errors.insert(field.to_string(), format!("{field} must be a string"));
            None
        }
        None => {
            errors.insert(field.to_string(), format!("missing required {field} field"));
            None
        }
    }
}

fn check_email(email: &str, errors: &mut HashMap<String, String>) {
    if !EMAIL_RE.is_match(email) {
        errors.insert(
            "email".to_string(),
            "email must be a valid email address".to_string(),
        );
    }
}

pub fn credentials(body: &Value) -> Result<Credentials, ApiError> {
    let mut errors = HashMap::new();

    let email = require_string(body, "email", &mut errors);
    let password = require_string(body, "password", &mut errors);

    if let Some(email) = &email {
        check_email(email, &mut errors);
    }
    if let Some(password) = &password {
        if password.len() < MIN_PASSWORD_LENGTH {
            errors.insert(
                "password".to_string(),
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
    }

    match (email, password) {
        (Some(email), Some(password)) if errors.is_empty() => Ok(Credentials { email, password }),
        _ => Err(ApiError::validation("Validation failed", errors)),
    }
}

/// For the resend-verification request, which carries only an email
pub fn email_only(body: &Value) -> Result<String, ApiError> {
    let mut errors = HashMap::new();

    let email = require_string(body, "email", &mut errors);
    if let Some(email) = &email {
        check_email(email, &mut errors);
    }

    match email {
        Some(email) if errors.is_empty() => Ok(email),
        _ => Err(ApiError::validation("Validation failed", errors)),
    }
}

pub fn subscription(body: &Value) -> Result<Subscription, ApiError> {
    let mut errors = HashMap::new();

    if let Some(raw) = require_string(body, "subscription", &mut errors) {
        if let Ok(tier) = raw.parse::<Subscription>() {
            return Ok(tier);
        }
        errors.insert(
            "subscription".to_string(),
            "subscription must be one of starter, pro, business".to_string(),
        );
    }

    Err(ApiError::validation("Validation failed", errors))
}

pub fn new_contact(body: &Value) -> Result<ContactFields, ApiError> {
    let mut errors = HashMap::new();

    let name = require_string(body, "name", &mut errors);
    let email = require_string(body, "email", &mut errors);
    let phone = require_string(body, "phone", &mut errors);

    let favorite = match body.get("favorite") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errors.insert(
                "favorite".to_string(),
                "favorite must be a boolean".to_string(),
            );
            false
        }
    };

    match (name, email, phone) {
        (Some(name), Some(email), Some(phone)) if errors.is_empty() => Ok(ContactFields {
            name,
            email,
            phone,
            favorite,
        }),
        _ => Err(ApiError::validation("Validation failed", errors)),
    }
}

/// Partial contact update. Unknown keys are ignored; a body carrying
/// nothing usable is rejected outright.
pub fn contact_update(body: &Value) -> Result<ContactPatch, ApiError> {
    let mut errors = HashMap::new();
    let mut patch = ContactPatch::default();

    for field in ["name", "email", "phone"] {
        if body.get(field).is_some() {
            let value = require_string(body, field, &mut errors);
            match field {
                "name" => patch.name = value,
                "email" => patch.email = value,
                _ => patch.phone = value,
            }
        }
    }

    match body.get("favorite") {
        None => {}
        Some(Value::Bool(b)) => patch.favorite = Some(*b),
        Some(_) => {
            errors.insert(
                "favorite".to_string(),
                "favorite must be a boolean".to_string(),
            );
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::validation("Validation failed", errors));
    }
    if patch.is_empty() {
        return Err(ApiError::bad_request("missing fields"));
    }

    Ok(patch)
}

/// The favorite toggle takes exactly one boolean field
pub fn favorite(body: &Value) -> Result<bool, ApiError> {
    match body.get("favorite") {
        Some(Value::Bool(b)) => Ok(*b),
        _ => Err(ApiError::bad_request("missing field favorite")),
    }
}
