//! Input checks shared by the signup handler and the client library.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

pub const PASSWORD_SPECIALS: &str = "@$!%*?&";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Field name -> human-readable reason, ordered for stable output.
pub type FieldErrors = BTreeMap<String, String>;

pub fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Returns the first rule the password breaks, in the order the signup form reports them.
pub fn check_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password is required");
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err("Password must contain at least one special character (@$!%*?&)");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

/// Scores a password over the five policy criteria. `None` for an empty input.
pub fn password_strength(password: &str) -> Option<PasswordStrength> {
    if password.is_empty() {
        return None;
    }
    let met = [
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| PASSWORD_SPECIALS.contains(c)),
        password.chars().count() >= MIN_PASSWORD_LEN,
    ]
    .iter()
    .filter(|ok| **ok)
    .count();

    Some(match met {
        0..=2 => PasswordStrength::Weak,
        3 | 4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    })
}

/// Checks a signup form. Every failing field is reported, keyed by its wire name.
pub fn validate_signup(first_name: &str, email: &str, password: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if first_name.trim().is_empty() {
        errors.insert("firstName".into(), "First name is required".into());
    }

    if email.trim().is_empty() {
        errors.insert("email".into(), "Email is required".into());
    } else if !is_valid_email(email) {
        errors.insert("email".into(), "Please enter a valid email address".into());
    }

    if let Err(reason) = check_password(password) {
        errors.insert("password".into(), reason.into());
    }

    errors
}
