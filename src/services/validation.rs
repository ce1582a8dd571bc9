use reqwest::Url;

use crate::{
    error::{AppError, AppResult, FieldErrors},
    models::{MovieForm, SignInForm, SignUpForm},
};

pub const MIN_YEAR: i32 = 1800;
pub const MAX_YEAR: i32 = 2100;
pub const MIN_PASSWORD_LEN: usize = 6;

fn into_result(errors: FieldErrors) -> AppResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Absolute URL check used for poster links
pub fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok()
}

/// Loose `local@domain.tld` shape check
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain
            .char_indices()
            .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validates the add/edit movie form; nothing is written when this fails
pub fn validate_movie(form: &MovieForm) -> AppResult<()> {
    let mut errors = FieldErrors::new();

    if form.title.trim().is_empty() {
        errors.insert("title", "Title is required".to_string());
    }
    if form.categories.is_empty() {
        errors.insert("categories", "Select at least one category".to_string());
    }
    if let Some(year) = form.year {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            errors.insert("year", "Invalid year".to_string());
        }
    }
    if let Some(url) = form.poster_url.as_deref().filter(|u| !u.is_empty()) {
        if !is_valid_url(url) {
            errors.insert("poster_url", "Invalid URL".to_string());
        }
    }

    into_result(errors)
}

pub fn validate_sign_up(form: &SignUpForm) -> AppResult<()> {
    let mut errors = FieldErrors::new();

    if form.name.trim().is_empty() {
        errors.insert("name", "Name is required".to_string());
    }
    if form.email.trim().is_empty() {
        errors.insert("email", "Email is required".to_string());
    } else if !is_valid_email(form.email.trim()) {
        errors.insert("email", "Invalid email".to_string());
    }
    if form.password.is_empty() {
        errors.insert("password", "Password is required".to_string());
    } else if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        );
    }
    if form.password != form.confirm_password {
        errors.insert("confirm_password", "Passwords do not match".to_string());
    }
    if !form.accept_terms {
        errors.insert("accept_terms", "You must accept the terms".to_string());
    }

    into_result(errors)
}

pub fn validate_sign_in(form: &SignInForm) -> AppResult<()> {
    let mut errors = FieldErrors::new();

    if form.email.trim().is_empty() {
        errors.insert("email", "Email is required".to_string());
    }
    if form.password.is_empty() {
        errors.insert("password", "Password is required".to_string());
    }

    into_result(errors)
}
