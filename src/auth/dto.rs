use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{auth::repo_types::User, error::AppError};

pub const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Request body for user registration. Fields are optional so that a missing
/// field yields our own validation error instead of a deserializer rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Registration input that passed validation.
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, AppError> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(self.name),
            non_blank(self.email),
            self.password.filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::validation("Please enter all values"));
        };

        let email = email.to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::validation("Please enter valid email address"));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "Your password must be at least 8 characters long",
            ));
        }

        Ok(Registration {
            name,
            email,
            password,
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Login {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> Result<Login, AppError> {
        match (non_blank(self.email), self.password.filter(|p| !p.is_empty())) {
            (Some(email), Some(password)) => Ok(Login {
                email: email.to_lowercase(),
                password,
            }),
            _ => Err(AppError::validation("Please enter email & Password")),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Response returned after login or register.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}
