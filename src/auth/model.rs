use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Error, FieldError};

/// Stored user record. Only the backup tooling serializes the full row;
/// API responses go through [`PublicUser`] and never carry the hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Wire shape for a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Validated registration input; email is trimmed and lowercased so
/// case-variant duplicates collide on the UNIQUE constraint.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn validate(self) -> crate::Result<NewUser> {
        let mut errors = Vec::new();

        let username = self.username.unwrap_or_default().trim().to_string();
        if username.chars().count() < 3 {
            errors.push(FieldError::new("username", "Username must be at least 3 characters long"));
        }

        let email = normalize_email(self.email.unwrap_or_default());
        if !looks_like_email(&email) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }

        let password = self.password.unwrap_or_default();
        if password.chars().count() < 6 {
            errors.push(FieldError::new("password", "Password must be at least 6 characters long"));
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(NewUser {
            username,
            email,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(self) -> crate::Result<Credentials> {
        let mut errors = Vec::new();

        let email = normalize_email(self.email.unwrap_or_default());
        if !looks_like_email(&email) {
            errors.push(FieldError::new("email", "Please enter a valid email address"));
        }

        let password = self.password.unwrap_or_default();
        if password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }

        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }

        Ok(Credentials { email, password })
    }
}

pub fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: PublicUser,
}
