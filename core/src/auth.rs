//! Login and registration forms
//!
//! Validation mirrors what the backend enforces so obviously bad forms never
//! leave the page.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, GameResult};

pub const USERNAME_MIN: usize = 2;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const SESSION_CODE_LEN: usize = 6;

/// Who is logging in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Credentials {
    /// Registered account
    Account { username: String, password: String },
    /// Player joining a Kahoot session by code, no password
    #[serde(rename_all = "camelCase")]
    Player {
        username: String,
        session_code: String,
    },
}

/// Body of `POST /api/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginBody {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_code: Option<String>,
}

impl Credentials {
    pub fn username(&self) -> &str {
        match self {
            Credentials::Account { username, .. } | Credentials::Player { username, .. } => {
                username
            }
        }
    }

    pub fn validate(&self) -> GameResult<LoginBody> {
        let username = validate_username(self.username())?;
        match self {
            Credentials::Account { password, .. } => {
                validate_password(password)?;
                Ok(LoginBody {
                    username,
                    password: password.clone(),
                    session_code: None,
                })
            }
            Credentials::Player { session_code, .. } => Ok(LoginBody {
                username,
                password: String::new(),
                session_code: Some(validate_session_code(session_code)?),
            }),
        }
    }
}

/// Registration form as typed by the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Body of `POST /api/register`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Registration {
    pub fn validate(&self) -> GameResult<RegisterBody> {
        let username = validate_username(&self.username)?;
        let email = self.email.trim();
        if !is_email(email) {
            return Err(GameError::field("email", "Please enter a valid email address"));
        }
        validate_password(&self.password)?;
        if self.password != self.confirm_password {
            return Err(GameError::field("confirm_password", "Passwords do not match"));
        }
        Ok(RegisterBody {
            username,
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

fn validate_username(raw: &str) -> GameResult<String> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(GameError::field("username", "Please enter a username"));
    }
    let len = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
        return Err(GameError::field(
            "username",
            "Username must be between 2 and 50 characters",
        ));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> GameResult<()> {
    if password.chars().count() < PASSWORD_MIN {
        return Err(GameError::field(
            "password",
            "Password must be at least 6 characters",
        ));
    }
    Ok(())
}

fn validate_session_code(raw: &str) -> GameResult<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.chars().count() != SESSION_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(GameError::field(
            "session_code",
            "Session code must be 6 letters or digits",
        ));
    }
    Ok(code)
}

/// `local@domain.tld` with no whitespace anywhere
fn is_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}
