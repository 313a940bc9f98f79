//! Credential and sign-in models.

use crate::error::{AssessmentError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The credential and identity issued by the server at sign-in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl Credentials {
    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("name", &self.name)
            .finish()
    }
}

/// Wire shape of a sign-in response, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl TryFrom<AuthResponse> for Credentials {
    type Error = AssessmentError;

    fn try_from(response: AuthResponse) -> Result<Self> {
        let access_token = response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AssessmentError::malformed("response has no accessToken"))?;
        let username = response
            .username
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AssessmentError::malformed("response has no username"))?;

        Ok(Self {
            access_token,
            refresh_token: response.refresh_token.unwrap_or_default(),
            username,
            email: response.email.unwrap_or_default(),
            name: response.name.unwrap_or_default(),
        })
    }
}

/// Body of `POST /api/v1/auth/login`.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    /// Validates and normalizes sign-in input; the username is trimmed.
    pub fn new(username: &str, password: &str) -> Result<Self> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AssessmentError::missing_field("Username"));
        }
        if password.is_empty() {
            return Err(AssessmentError::missing_field("Password"));
        }
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of `POST /api/v1/auth/register`.
#[derive(Clone, Serialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegistrationRequest {
    /// Validates registration input; every field is required and the text
    /// fields are trimmed.
    pub fn new(name: &str, email: &str, username: &str, password: &str) -> Result<Self> {
        let fields = [("Name", name.trim()), ("Email", email.trim()), ("Username", username.trim())];
        for (label, value) in fields {
            if value.is_empty() {
                return Err(AssessmentError::missing_field(label));
            }
        }
        if password.is_empty() {
            return Err(AssessmentError::missing_field("Password"));
        }
        Ok(Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            username: username.trim().to_string(),
            password: password.to_string(),
        })
    }
}

impl fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
