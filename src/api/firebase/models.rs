use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Session, User};

/// Federated identity providers accepted for sign-in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
    Facebook,
}

impl FederatedProvider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "google" | "google.com" => Some(FederatedProvider::Google),
            "facebook" | "facebook.com" => Some(FederatedProvider::Facebook),
            _ => None,
        }
    }

    pub fn provider_id(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
            FederatedProvider::Facebook => "facebook.com",
        }
    }

    /// Credential kind carried in the IdP post body
    fn credential_param(&self) -> &'static str {
        match self {
            FederatedProvider::Google => "id_token",
            FederatedProvider::Facebook => "access_token",
        }
    }

    /// `postBody` for accounts:signInWithIdp
    pub fn post_body(&self, credential: &str) -> String {
        format!("{}={}&providerId={}", self.credential_param(), credential, self.provider_id())
    }
}

/// Identity errors, mapped from provider error codes to readable messages
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("An account with this email already exists")]
    EmailExists,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("A display name is required")]
    MissingDisplayName,
    #[error("Password is too weak: {0}")]
    WeakPassword(String),
    #[error("This account has been disabled")]
    UserDisabled,
    #[error("Too many attempts. Please try again later")]
    TooManyAttempts,
    #[error("Your session has expired. Please sign in again")]
    SessionExpired,
    #[error("This sign-in method is not enabled")]
    OperationNotAllowed,
    #[error("Sign-in provider error: {0}")]
    Provider(String),
    #[error("Request Error: {0}")]
    Request(String),
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
    #[error("Profile store error: {0}")]
    Profile(String),
}

impl AuthError {
    /// Map a provider error message such as `WEAK_PASSWORD : Password should be at least 6 characters`
    pub fn from_provider_message(message: &str) -> Self {
        let (code, detail) = match message.split_once(" : ") {
            Some((code, detail)) => (code.trim(), detail.trim()),
            None => (message.trim(), ""),
        };

        match code {
            "EMAIL_EXISTS" => AuthError::EmailExists,
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
                AuthError::InvalidCredentials
            }
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
            "WEAK_PASSWORD" => AuthError::WeakPassword(if detail.is_empty() {
                "Password should be at least 6 characters".to_string()
            } else {
                detail.to_string()
            }),
            "USER_DISABLED" => AuthError::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
            "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" | "USER_NOT_FOUND" => {
                AuthError::SessionExpired
            }
            "OPERATION_NOT_ALLOWED" => AuthError::OperationNotAllowed,
            _ => AuthError::Provider(message.to_string()),
        }
    }
}

/// `{"error": {"code": 400, "message": "EMAIL_EXISTS"}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub code: Option<i32>,
    pub message: String,
}

/// Request body for accounts:signUp and accounts:signInWithPassword
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub return_secure_token: bool,
}

/// Request body for accounts:update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest<'a> {
    pub id_token: &'a str,
    pub display_name: &'a str,
    pub return_secure_token: bool,
}

/// Request body for accounts:signInWithIdp
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdpRequest<'a> {
    pub post_body: String,
    pub request_uri: &'a str,
    pub return_idp_credential: bool,
    pub return_secure_token: bool,
}

/// Request body for accounts:lookup
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest<'a> {
    pub id_token: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderUserInfo {
    pub provider_id: String,
}

/// Account payload shared by the sign-up, sign-in, update, IdP and lookup responses
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub local_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<String>,
    pub provider_id: Option<String>,
    pub is_new_user: Option<bool>,
    #[serde(default)]
    pub provider_user_info: Vec<ProviderUserInfo>,
}

impl AccountResponse {
    pub fn to_user(&self) -> User {
        let provider_id = self
            .provider_user_info
            .first()
            .map(|info| info.provider_id.clone())
            .or_else(|| self.provider_id.clone())
            .unwrap_or_else(|| User::PASSWORD_PROVIDER.to_string());

        User {
            uid: self.local_id.clone(),
            email: non_empty(&self.email),
            display_name: non_empty(&self.display_name),
            photo_url: non_empty(&self.photo_url),
            provider_id,
        }
    }

    /// Build a session from a response that carries tokens
    pub fn into_session(self) -> Result<Session, AuthError> {
        let user = self.to_user();
        let id_token = self
            .id_token
            .ok_or_else(|| AuthError::Deserialization("response has no idToken".to_string()))?;
        let refresh_token = self
            .refresh_token
            .ok_or_else(|| AuthError::Deserialization("response has no refreshToken".to_string()))?;

        Ok(Session {
            user,
            id_token,
            refresh_token,
            expires_at: expiry_from(self.expires_in.as_deref()),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub users: Vec<AccountResponse>,
}

/// Secure token endpoint response (snake_case on the wire)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in: Option<String>,
    pub user_id: String,
}

/// Expiry instant from an `expiresIn` seconds string, defaulting to one hour
pub fn expiry_from(expires_in: Option<&str>) -> chrono::DateTime<Utc> {
    let seconds = expires_in.and_then(|s| s.parse::<i64>().ok()).unwrap_or(3600);
    Utc::now() + Duration::seconds(seconds)
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}
