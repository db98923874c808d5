use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serenity::async_trait;
use tracing::{debug, warn};

use super::models::{
    AccountResponse, AuthError, ErrorResponse, FederatedProvider, IdpRequest, LookupRequest,
    LookupResponse, PasswordRequest, TokenResponse, UpdateProfileRequest, expiry_from,
};
use super::IdentityProvider;
use crate::models::Session;

/// Identity Toolkit REST client (email/password, federated sign-in, token refresh)
#[derive(Clone)]
pub struct FirebaseIdentityClient {
    http_client: HttpClient,
    api_key: String,
    identity_base_url: String,
    token_base_url: String,
}

impl FirebaseIdentityClient {
    const DEFAULT_IDENTITY_URL: &'static str = "https://identitytoolkit.googleapis.com";
    const DEFAULT_TOKEN_URL: &'static str = "https://securetoken.googleapis.com";
    const IDP_REQUEST_URI: &'static str = "http://localhost";

    pub fn new(api_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            identity_base_url: Self::DEFAULT_IDENTITY_URL.to_string(),
            token_base_url: Self::DEFAULT_TOKEN_URL.to_string(),
        }
    }

    /// Create a client that sends both identity and token calls to `base_url` (for testing)
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http_client: HttpClient::new(),
            api_key,
            identity_base_url: base_url.clone(),
            token_base_url: base_url,
        }
    }

    /// Turn a non-success response into an AuthError
    async fn handle_error_response(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();

        match serde_json::from_str::<ErrorResponse>(&body_text) {
            Ok(err) => {
                debug!("Identity provider error {}: {}", status, err.error.message);
                AuthError::from_provider_message(&err.error.message)
            }
            Err(_) => {
                warn!("Identity provider returned {} with unparseable body", status);
                AuthError::Provider(format!("HTTP {}: {}", status.as_u16(), body_text))
            }
        }
    }

    /// POST /v1/accounts:{method}
    async fn post_account<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let url = format!("{}/v1/accounts:{}", self.identity_base_url, method);

        let response = self.http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Deserialization(format!("Failed to parse response: {}", e)))
    }

    /// POST /v1/accounts:lookup
    async fn lookup(&self, id_token: &str) -> Result<AccountResponse, AuthError> {
        let response: LookupResponse = self
            .post_account("lookup", &LookupRequest { id_token })
            .await?;

        response
            .users
            .into_iter()
            .next()
            .ok_or(AuthError::SessionExpired)
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account: AccountResponse = self
            .post_account(
                "signUp",
                &PasswordRequest { email, password, return_secure_token: true },
            )
            .await?;
        account.into_session()
    }

    async fn update_display_name(&self, session: &Session, display_name: &str) -> Result<Session, AuthError> {
        let account: AccountResponse = self
            .post_account(
                "update",
                &UpdateProfileRequest {
                    id_token: &session.id_token,
                    display_name,
                    return_secure_token: true,
                },
            )
            .await?;

        // The update response only carries tokens when they were rotated
        let mut updated = session.clone();
        updated.user.display_name = account.to_user().display_name;
        if let (Some(id_token), Some(refresh_token)) = (account.id_token, account.refresh_token) {
            updated.id_token = id_token;
            updated.refresh_token = refresh_token;
            updated.expires_at = expiry_from(account.expires_in.as_deref());
        }
        Ok(updated)
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account: AccountResponse = self
            .post_account(
                "signInWithPassword",
                &PasswordRequest { email, password, return_secure_token: true },
            )
            .await?;
        account.into_session()
    }

    async fn sign_in_with_idp(
        &self,
        provider: FederatedProvider,
        credential: &str,
    ) -> Result<(Session, bool), AuthError> {
        let account: AccountResponse = self
            .post_account(
                "signInWithIdp",
                &IdpRequest {
                    post_body: provider.post_body(credential),
                    request_uri: Self::IDP_REQUEST_URI,
                    return_idp_credential: true,
                    return_secure_token: true,
                },
            )
            .await?;
        let is_new_user = account.is_new_user.unwrap_or(false);
        Ok((account.into_session()?, is_new_user))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let url = format!("{}/v1/token", self.token_base_url);

        let response = self.http_client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await
            .map_err(|e| AuthError::Request(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Deserialization(format!("Failed to parse response: {}", e)))?;

        let account = self.lookup(&token.id_token).await?;
        if account.local_id != token.user_id {
            return Err(AuthError::SessionExpired);
        }

        Ok(Session {
            user: account.to_user(),
            id_token: token.id_token,
            refresh_token: token.refresh_token,
            expires_at: expiry_from(token.expires_in.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> FirebaseIdentityClient {
        FirebaseIdentityClient::with_base_url("test-key".to_string(), server.url())
    }

    #[tokio::test]
    async fn test_sign_in_with_password() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/accounts:signInWithPassword")
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "email": "ada@example.com",
                "password": "hunter22",
                "returnSecureToken": true
            })))
            .with_status(200)
            .with_body(
                json!({
                    "localId": "uid-1",
                    "email": "ada@example.com",
                    "displayName": "Ada",
                    "idToken": "id-1",
                    "refreshToken": "refresh-1",
                    "expiresIn": "3600",
                    "registered": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let session = client(&server)
            .sign_in_with_password("ada@example.com", "hunter22")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(session.user.uid, "uid-1");
        assert_eq!(session.user.display_name.as_deref(), Some("Ada"));
        assert_eq!(session.user.provider_id, "password");
        assert_eq!(session.refresh_token, "refresh-1");
    }

    #[tokio::test]
    async fn test_sign_up_existing_email_is_mapped() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/accounts:signUp")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"error": {"code": 400, "message": "EMAIL_EXISTS"}}).to_string())
            .create_async()
            .await;

        let err = client(&server)
            .sign_up("ada@example.com", "hunter22")
            .await
            .unwrap_err();

        assert_eq!(err, AuthError::EmailExists);
    }

    #[tokio::test]
    async fn test_sign_in_with_idp_reports_new_user() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/accounts:signInWithIdp")
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "postBody": "id_token=google-token&providerId=google.com",
                "requestUri": "http://localhost"
            })))
            .with_status(200)
            .with_body(
                json!({
                    "localId": "uid-2",
                    "providerId": "google.com",
                    "email": "grace@example.com",
                    "displayName": "Grace",
                    "photoUrl": "https://photos/grace.png",
                    "idToken": "id-2",
                    "refreshToken": "refresh-2",
                    "expiresIn": "3600",
                    "isNewUser": true
                })
                .to_string(),
            )
            .create_async()
            .await;

        let (session, is_new) = client(&server)
            .sign_in_with_idp(FederatedProvider::Google, "google-token")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(is_new);
        assert_eq!(session.user.provider_id, "google.com");
        assert_eq!(session.user.photo_url.as_deref(), Some("https://photos/grace.png"));
    }

    #[tokio::test]
    async fn test_refresh_looks_up_user() {
        let mut server = mockito::Server::new_async().await;
        let _token = server
            .mock("POST", "/v1/token")
            .match_query(Matcher::Any)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-3".into()),
            ]))
            .with_status(200)
            .with_body(
                json!({
                    "id_token": "id-3b",
                    "refresh_token": "refresh-3b",
                    "expires_in": "3600",
                    "token_type": "Bearer",
                    "user_id": "uid-3"
                })
                .to_string(),
            )
            .create_async()
            .await;
        let _lookup = server
            .mock("POST", "/v1/accounts:lookup")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                json!({"users": [{"localId": "uid-3", "email": "linus@example.com"}]}).to_string(),
            )
            .create_async()
            .await;

        let session = client(&server).refresh("refresh-3").await.unwrap();

        assert_eq!(session.user.uid, "uid-3");
        assert_eq!(session.id_token, "id-3b");
        assert_eq!(session.refresh_token, "refresh-3b");
    }

    #[tokio::test]
    async fn test_expired_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(json!({"error": {"code": 400, "message": "TOKEN_EXPIRED"}}).to_string())
            .create_async()
            .await;

        let err = client(&server).refresh("stale").await.unwrap_err();
        assert_eq!(err, AuthError::SessionExpired);
    }
}
