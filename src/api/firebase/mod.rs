pub mod client;
pub mod models;

use serenity::async_trait;

use crate::models::Session;

pub use client::FirebaseIdentityClient;
pub use models::{AuthError, FederatedProvider};

/// Hosted identity provider used to create and resume sign-in sessions
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an email/password account
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Set the display name on an account, returning the refreshed session
    async fn update_display_name(&self, session: &Session, display_name: &str) -> Result<Session, AuthError>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Sign in with a credential issued by a federated provider.
    /// The flag is true when the provider reports a newly created account.
    async fn sign_in_with_idp(
        &self,
        provider: FederatedProvider,
        credential: &str,
    ) -> Result<(Session, bool), AuthError>;

    /// Exchange a refresh token for a fresh session
    async fn refresh(&self, refresh_token: &str) -> Result<Session, AuthError>;
}
