//! Identity boundary.
//!
//! The engine does not implement authentication; it consumes a stable user
//! id and an authentication-state stream. The session subscribes to the
//! store only while `Authenticated` and tears down (cancelling every
//! reminder timer) on the transition to `Unauthenticated`.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::AuthError;
use crate::store::UserId;

/// Authentication state as pushed by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Authenticated(UserId),
    Unauthenticated,
}

/// Thin wrapper around the OS keyring for session-token storage.
pub mod token_store {
    const SERVICE: &str = "habitloop";
    const TOKEN_KEY: &str = "session_token";

    use crate::error::AuthError;

    pub fn get() -> Result<Option<String>, AuthError> {
        let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
        match entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set(token: &str) -> Result<(), AuthError> {
        let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
        entry.set_password(token)?;
        Ok(())
    }

    pub fn delete() -> Result<(), AuthError> {
        let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A successful login.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: UserId,
    pub token: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the hosted identity provider.
pub struct AuthClient {
    client: reqwest::Client,
    base: Url,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Result<Self, AuthError> {
        let base = Url::parse(base_url)
            .map_err(|e| AuthError::Unreachable(format!("invalid base url: {e}")))?;
        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    /// Email/password login. On success the session token is persisted to
    /// the OS keyring so later CLI invocations can reuse it.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let url = self
            .base
            .join("auth/login")
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;
        let resp = self
            .client
            .post(url)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::LoginFailed(format!(
                "HTTP {}",
                resp.status().as_u16()
            )));
        }
        let session = resp
            .json::<AuthSession>()
            .await
            .map_err(|e| AuthError::LoginFailed(e.to_string()))?;

        token_store::set(&session.token)?;
        debug!(user = %session.user_id, "logged in");
        Ok(session)
    }

    /// Drop the persisted session token.
    pub fn logout(&self) -> Result<(), AuthError> {
        token_store::delete()
    }

    /// Token left behind by an earlier login, if any.
    pub fn stored_token(&self) -> Result<Option<String>, AuthError> {
        token_store::get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn failed_login_surfaces_the_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login")
            .with_status(401)
            .create_async()
            .await;

        let client = AuthClient::new(&format!("{}/", server.url())).unwrap();
        let result = client.login("a@example.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::LoginFailed(_))));
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(AuthClient::new("not a url").is_err());
    }
}
