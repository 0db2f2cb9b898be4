//! Sign-in and sign-out

use crate::api_client::ApiClient;
use crate::error::ClientResult;
use blogdesk_core::types::{LoginRequest, LoginResponse};
use blogdesk_core::{Credential, CredentialStore};
use chrono::Utc;
use tracing::info;

/// Fallback shown when a login fails without a server message
pub const LOGIN_FAILED: &str = "Invalid credentials";

/// Message shown after signing out
pub const LOGGED_OUT: &str = "You have been logged out successfully.";

impl<S: CredentialStore> ApiClient<S> {
    /// Exchange email and password for a credential and store it
    ///
    /// The credential expires `ttl_days` from now regardless of what the server thinks.
    ///
    /// # Errors
    ///
    /// Returns a validation error if either field is empty, or an error if the server
    /// refuses the login or the credential cannot be stored.
    pub async fn login(&self, request: &LoginRequest, ttl_days: i64) -> ClientResult<Credential> {
        request.validate()?;

        let http = self.http().post(self.url("/auth/login")).json(request);
        let (_, body): (_, LoginResponse) = self.send_json(http, false).await?;

        let credential = Credential::issue(body.token, ttl_days, Utc::now());
        self.store().save(&credential)?;
        info!(email = %request.email, expires_at = %credential.expires_at, "Signed in");
        Ok(credential)
    }

    /// Forget the stored credential; signing out while signed out is fine
    ///
    /// # Errors
    ///
    /// Returns an error if the credential store cannot be cleared.
    pub fn logout(&self) -> ClientResult<()> {
        self.store().clear()?;
        info!("Signed out");
        Ok(())
    }
}
