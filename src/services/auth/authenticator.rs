use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::repos::CredentialStore;
use crate::repos::error::RepoError;
use crate::services::auth::password::PasswordVerifier;
use crate::services::auth::token_codec::{TokenCodec, TokenError};

/// Failures that are NOT "bad credentials".
///
/// A wrong username or password is `Ok(None)` from `authenticate`; these
/// variants mean we could not decide at all.
#[derive(Debug, Error)]
pub enum AuthenticateError {
    #[error("credential store unavailable")]
    StoreUnavailable(#[source] RepoError),
    #[error("credential lookup timed out")]
    LookupTimedOut,
    #[error("password verification task failed")]
    VerifierTask(#[from] tokio::task::JoinError),
    #[error("token signing failed")]
    Signing(#[source] TokenError),
}

/// Verifies login credentials and mints a token on success.
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    verifier: Arc<dyn PasswordVerifier>,
    tokens: Arc<TokenCodec>,
    lookup_timeout: Duration,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("tokens", &self.tokens)
            .field("lookup_timeout", &self.lookup_timeout)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        verifier: Arc<dyn PasswordVerifier>,
        tokens: Arc<TokenCodec>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            store,
            verifier,
            tokens,
            lookup_timeout,
        }
    }

    /// Returns a signed token for a matching (username, password), `None` otherwise.
    ///
    /// - Unknown login and wrong password both come back as `None`, and both run one
    ///   password verification, so neither the result nor the timing tells them apart.
    /// - The lookup is bounded by `lookup_timeout`; no retries.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<String>, AuthenticateError> {
        let found = tokio::time::timeout(self.lookup_timeout, self.store.find_by_login(username))
            .await
            .map_err(|_| {
                error!(
                    timeout_ms = self.lookup_timeout.as_millis() as u64,
                    "credential lookup timed out"
                );
                AuthenticateError::LookupTimedOut
            })?
            .map_err(|e| {
                error!(error = ?e, "credential lookup failed");
                AuthenticateError::StoreUnavailable(e)
            })?;

        let verifier = Arc::clone(&self.verifier);
        let password = password.to_string();

        let Some(credential) = found else {
            tokio::task::spawn_blocking(move || verifier.decoy(&password)).await?;
            debug!("login rejected: unknown login");
            warn!("authentication failed");
            return Ok(None);
        };

        let stored_hash = credential.password_hash.clone();
        let matched =
            tokio::task::spawn_blocking(move || verifier.matches(&password, &stored_hash)).await?;

        if !matched {
            debug!(login = %credential.login, "login rejected: password mismatch");
            warn!("authentication failed");
            return Ok(None);
        }

        let token = self
            .tokens
            .mint(&credential.login, &credential.authorities)
            .map_err(|e| {
                error!(error = %e, "failed to mint token");
                AuthenticateError::Signing(e)
            })?;

        info!(login = %credential.login, "user authenticated");
        Ok(Some(token))
    }

    /// `true` iff the token verifies right now. The reason for a failure is dropped.
    pub fn validate_token_string(&self, token: &str) -> bool {
        self.tokens.verify(token).is_ok()
    }
}
