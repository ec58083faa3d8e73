/// Factory: build the auth services from application `Config`.
use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::Config;
use crate::repos::{CredentialStore, InMemoryCredentialStore, PgCredentialStore};
use crate::services::auth::{Authenticator, BcryptVerifier, TokenCodec};

pub fn build_token_codec(config: &Config) -> Arc<TokenCodec> {
    let tokens = TokenCodec::new(&config.jwt_secret);
    info!(algorithm = ?config.jwt_secret.algorithm(), "token codec ready");
    Arc::new(tokens)
}

/// Postgres when `DATABASE_URL` is set, otherwise an empty in-memory store.
///
/// The pool connects lazily, so a database that is down at startup shows up as
/// 503 on login rather than a failed boot.
pub fn build_credential_store(config: &Config) -> Result<Arc<dyn CredentialStore>> {
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .acquire_timeout(config.credential_lookup_timeout)
                .connect_lazy(url)
                .context("invalid DATABASE_URL")?;
            Ok(Arc::new(PgCredentialStore::new(pool)))
        }
        None => {
            warn!("DATABASE_URL not set; using an empty in-memory credential store");
            Ok(Arc::new(InMemoryCredentialStore::new()))
        }
    }
}

pub fn build_authenticator(
    config: &Config,
    tokens: Arc<TokenCodec>,
) -> Result<Arc<Authenticator>> {
    let store = build_credential_store(config)?;
    let verifier =
        BcryptVerifier::new(config.bcrypt_cost).context("failed to prepare bcrypt verifier")?;

    Ok(Arc::new(Authenticator::new(
        store,
        Arc::new(verifier),
        tokens,
        config.credential_lookup_timeout,
    )))
}
