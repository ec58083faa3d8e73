/*
 * Responsibility
 * - ログイン名からクレデンシャル (password hash + authorities) を引く
 * - 保存先は外部 (Postgres)。このサービスからは読み取り専用
 * - テスト/開発用にメモリ実装も持つ
 */
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::repos::error::{RepoError, RepoResult};

/// A named permission or role, e.g. `ROLE_ADMIN`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Authority(String);

impl Authority {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Authority {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Authority {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Authority {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Stored credential for one login.
///
/// `authorities` is a `BTreeSet`, so iteration (and therefore the token claim
/// built from it) is always in the same order.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub login: String,
    pub password_hash: String,
    pub authorities: BTreeSet<Authority>,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password hash
        f.debug_struct("Credential")
            .field("login", &self.login)
            .field("authorities", &self.authorities)
            .finish_non_exhaustive()
    }
}

impl Credential {
    pub fn new<I, A>(
        login: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: I,
    ) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Authority>,
    {
        Self {
            login: login.into(),
            password_hash: password_hash.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// `Ok(None)` when no such login exists. `Err` only when the store itself failed.
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<Credential>>;
}

/// Postgres-backed store.
///
/// Notes:
/// - The schema is assumed to have at least these columns:
///   - users.id (uuid or bigint)
///   - users.login (text, unique)
///   - users.password_hash (text, bcrypt)
///   - user_authority.user_id (references users.id)
///   - user_authority.authority_name (text)
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

#[derive(Debug, FromRow)]
struct CredentialRow {
    login: String,
    password_hash: String,
    authorities: Vec<String>,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<Credential>> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r#"
            SELECT
                u.login,
                u.password_hash,
                COALESCE(
                    array_agg(ua.authority_name) FILTER (WHERE ua.authority_name IS NOT NULL),
                    '{}'
                ) AS authorities
            FROM users u
            LEFT JOIN user_authority ua ON ua.user_id = u.id
            WHERE u.login = $1
            GROUP BY u.id, u.login, u.password_hash
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(row.map(|r| Credential::new(r.login, r.password_hash, r.authorities)))
    }
}

/// Map-backed store for development and tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: HashMap<String, Credential>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, credential: Credential) -> Self {
        self.insert(credential);
        self
    }

    pub fn insert(&mut self, credential: Credential) {
        self.credentials.insert(credential.login.clone(), credential);
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_login(&self, login: &str) -> RepoResult<Option<Credential>> {
        Ok(self.credentials.get(login).cloned())
    }
}
