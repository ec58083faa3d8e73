/*
 * Responsibility
 * - 環境変数や設定の読み込み (JWT_SECRET_KEY, DATABASE_URL, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 署名鍵が無い/壊れている状態では絶対に起動しない
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::services::auth::secret::{SecretKey, SecretKeyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
    Secret(SecretKeyError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
            ConfigError::Secret(e) => write!(f, "invalid configuration: JWT_SECRET_KEY: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Secret(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    // HMAC key for minting/verifying tokens. Never logged (Debug is redacted).
    pub jwt_secret: SecretKey,

    // None => in-memory store (development only)
    pub database_url: Option<String>,
    pub credential_lookup_timeout: Duration,
    // Cost of the stored bcrypt hashes; decoy verifications use the same.
    pub bcrypt_cost: u32,

    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = lookup("JWT_SECRET_KEY").ok_or(ConfigError::Missing("JWT_SECRET_KEY"))?;
        let jwt_secret = SecretKey::from_base64(&jwt_secret).map_err(ConfigError::Secret)?;

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let credential_lookup_timeout = match lookup("CREDENTIAL_LOOKUP_TIMEOUT_MS") {
            Some(v) => positive(&v, "CREDENTIAL_LOOKUP_TIMEOUT_MS").map(Duration::from_millis)?,
            None => Duration::from_secs(5),
        };

        let bcrypt_cost = match lookup("BCRYPT_COST") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|c| (4..=31).contains(c))
                .ok_or(ConfigError::Invalid("BCRYPT_COST"))?,
            None => 10,
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECONDS") {
            Some(v) => positive(&v, "REQUEST_TIMEOUT_SECONDS").map(Duration::from_secs)?,
            None => Duration::from_secs(30),
        };

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            jwt_secret,
            database_url,
            credential_lookup_timeout,
            bcrypt_cost,
            request_timeout,
        })
    }
}

fn positive(value: &str, key: &'static str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ConfigError::Invalid(key))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    // 64 bytes of 0x01, base64
    const SECRET: &str =
        "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQ==";

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_with_only_a_secret() {
        let config = load(&[("JWT_SECRET_KEY", SECRET)]).unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.database_url.is_none());
        assert_eq!(config.credential_lookup_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.jwt_secret.as_bytes().len(), 64);
    }

    #[test]
    fn missing_secret_is_fatal() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("JWT_SECRET_KEY"))
        ));
    }

    #[test]
    fn empty_or_broken_secret_is_fatal() {
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "")]),
            Err(ConfigError::Secret(SecretKeyError::Empty))
        ));
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "%%%")]),
            Err(ConfigError::Secret(SecretKeyError::NotBase64))
        ));
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", "c2hvcnQ=")]),
            Err(ConfigError::Secret(SecretKeyError::TooShort { len: 5 }))
        ));
    }

    #[test]
    fn production_requires_a_database() {
        assert!(matches!(
            load(&[("JWT_SECRET_KEY", SECRET), ("APP_ENV", "prod")]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));

        let config = load(&[
            ("JWT_SECRET_KEY", SECRET),
            ("APP_ENV", "production"),
            ("DATABASE_URL", "postgres://localhost/app"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ])
        .unwrap();
        assert!(config.app_env.is_production());
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn bad_numbers_are_fatal() {
        for (key, value) in [
            ("PORT", "http"),
            ("BCRYPT_COST", "2"),
            ("CREDENTIAL_LOOKUP_TIMEOUT_MS", "0"),
            ("CREDENTIAL_LOOKUP_TIMEOUT_MS", "soon"),
            ("REQUEST_TIMEOUT_SECONDS", "0"),
            ("REQUEST_TIMEOUT_SECONDS", "-3"),
        ] {
            match load(&[("JWT_SECRET_KEY", SECRET), (key, value)]) {
                Err(ConfigError::Invalid(k)) => assert_eq!(k, key),
                other => panic!("{key}={value} gave {other:?}"),
            }
        }
    }

    #[test]
    fn timeouts_are_read_when_valid() {
        let config = load(&[
            ("JWT_SECRET_KEY", SECRET),
            ("CREDENTIAL_LOOKUP_TIMEOUT_MS", "250"),
            ("REQUEST_TIMEOUT_SECONDS", "12"),
        ])
        .unwrap();
        assert_eq!(config.credential_lookup_timeout, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(12));
    }
}
