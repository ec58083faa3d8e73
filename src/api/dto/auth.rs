/*
 * Responsibility
 * - /api/authenticate の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::auth::password::BCRYPT_MAX_PASSWORD_BYTES;

pub const MAX_USERNAME_LEN: usize = 256;
/// bcrypt only reads the first 72 bytes; anything longer would match on its prefix.
pub const MAX_PASSWORD_LEN: usize = BCRYPT_MAX_PASSWORD_BYTES;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the password
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.username.len() > MAX_USERNAME_LEN {
            return Err("username must be <= 256 bytes");
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err("password must be <= 72 bytes");
        }
        Ok(())
    }
}

/// Body returned on successful login.
#[derive(Debug, Serialize)]
pub struct JwtToken {
    pub id_token: String,
}
