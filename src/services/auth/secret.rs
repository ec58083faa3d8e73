/*
 * Responsibility
 * - HMAC 署名鍵 (JWT_SECRET_KEY) の保持
 * - base64 文字列からの復号と鍵長チェック (弱い鍵は起動失敗)
 * - 鍵長から署名アルゴリズム (HS256/384/512) を決める
 */
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::Algorithm;
use std::fmt;
use thiserror::Error;

/// Shortest key accepted for HMAC signing (256 bits).
pub const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum SecretKeyError {
    #[error("secret key is empty")]
    Empty,
    #[error("secret key is not valid base64")]
    NotBase64,
    #[error("secret key is {len} bytes, at least {} required", MIN_SECRET_BYTES)]
    TooShort { len: usize },
}

/// Process-wide symmetric key material.
///
/// - Key bytes are intentionally not printable via Debug.
/// - Immutable after construction; share it behind `Arc` or by reference.
#[derive(Clone)]
pub struct SecretKey {
    bytes: Vec<u8>,
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("len", &self.bytes.len())
            .field("algorithm", &self.algorithm())
            .finish()
    }
}

impl SecretKey {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SecretKeyError> {
        if bytes.is_empty() {
            return Err(SecretKeyError::Empty);
        }
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(SecretKeyError::TooShort { len: bytes.len() });
        }
        Ok(Self { bytes })
    }

    /// Decode a standard-alphabet base64 secret (surrounding whitespace ignored).
    pub fn from_base64(encoded: &str) -> Result<Self, SecretKeyError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(SecretKeyError::Empty);
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|_| SecretKeyError::NotBase64)?;
        Self::from_bytes(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Strongest HMAC-SHA variant the key length supports.
    pub fn algorithm(&self) -> Algorithm {
        match self.bytes.len() {
            n if n >= 64 => Algorithm::HS512,
            n if n >= 48 => Algorithm::HS384,
            _ => Algorithm::HS256,
        }
    }
}
