use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::services::auth::secret::SecretKey;

/// Every token is valid for exactly this long after issuance.
pub const TOKEN_LIFETIME_SECONDS: i64 = 10 * 60 * 60;

/// Separator between authority names inside the `authorities` claim.
pub const AUTHORITIES_DELIMITER: &str = " ";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Malformed,
        }
    }
}

/// Wire claims. Kept compatible with tokens already held by clients:
/// `authorities` is a single space-joined string, timestamps are unix seconds.
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    authorities: String,
    iat: i64,
    exp: i64,
}

/// What a successfully verified token tells us about the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub subject: String,
    pub authorities: Vec<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// HMAC-signed JWT minting and verification.
///
/// - The secret is injected at construction; nothing here reads global state.
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &SecretKey) -> Self {
        let algorithm = secret.algorithm();

        let mut validation = Validation::new(algorithm);
        // Expiry is checked by hand against an explicit `now` (see `verify_at`),
        // with no leeway: the lifetime is a hard boundary.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            algorithm,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime: Duration::seconds(TOKEN_LIFETIME_SECONDS),
        }
    }

    pub fn mint<I, S>(&self, subject: &str, authorities: I) -> Result<String, TokenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.mint_at(subject, authorities, Utc::now())
    }

    /// Mint a token as if issued at `now`.
    ///
    /// Authorities are joined in iteration order; pass an ordered collection
    /// (e.g. `BTreeSet`) to get a deterministic claim. Blank names are skipped, and so
    /// are names containing the delimiter: they could not be split back out as one name.
    pub fn mint_at<I, S>(
        &self,
        subject: &str,
        authorities: I,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if subject.trim().is_empty() {
            return Err(TokenError::Malformed);
        }

        let authorities = authorities
            .into_iter()
            .map(|a| a.as_ref().trim().to_string())
            .filter(|a| !a.is_empty())
            .filter(|a| {
                let splittable = a.contains(AUTHORITIES_DELIMITER);
                if splittable {
                    warn!(
                        subject,
                        authority = %a,
                        "authority name contains the claim delimiter; skipped"
                    );
                }
                !splittable
            })
            .collect::<Vec<_>>()
            .join(AUTHORITIES_DELIMITER);

        let iat = now.timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            authorities,
            iat,
            exp: iat + self.lifetime.num_seconds(),
        };

        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(TokenError::Signing)
    }

    pub fn verify(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as seen at `now`.
    ///
    /// The signature is checked (constant-time, inside jsonwebtoken) before any
    /// claim is deserialized, so a tampered claim never gets this far.
    /// A token is still valid at its `exp` second and expired one second later.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<VerifiedToken, TokenError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.sub.trim().is_empty() || claims.exp < claims.iat {
            return Err(TokenError::Malformed);
        }
        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(TokenError::Malformed)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(TokenError::Malformed)?;

        Ok(VerifiedToken {
            subject: claims.sub,
            authorities: split_authorities(&claims.authorities),
            issued_at,
            expires_at,
        })
    }
}

fn split_authorities(claim: &str) -> Vec<String> {
    claim
        .split(AUTHORITIES_DELIMITER)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn codec() -> TokenCodec {
        TokenCodec::new(&SecretKey::from_bytes(vec![42; 32]).unwrap())
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn mint_then_verify_returns_subject_and_authorities() {
        let codec = codec();
        let token = codec.mint("alice", ["ROLE_ADMIN", "ROLE_USER"]).unwrap();

        let verified = codec.verify(&token).unwrap();
        assert_eq!(verified.subject, "alice");
        assert_eq!(verified.authorities, vec!["ROLE_ADMIN", "ROLE_USER"]);
        assert_eq!(
            verified.expires_at - verified.issued_at,
            Duration::hours(10)
        );
    }

    #[test]
    fn no_authorities_round_trips_as_empty() {
        let codec = codec();
        let token = codec.mint("bob", Vec::<String>::new()).unwrap();
        assert!(codec.verify(&token).unwrap().authorities.is_empty());
    }

    #[test]
    fn blank_authorities_are_dropped() {
        let codec = codec();
        let token = codec.mint("bob", ["", "ROLE_USER", "  "]).unwrap();
        assert_eq!(codec.verify(&token).unwrap().authorities, vec!["ROLE_USER"]);
    }

    #[test]
    fn authority_containing_the_delimiter_is_never_split_into_others() {
        let codec = codec();
        let token = codec
            .mint("bob", ["ROLE_AUDITOR ROLE_ADMIN", "ROLE_USER"])
            .unwrap();

        let verified = codec.verify(&token).unwrap();
        assert_eq!(verified.authorities, vec!["ROLE_USER"]);
        assert!(!verified.authorities.iter().any(|a| a == "ROLE_ADMIN"));
    }

    #[test]
    fn empty_subject_cannot_be_minted() {
        assert!(matches!(
            codec().mint(" ", ["ROLE_USER"]),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn expiry_is_a_hard_boundary() {
        let codec = codec();
        let token = codec.mint_at("alice", ["ROLE_USER"], t0()).unwrap();

        let just_before = t0() + Duration::hours(10) - Duration::seconds(1);
        let just_after = t0() + Duration::hours(10) + Duration::seconds(1);

        assert!(codec.verify_at(&token, just_before).is_ok());
        assert!(matches!(
            codec.verify_at(&token, just_after),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn any_single_character_change_is_rejected() {
        let codec = codec();
        let token = codec.mint_at("alice", ["ROLE_USER"], t0()).unwrap();
        let now = t0() + Duration::minutes(1);

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();

            match codec.verify_at(&tampered, now) {
                Err(TokenError::InvalidSignature) | Err(TokenError::Malformed) => {}
                other => panic!("position {i} accepted or misclassified: {other:?}"),
            }
        }
    }

    #[test]
    fn forged_authorities_with_original_signature_fail() {
        use base64::Engine;
        use base64::engine::general_purpose::URL_SAFE_NO_PAD;

        let codec = codec();
        let token = codec.mint_at("alice", ["ROLE_USER"], t0()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let payload = URL_SAFE_NO_PAD.decode(parts[1]).unwrap();
        let payload = String::from_utf8(payload)
            .unwrap()
            .replace("ROLE_USER", "ROLE_ADMIN");
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            URL_SAFE_NO_PAD.encode(payload),
            parts[2]
        );

        assert!(matches!(
            codec.verify_at(&forged, t0()),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn token_from_another_key_is_rejected() {
        let other = TokenCodec::new(&SecretKey::from_bytes(vec![7; 32]).unwrap());
        let token = other.mint("alice", ["ROLE_ADMIN"]).unwrap();
        assert!(matches!(
            codec().verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = codec();
        for garbage in ["", "garbage", "a.b", "a.b.c", "..."] {
            assert!(
                matches!(codec.verify(garbage), Err(TokenError::Malformed)),
                "{garbage:?}"
            );
        }
    }

    #[test]
    fn token_without_subject_is_malformed() {
        #[derive(Serialize)]
        struct NoSub {
            authorities: String,
            iat: i64,
            exp: i64,
        }

        let secret = SecretKey::from_bytes(vec![42; 32]).unwrap();
        let iat = Utc::now().timestamp();
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &NoSub {
                authorities: "ROLE_ADMIN".into(),
                iat,
                exp: iat + 60,
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            TokenCodec::new(&secret).verify(&token),
            Err(TokenError::Malformed)
        ));
    }

    #[test]
    fn debug_hides_keys() {
        let printed = format!("{:?}", codec());
        assert!(printed.contains("HS256"));
        assert!(!printed.contains("key"));
    }
}
