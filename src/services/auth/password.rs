use std::fmt;

use tracing::warn;

/// bcrypt ignores everything past this many bytes of the plaintext.
pub const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// Opaque `verify(plaintext, hash) -> bool` capability used at login.
pub trait PasswordVerifier: Send + Sync {
    fn matches(&self, plaintext: &str, stored_hash: &str) -> bool;

    /// Spend roughly the work of `matches` when there is no stored hash to compare
    /// against, so an unknown login costs the same as a wrong password.
    fn decoy(&self, plaintext: &str) {
        let _ = plaintext;
    }
}

/// bcrypt verifier (`$2a$` / `$2b$` / `$2y$` hashes, as written by the user store).
pub struct BcryptVerifier {
    decoy_hash: String,
}

impl fmt::Debug for BcryptVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BcryptVerifier").finish_non_exhaustive()
    }
}

impl BcryptVerifier {
    /// `cost` should match the cost of the stored hashes so decoy runs take as long
    /// as real ones.
    pub fn new(cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let decoy_hash = bcrypt::hash("decoy-password-never-matches", cost)?;
        Ok(Self { decoy_hash })
    }
}

impl PasswordVerifier for BcryptVerifier {
    fn matches(&self, plaintext: &str, stored_hash: &str) -> bool {
        // Longer input would be compared on its first 72 bytes only.
        if plaintext.len() > BCRYPT_MAX_PASSWORD_BYTES {
            return false;
        }
        match bcrypt::verify(plaintext, stored_hash) {
            Ok(ok) => ok,
            Err(e) => {
                // A hash we cannot parse never authenticates anyone.
                warn!(error = %e, "stored password hash could not be verified");
                false
            }
        }
    }

    fn decoy(&self, plaintext: &str) {
        let _ = bcrypt::verify(plaintext, &self.decoy_hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcrypt_matches_only_the_right_password() {
        let verifier = BcryptVerifier::new(4).unwrap();
        let hash = bcrypt::hash("s3cret", 4).unwrap();

        assert!(verifier.matches("s3cret", &hash));
        assert!(!verifier.matches("S3cret", &hash));
        assert!(!verifier.matches("", &hash));
    }

    #[test]
    fn input_past_the_bcrypt_limit_never_matches_its_prefix() {
        let verifier = BcryptVerifier::new(4).unwrap();
        let prefix = "a".repeat(BCRYPT_MAX_PASSWORD_BYTES);
        let hash = bcrypt::hash(&prefix, 4).unwrap();

        assert!(verifier.matches(&prefix, &hash));
        assert!(!verifier.matches(&format!("{prefix}b"), &hash));
    }

    #[test]
    fn unparseable_hash_never_matches() {
        let verifier = BcryptVerifier::new(4).unwrap();
        assert!(!verifier.matches("s3cret", "plaintext-in-the-db"));
        assert!(!verifier.matches("", ""));
    }
}
