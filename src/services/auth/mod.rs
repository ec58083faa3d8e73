pub mod authenticator;
pub mod factory;
pub mod password;
pub mod secret;
pub mod token_codec;

pub use authenticator::{AuthenticateError, Authenticator};
pub use password::{BcryptVerifier, PasswordVerifier};
pub use secret::SecretKey;
pub use token_codec::{TokenCodec, TokenError, VerifiedToken};
