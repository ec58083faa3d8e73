use base64::{Engine as _, engine::general_purpose::STANDARD};
use clap::{Parser, Subcommand};
use rand::{RngCore, rngs::OsRng};

/// Generate the secrets the auth server needs.
///
/// - `secret`: a random base64 HMAC key for `JWT_SECRET_KEY`
///   (64 bytes → HS512, 48 → HS384, 32 → HS256)
/// - `hash`: a bcrypt hash for the `users.password_hash` column
#[derive(Parser, Debug)]
#[command(name = "credgen", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a random base64-encoded signing key
    Secret {
        /// Key length in bytes (at least 32)
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u16).range(32..=1024))]
        bytes: u16,
    },
    /// Print the bcrypt hash of a password
    Hash {
        password: String,

        /// bcrypt cost; keep it equal to the server's BCRYPT_COST
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(4..=31))]
        cost: u32,
    },
}

const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

fn random_secret(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::Secret { bytes } => {
            println!("{}", random_secret(bytes as usize));
        }
        Command::Hash { password, cost } => {
            if password.len() > BCRYPT_MAX_PASSWORD_BYTES {
                return Err("password is longer than 72 bytes; bcrypt ignores the rest".into());
            }
            println!("{}", bcrypt::hash(password, cost)?);
        }
    }

    Ok(())
}
