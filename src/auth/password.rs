//! Credential hashing. Digests are Argon2id PHC strings; comparison happens
//! inside argon2 and is constant-time.

use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("could not hash credential: {0}")]
    Hash(password_hash::Error),
    #[error("stored credential digest is malformed: {0}")]
    MalformedDigest(password_hash::Error),
}

lazy_static! {
    /// Digest checked when the account does not exist, so an unknown email
    /// costs the same Argon2 work as a wrong password.
    static ref DUMMY_DIGEST: Option<String> = hash_password("pharmalab-no-such-user").ok();
}

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()
        .hash_password(plain.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| {
            error!(error = %e, "credential hashing failed");
            PasswordError::Hash(e)
        })
}

/// `Ok(false)` on mismatch; `Err` only when `digest` is not a PHC string.
pub fn verify_password(plain: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest).map_err(|e| {
        error!(error = %e, "stored credential digest unparseable");
        PasswordError::MalformedDigest(e)
    })?;
    Ok(hasher().verify_password(plain.as_bytes(), &parsed).is_ok())
}

/// Burns one verification against a throwaway digest. Always `false`.
pub fn verify_against_dummy(plain: &str) -> bool {
    if let Some(digest) = DUMMY_DIGEST.as_deref() {
        let _ = verify_password(plain, digest);
    }
    false
}
