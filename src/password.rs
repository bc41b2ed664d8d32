/// Password hashing and verification using Argon2id
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use std::sync::LazyLock;

use crate::repository::RepositoryError;

/// Hash checked against when the account does not exist, so that login takes the
/// same Argon2 time for unknown emails as for known ones.
static UNKNOWN_ACCOUNT_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unknown-account-placeholder").ok());

/// hash_password
///
/// Hashes a plaintext password with Argon2id (default parameters) and a random
/// per-password salt. Returns the PHC-formatted string stored in `users.password_hash`.
pub fn hash_password(password: &str) -> Result<String, RepositoryError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RepositoryError::PasswordHash(e.to_string()))
}

/// verify_password
///
/// Returns `Ok(false)` on a mismatch. Any other failure (e.g. an unparseable stored
/// hash) is an error, since it points at corrupt data rather than bad credentials.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, RepositoryError> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| RepositoryError::PasswordHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(RepositoryError::PasswordHash(e.to_string())),
    }
}

/// verify_unknown_account
///
/// Performs a full verification against a fixed hash and always reports a mismatch.
pub fn verify_unknown_account(password: &str) -> bool {
    if let Some(hash) = UNKNOWN_ACCOUNT_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    false
}
