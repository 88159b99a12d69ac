//! Argon2id account passwords, stored as PHC strings.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use arttrack_core::error::AuthError;

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// `Ok(false)` on a wrong password; `Err` only when `stored` is not a PHC hash.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Sign-up secrets must have at least `min_chars` characters.
pub fn ensure_strong_enough(password: &str, min_chars: usize) -> Result<(), AuthError> {
    if password.chars().count() < min_chars {
        return Err(AuthError::WeakSecret);
    }
    Ok(())
}
