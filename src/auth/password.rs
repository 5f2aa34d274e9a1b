//! Argon2id password hashing. Hashes are stored as PHC strings in
//! `users.password_hash`; plaintext never reaches the database.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::AuthError;

/// Placeholder hash for accounts that cannot log in (e.g. users provisioned
/// by a section upsert). It never parses as a PHC string.
pub const UNUSABLE_PASSWORD: &str = "!";

/// Hash a password using Argon2id. Returns a PHC-format string.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored hash. Malformed or unusable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_roundtrip_and_salting() {
        let a = hash_password("hunter22").unwrap();
        let b = hash_password("hunter22").unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &a));
        assert!(!verify_password("hunter23", &a));
    }

    #[test]
    fn unusable_hash_never_verifies() {
        assert!(!verify_password("", UNUSABLE_PASSWORD));
        assert!(!verify_password("!", UNUSABLE_PASSWORD));
    }
}
