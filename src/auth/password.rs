use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use tracing::error;

use crate::error::{ServiceError, ServiceResult};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn check_password_rules(plain: &str) -> ServiceResult<()> {
    if plain.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Salted Argon2id hash in PHC string form.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod password_tests {
    use super::*;

    #[test]
    fn hash_is_salted_and_verifies() {
        let a = hash_password("hunter22").expect("hash");
        let b = hash_password("hunter22").expect("hash");
        assert_ne!(a, b);
        assert!(a.starts_with("$argon2"));
        assert!(verify_password("hunter22", &a).expect("verify"));
        assert!(!verify_password("hunter23", &a).expect("verify"));
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "plaintext-password").is_err());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(check_password_rules("12345").is_err());
        assert!(check_password_rules("123456").is_ok());
    }
}
