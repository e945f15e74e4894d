use anyhow::{anyhow, Context};
use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use tracing::error;

/// Argon2id with a fresh random salt, encoded as a PHC string.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow!("hash password: {e}")
        })
}

/// `Ok(false)` only for a wrong password; a corrupt stored hash is an error.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash is not a PHC string");
        anyhow!("parse stored hash: {e}")
    })?;
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow!("verify password: {e}")),
    }
}

/// Argon2 is CPU bound; run it off the async workers.
pub async fn hash_password_blocking(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .context("hash task panicked")?
}

pub async fn verify_password_blocking(plain: String, stored: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_password(&plain, &stored))
        .await
        .context("verify task panicked")?
}

/// Burns one verification when the account does not exist, so unknown-email
/// logins take as long as wrong-password ones.
pub async fn verify_against_dummy(plain: String) {
    lazy_static! {
        static ref DUMMY_HASH: Option<String> = hash_password("dummy-password-for-timing").ok();
    }
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_ref() {
            let _ = verify_password(&plain, hash);
        }
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::escape;

    #[test]
    fn registration_password_verifies_at_login() {
        let hash = hash_password("Test@123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("Test@123"));
        assert!(verify_password("Test@123", &hash).unwrap());
        assert!(!verify_password("test@123", &hash).unwrap());
        assert!(!verify_password("Test@1234", &hash).unwrap());
    }

    #[test]
    fn escaped_password_round_trips_only_when_escaped_again() {
        let submitted = r#"P<a>ss"w0rd&/"#;
        let hash = hash_password(&escape(submitted)).unwrap();
        assert!(verify_password(&escape(submitted), &hash).unwrap());
        assert!(!verify_password(submitted, &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("Test@123").unwrap();
        let b = hash_password("Test@123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn corrupt_stored_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("Test@123", "plaintext-Test@123").is_err());
    }

    #[tokio::test]
    async fn blocking_wrappers_agree() {
        let hash = hash_password_blocking("Test@123".into()).await.unwrap();
        assert!(verify_password_blocking("Test@123".into(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("Test@124".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_verification_completes_for_any_input() {
        verify_against_dummy("Test@123".into()).await;
        verify_against_dummy(String::new()).await;
    }
}
