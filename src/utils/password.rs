use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Newtype for a plaintext credential so it never ends up in logs by
/// accident.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Hash a credential with Argon2id and a fresh random salt.
pub fn hash_password(password: &Password) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_str().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a credential against a stored hash.
///
/// Argon2 verification is constant-time in the password. A stored hash that
/// fails to parse counts as a mismatch, never as an error the caller could
/// distinguish from a wrong password.
pub fn verify_password(password: &Password, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };

    Argon2::default()
        .verify_password(password.as_str().as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let password = Password::new("mySecurePassword123");
        let hash = hash_password(&password).expect("hashing failed");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&password, &hash));
    }

    #[test]
    fn wrong_password_is_rejected() {
        let hash = hash_password(&Password::new("mySecurePassword123")).expect("hashing failed");
        assert!(!verify_password(&Password::new("wrongPassword"), &hash));
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch_not_a_panic() {
        assert!(!verify_password(&Password::new("anything"), "not-a-phc-hash"));
        assert!(!verify_password(&Password::new("anything"), ""));
    }

    #[test]
    fn salts_differ_between_hashes() {
        let password = Password::new("mySecurePassword123");
        let first = hash_password(&password).expect("hashing failed");
        let second = hash_password(&password).expect("hashing failed");

        assert_ne!(first, second);
        assert!(verify_password(&password, &first));
        assert!(verify_password(&password, &second));
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let rendered = format!("{:?}", Password::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
