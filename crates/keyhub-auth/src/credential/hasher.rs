//! Argon2id hashing and verification for capability secrets.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use keyhub_core::error::AppError;

/// Hashes and verifies capability secrets using Argon2id.
///
/// Both login passwords and stored refresh-token fingerprints go through
/// this type — same contract for both. Hashing salts every call, so two
/// digests of the same secret never compare equal; `verify` is the only
/// valid comparison.
#[derive(Debug, Clone)]
pub struct CredentialHasher;

impl CredentialHasher {
    /// Creates a new credential hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a secret using Argon2id with a random salt.
    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let digest = argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Credential hashing failed: {e}")))?;

        Ok(digest.to_string())
    }

    /// Verifies a secret against a stored Argon2id digest.
    ///
    /// Returns `false` on any mismatch. A malformed digest is treated as a
    /// non-match rather than an error, so unparseable stored state can
    /// never be distinguished from a wrong secret by the caller.
    pub fn verify(&self, digest: &str, secret: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };

        Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}
