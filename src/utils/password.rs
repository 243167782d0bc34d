use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHasher, PasswordVerifier, phc::PasswordHash},
};

use crate::config::PasswordConfig;
use crate::error::{AppError, AppResult};

/// One-way credential hashing used by the user service.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plain-text credential into a self-describing PHC string.
    fn hash(&self, plain: &str) -> AppResult<String>;

    /// Check a plain-text credential against a stored hash.
    ///
    /// A malformed stored hash is an error; a mismatch is `Ok(false)`.
    fn verify(&self, plain: &str, hashed: &str) -> AppResult<bool>;
}

/// Argon2id hasher with configurable costs.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Build a hasher from the configured argon2 costs.
    ///
    /// # Errors
    /// Returns `AppError::Configuration` if the costs are outside what
    /// argon2 accepts.
    pub fn new(config: &PasswordConfig) -> AppResult<Self> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AppError::Configuration {
            key: "password".to_string(),
            source: anyhow::anyhow!("Invalid argon2 parameters: {}", e),
        })?;

        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plain: &str) -> AppResult<String> {
        let password_hash = self
            .argon2()
            .hash_password(plain.as_bytes())
            .map_err(|e| AppError::CredentialHash {
                source: anyhow::anyhow!("Argon2 hashing failed: {}", e),
            })?
            .to_string();

        Ok(password_hash)
    }

    fn verify(&self, plain: &str, hashed: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hashed).map_err(|e| AppError::CredentialHash {
            source: anyhow::anyhow!("Stored hash is not a valid PHC string: {}", e),
        })?;

        // Costs come from the stored hash, so hashes made under older settings still verify.
        Ok(self
            .argon2()
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
