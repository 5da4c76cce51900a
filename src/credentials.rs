//! Password hashing and verification.
//!
//! Handlers only see the [`CredentialHasher`] capability; the algorithm and its
//! cost factor live behind it and can be swapped without touching route code.

use crate::config::PasswordConfig;
use crate::error::app_error::AppError;
use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::{Arc, OnceLock};

pub trait CredentialHasher: Send + Sync {
    /// Produces a self-describing hash (algorithm, cost and salt are encoded
    /// in the output) so verification needs nothing but the stored string.
    fn hash(&self, password: &str) -> Result<String, AppError>;

    /// Returns `Ok(false)` for a wrong password. Errors only when the stored
    /// hash cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError>;

    /// Burns roughly the cost of one verification when there is no stored
    /// hash to check against, so unknown usernames answer as slowly as
    /// known ones.
    fn verify_decoy(&self, password: &str);
}

pub type SharedHasher = Arc<dyn CredentialHasher>;

pub struct Argon2Hasher {
    params: Params,
    decoy: OnceLock<String>,
}

impl Argon2Hasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, AppError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| AppError::internal(format!("Invalid Argon2 parameters: {}", e)))?;

        Ok(Self {
            params,
            decoy: OnceLock::new(),
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn decoy_hash(&self) -> Option<&str> {
        if let Some(hash) = self.decoy.get() {
            return Some(hash.as_str());
        }
        let hash = self.hash("decoy-password-never-matches").ok()?;
        Some(self.decoy.get_or_init(|| hash).as_str())
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2().hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AppError::password_hash("Failed to parse stored password hash", e))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::password_hash("Password verification failed", e)),
        }
    }

    fn verify_decoy(&self, password: &str) {
        if let Some(decoy) = self.decoy_hash() {
            let _ = self.verify(password, decoy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fast_password_config;
    use proptest::prelude::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::new(&fast_password_config()).expect("valid params")
    }

    #[test]
    fn hash_encodes_algorithm_and_salt() {
        let hash = hasher().hash("secret1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("secret1"));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = hasher();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn hashes_from_other_cost_settings_still_verify() {
        let stronger = Argon2Hasher::new(&PasswordConfig {
            memory_kib: 64,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = stronger.hash("secret1").unwrap();
        assert!(hasher().verify("secret1", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error_not_a_mismatch() {
        let result = hasher().verify("secret1", "not-a-phc-string");
        assert!(matches!(result, Err(AppError::PasswordHash { .. })));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let result = Argon2Hasher::new(&PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(result.is_err());
    }

    #[test]
    fn decoy_verification_does_not_panic() {
        let hasher = hasher();
        hasher.verify_decoy("anything");
        hasher.verify_decoy("anything-else");
        assert!(hasher.decoy.get().is_some());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn verify_accepts_only_the_original_password(password in "[ -~]{6,24}", other in "[ -~]{6,24}") {
            let hasher = hasher();
            let hash = hasher.hash(&password).unwrap();
            prop_assert!(hasher.verify(&password, &hash).unwrap());
            if other != password {
                prop_assert!(!hasher.verify(&other, &hash).unwrap());
            }
        }
    }
}
