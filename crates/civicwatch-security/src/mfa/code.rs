//! Verification code generation and hashing.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use rand::RngExt;

use civicwatch_core::error::AppError;

/// Lowest six-digit code, inclusive.
const CODE_MIN: u32 = 100_000;

/// Highest six-digit code, inclusive.
const CODE_MAX: u32 = 999_999;

/// Generates verification codes and their one-way hashes.
///
/// Codes are six decimal digits drawn uniformly from
/// [100000, 999999], so a leading zero never occurs and every code has
/// the same length. Only the Argon2id hash of a code ever leaves this
/// module alongside a token; the plaintext goes to the mail transport
/// and nowhere else.
#[derive(Debug, Clone)]
pub struct CodeGenerator;

impl CodeGenerator {
    /// Creates a new code generator.
    pub fn new() -> Self {
        Self
    }

    /// Draw a fresh six-digit verification code.
    pub fn generate(&self) -> String {
        let code: u32 = rand::rng().random_range(CODE_MIN..=CODE_MAX);
        code.to_string()
    }

    /// Hashes a verification code using Argon2id with a random salt.
    pub fn hash_code(&self, code: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(code.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Code hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a submitted code against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the code matches, `Ok(false)` if not.
    pub fn verify_code(&self, code: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid code hash format: {e}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(code.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!("Code verification failed: {e}"))),
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_six_digits() {
        let generator = CodeGenerator::new();
        for _ in 0..200 {
            let code = generator.generate();
            assert_eq!(code.len(), 6, "code: {code}");
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            let value: u32 = code.parse().unwrap();
            assert!((CODE_MIN..=CODE_MAX).contains(&value), "code: {code}");
        }
    }

    #[test]
    fn test_hash_verifies_only_matching_code() {
        let generator = CodeGenerator::new();
        let hash = generator.hash_code("123456").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(generator.verify_code("123456", &hash).unwrap());
        assert!(!generator.verify_code("654321", &hash).unwrap());
    }

    #[test]
    fn test_same_code_hashes_differently() {
        let generator = CodeGenerator::new();
        let a = generator.hash_code("123456").unwrap();
        let b = generator.hash_code("123456").unwrap();
        assert_ne!(a, b);
        assert!(generator.verify_code("123456", &a).unwrap());
        assert!(generator.verify_code("123456", &b).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error_not_a_mismatch() {
        let generator = CodeGenerator::new();
        assert!(generator.verify_code("123456", "not-a-phc-string").is_err());
    }
}
