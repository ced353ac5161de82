//! Password policy and argon2 hashing.
//!
//! Hashing is CPU-bound, so the async wrappers move it onto the blocking
//! pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::error::ApiError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// Every rule the password breaks, in a fixed order. Empty means accepted.
pub fn policy_violations(password: &str) -> Vec<&'static str> {
  let mut violations = Vec::new();
  if password.chars().count() < MIN_PASSWORD_LEN {
    violations.push("Passwords must be at least 8 characters.");
  }
  if !password.chars().any(|c| c.is_ascii_digit()) {
    violations.push("Passwords must have at least one digit ('0'-'9').");
  }
  if !password.chars().any(char::is_lowercase) {
    violations.push("Passwords must have at least one lowercase ('a'-'z').");
  }
  if !password.chars().any(char::is_uppercase) {
    violations.push("Passwords must have at least one uppercase ('A'-'Z').");
  }
  violations
}

/// Produce an argon2 PHC string with a fresh random salt.
pub fn hash_password_blocking(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password_blocking(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    tracing::warn!("stored password hash is not a valid PHC string");
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

pub async fn hash_password(password: String) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || hash_password_blocking(&password))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn verify_password(password: String, phc: String) -> Result<bool, ApiError> {
  tokio::task::spawn_blocking(move || verify_password_blocking(&password, &phc))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))
}
