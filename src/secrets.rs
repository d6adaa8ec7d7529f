//! Signing secret handling
//!
//! The token signing secret is held in a `Zeroizing` buffer so it is wiped
//! from memory on drop, and its `Debug` output is redacted.
//!
//! # Security Features
//! - Automatic memory zeroing on drop
//! - Minimum length and weak-pattern validation at startup

use zeroize::Zeroizing;

/// Minimum signing secret length in bytes (256 bits)
pub const MIN_SECRET_LENGTH: usize = 32;

/// Error type for secret validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SecretError {
    #[error("Secret is empty")]
    Empty,

    #[error("Secret validation failed: {0}")]
    ValidationFailed(String),
}

/// Symmetric key used to sign and verify session tokens
#[derive(Clone)]
pub struct SigningSecret(Zeroizing<Vec<u8>>);

impl SigningSecret {
    /// Build a secret after checking it meets [`validate_secret_strength`]
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let bytes = Zeroizing::new(secret.into());
        if bytes.is_empty() {
            return Err(SecretError::Empty);
        }
        validate_secret_strength(&bytes, MIN_SECRET_LENGTH)?;
        Ok(SigningSecret(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.0.len())
    }
}

/// Validate that a secret meets minimum security requirements
pub fn validate_secret_strength(secret: &[u8], min_length: usize) -> Result<(), SecretError> {
    if secret.len() < min_length {
        return Err(SecretError::ValidationFailed(format!(
            "Secret too short: {} bytes (minimum: {})",
            secret.len(),
            min_length
        )));
    }

    // Obviously weak secrets copied from sample configs
    let weak_patterns = ["changeme", "placeholder", "your_secret", "secretkey", "123456"];
    let secret_lower = String::from_utf8_lossy(secret).to_lowercase();

    for pattern in &weak_patterns {
        if secret_lower.contains(pattern) {
            return Err(SecretError::ValidationFailed(format!(
                "Secret contains weak pattern: {}",
                pattern
            )));
        }
    }

    Ok(())
}
