//! Signer error types.

use thiserror::Error;

/// SSH signature envelope errors.
#[derive(Debug, Error)]
pub enum SignerError {
    #[error("key parsing error: {0}")]
    KeyParsing(String),

    #[error("encrypted private keys are not supported, remove the passphrase or use an unencrypted copy")]
    EncryptedKey,

    #[error("unsupported hash algorithm '{0}' (expected sha256 or sha512)")]
    UnsupportedHash(String),

    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("invalid signature format: {0}")]
    InvalidSignature(String),

    #[error("signature namespace mismatch: expected '{expected}', found '{actual}'")]
    NamespaceMismatch { expected: String, actual: String },

    #[error("signature hash algorithm mismatch: expected {expected}, found {actual}")]
    HashMismatch { expected: String, actual: String },

    #[error("verification failed: {0}")]
    VerificationFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for signing operations.
pub type SignerResult<T> = std::result::Result<T, SignerError>;
