//! SSH signature envelope for shig.
//!
//! This crate provides:
//! - SSH private key loading (OpenSSH and PKCS#1 RSA)
//! - Public key identity: type, wire encoding and SHA-256 fingerprint
//! - SSHSIG signing and verification behind the [`SignatureService`] trait
//! - Armoured signature encoding compatible with `ssh-keygen -Y`

pub mod error;
pub mod key;
pub mod signature;
pub mod signer;

pub use error::{SignerError, SignerResult};
pub use key::{HashAlgorithm, PrivateKeyMaterial, PublicKey, keys_equal};
pub use signature::Signature;
pub use signer::{SignatureService, SshSigService};
