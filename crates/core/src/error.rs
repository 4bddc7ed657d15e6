//! Error types for signing and verification runs.
//!
//! Errors fall into two groups. [`SetupError`]s abort a command before any
//! file is touched. [`FileError`]s are scoped to a single file and never stop
//! the rest of the batch.

use shig_signer::SignerError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while preparing a command.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(
        "unable to read your SSH private key '{}'. Make sure that you have entered its path correctly and have permission to access it: {source}",
        .path.display()
    )]
    KeyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "unable to parse your SSH private key '{}'. Make sure that it is a well-formatted SSH private key file: {source}",
        .path.display()
    )]
    KeyParse { path: PathBuf, source: SignerError },

    #[error("{0}")]
    HashAlgorithm(SignerError),

    #[error("signature file template '{0}' must contain the %f placeholder")]
    InvalidTemplate(String),

    #[error("signature file template '{0}' would overwrite the file being signed")]
    TemplateOverwritesInput(String),

    #[error("unable to set up your requested validator. Make sure that you have entered the right value: {0}")]
    Trust(#[from] TrustError),

    #[error("github.timeout_secs must be at least 1 second")]
    InvalidTimeout,

    #[error("failed to load configuration: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for SetupError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

/// Trust validation and trust-list construction errors.
#[derive(Debug, Error)]
pub enum TrustError {
    #[error("the signature is using an untrusted key")]
    UntrustedKey,

    #[error("invalid GitHub username '{0}'")]
    InvalidUsername(String),

    #[error("failed to fetch GitHub public keys from {url}: {reason}")]
    GitHubFetch { url: String, reason: String },

    #[error("GitHub returned HTTP {status} for {url}")]
    GitHubStatus { url: String, status: u16 },

    #[error("timed out after {secs}s fetching GitHub public keys from {url}")]
    GitHubTimeout { url: String, secs: u64 },

    #[error("failed to read authorized keys file '{}': {source}", .path.display())]
    KeysFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed public key in {origin} on line {line}: {source}")]
    MalformedKey {
        origin: String,
        line: usize,
        source: SignerError,
    },

    #[error("failed to parse public key: {0}")]
    InvalidKey(SignerError),

    #[error("{0} does not contain any public keys")]
    NoKeys(String),
}

/// Per-file failures. The display form is the text of the FAIL line.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("'{file}' could not be opened: {source}")]
    Open {
        file: String,
        source: std::io::Error,
    },

    #[error("'{file}' could not be signed: {source}")]
    Signing { file: String, source: SignerError },

    #[error("'{file}' could not format the signature file correctly: {source}")]
    Encoding { file: String, source: SignerError },

    #[error("'{signature}' could not be saved for '{file}': {source}")]
    Write {
        file: String,
        signature: String,
        source: std::io::Error,
    },

    #[error("'{file}' does not have a corresponding signature file '{signature}': {source}")]
    MissingSignature {
        file: String,
        signature: String,
        source: std::io::Error,
    },

    #[error("'{signature}' is not a well-formatted signature file for '{file}': {source}")]
    MalformedSignature {
        file: String,
        signature: String,
        source: SignerError,
    },

    #[error("'{file}' does not match the signature file '{signature}': {source}")]
    SignatureMismatch {
        file: String,
        signature: String,
        source: SignerError,
    },

    #[error("'{file}' does not contain a valid public key in its signature: {source}")]
    MissingKey { file: String, source: SignerError },

    #[error("'{file}' is signed by an untrusted key: {fingerprint}")]
    UntrustedKey {
        file: String,
        fingerprint: String,
        source: TrustError,
    },
}

impl FileError {
    /// The input file this error belongs to.
    pub fn file(&self) -> &str {
        match self {
            Self::Open { file, .. }
            | Self::Signing { file, .. }
            | Self::Encoding { file, .. }
            | Self::Write { file, .. }
            | Self::MissingSignature { file, .. }
            | Self::MalformedSignature { file, .. }
            | Self::SignatureMismatch { file, .. }
            | Self::MissingKey { file, .. }
            | Self::UntrustedKey { file, .. } => file,
        }
    }
}
