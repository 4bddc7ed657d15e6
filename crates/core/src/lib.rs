//! Signing and verification workflows for shig.
//!
//! This crate provides:
//! - Layered configuration and path expansion
//! - Per-file signing ([`Signer`]) and verification ([`Verifier`])
//! - Trust validators deciding which signing keys are accepted
//! - Batch orchestration with PASS/FAIL reporting through [`Output`]

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod sign;
pub mod template;
pub mod trust;
pub mod verify;

pub use batch::{
    BatchOperation, BatchResult, FileReport, FileStatus, run_batch, sign_files, verify_files,
};
pub use config::{
    GitHubSettings, Settings, SettingsOverrides, SignSettings, VerifySettings,
    default_config_path, expand_path,
};
pub use error::{FileError, SetupError, TrustError};
pub use output::{BufferedOutput, ConsoleOutput, Output};
pub use sign::{Signed, Signer};
pub use template::{FileTask, SignatureTemplate};
pub use trust::{
    AuthorizedKeysFileValidator, FixedKeySet, GitHubValidator, ThumbprintValidator, TrustOptions,
    TrustSource, Validator, select_validator,
};
pub use verify::{NO_VALIDATOR_WARNING, Verified, Verifier};
