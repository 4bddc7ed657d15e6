//! Running a sign or verify operation over a list of files.
//!
//! Files are processed strictly in order and a failing file never stops
//! the batch. Each result is reported as soon as it is known.

use crate::config::{GitHubSettings, SignSettings, VerifySettings};
use crate::error::{FileError, SetupError};
use crate::output::Output;
use crate::sign::{Signed, Signer};
use crate::trust::{TrustOptions, select_validator};
use crate::verify::{NO_VALIDATOR_WARNING, Verified, Verifier};
use shig_signer::SignatureService;
use std::fmt;

/// An operation applied to one file at a time.
pub trait BatchOperation {
    type Success: fmt::Display;

    fn run(&self, file: &str) -> Result<Self::Success, FileError>;

    /// Printed after the per-file lines when any file failed.
    fn failure_summary(&self) -> &'static str;
}

impl<S: SignatureService> BatchOperation for Signer<S> {
    type Success = Signed;

    fn run(&self, file: &str) -> Result<Signed, FileError> {
        self.sign(file)
    }

    fn failure_summary(&self) -> &'static str {
        "One or more files could not be signed"
    }
}

impl<S: SignatureService> BatchOperation for Verifier<S> {
    type Success = Verified;

    fn run(&self, file: &str) -> Result<Verified, FileError> {
        self.verify(file)
    }

    fn failure_summary(&self) -> &'static str {
        "One or more files failed verification"
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Pass,
    Fail,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        })
    }
}

/// Outcome for one file, as reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct BatchResult {
    pub reports: Vec<FileReport>,
}

impl BatchResult {
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(|r| r.status == FileStatus::Pass)
    }

    pub fn passed(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status == FileStatus::Pass)
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.reports.iter().filter(|r| r.status == FileStatus::Fail)
    }
}

/// Apply `op` to every file in order, printing one PASS or FAIL line per
/// file and the operation's summary line if anything failed.
pub fn run_batch<O, F>(op: &O, files: &[F], output: &mut dyn Output) -> BatchResult
where
    O: BatchOperation + ?Sized,
    F: AsRef<str>,
{
    let mut result = BatchResult::default();

    for file in files {
        let file = file.as_ref();
        let (status, message) = match op.run(file) {
            Ok(success) => (FileStatus::Pass, success.to_string()),
            Err(e) => {
                tracing::warn!(file, error = %e, "file failed");
                (FileStatus::Fail, e.to_string())
            }
        };

        output.print_fmt(format_args!("{status}: {message}"));
        result.reports.push(FileReport {
            file: file.to_string(),
            status,
            message,
        });
    }

    if !result.all_passed() {
        output.print_fmt(format_args!(
            "{}: {}",
            FileStatus::Fail,
            op.failure_summary()
        ));
    }

    tracing::info!(
        files = result.reports.len(),
        passed = result.passed(),
        "batch complete"
    );
    result
}

/// Sign every file with the configured key.
pub fn sign_files<F: AsRef<str>>(
    settings: &SignSettings,
    files: &[F],
    output: &mut dyn Output,
) -> Result<BatchResult, SetupError> {
    let signer = Signer::new(settings)?;
    Ok(run_batch(&signer, files, output))
}

/// Verify every file, trusting keys according to `trust`. Prints the
/// advisory warning once when no trust input was given.
pub async fn verify_files<F: AsRef<str>>(
    settings: &VerifySettings,
    trust: &TrustOptions,
    github: &GitHubSettings,
    files: &[F],
    output: &mut dyn Output,
) -> Result<BatchResult, SetupError> {
    let validator = select_validator(trust, github).await?;
    let verifier = Verifier::new(settings, validator)?;

    if !verifier.has_validator() {
        output.print_warning(NO_VALIDATOR_WARNING);
    }

    Ok(run_batch(&verifier, files, output))
}
