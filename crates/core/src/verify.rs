//! Per-file verification.

use crate::config::VerifySettings;
use crate::error::{FileError, SetupError};
use crate::template::SignatureTemplate;
use crate::trust::Validator;
use shig_signer::{HashAlgorithm, Signature, SignatureService, SshSigService};
use std::fmt;
use std::fs::File;

/// Printed once per verify run when no trust input was given.
pub const NO_VALIDATOR_WARNING: &str = "WARNING: You have not provided a means of verifying \
the author of this signature. This makes it impossible to determine whether the file has \
been maliciously tampered with.";

/// Verifies files against their signature files and, optionally, a
/// [`Validator`] deciding which signing keys are acceptable.
pub struct Verifier<S = SshSigService> {
    service: S,
    namespace: String,
    hash: HashAlgorithm,
    template: SignatureTemplate,
    validator: Option<Box<dyn Validator>>,
}

/// A file whose signature checked out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verified {
    pub file: String,
    pub signature: String,
    /// SHA-256 fingerprint of the key that made the signature.
    pub fingerprint: String,
}

impl fmt::Display for Verified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is signed by '{}'", self.file, self.fingerprint)
    }
}

impl Verifier<SshSigService> {
    pub fn new(
        settings: &VerifySettings,
        validator: Option<Box<dyn Validator>>,
    ) -> Result<Self, SetupError> {
        Self::with_service(SshSigService, settings, validator)
    }
}

impl<S: SignatureService> Verifier<S> {
    pub fn with_service(
        service: S,
        settings: &VerifySettings,
        validator: Option<Box<dyn Validator>>,
    ) -> Result<Self, SetupError> {
        let hash = settings
            .hash
            .parse::<HashAlgorithm>()
            .map_err(SetupError::HashAlgorithm)?;
        let template = SignatureTemplate::new(settings.signature_file.as_str())?;

        Ok(Self {
            service,
            namespace: settings.namespace.clone(),
            hash,
            template,
            validator,
        })
    }

    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub fn template(&self) -> &SignatureTemplate {
        &self.template
    }

    /// Check `file` against its signature file. Stops at the first failing
    /// step.
    pub fn verify(&self, file: &str) -> Result<Verified, FileError> {
        let task = self.template.task(file);

        let mut input = File::open(&task.file).map_err(|source| FileError::Open {
            file: task.file.clone(),
            source,
        })?;

        let armoured =
            std::fs::read(&task.signature).map_err(|source| FileError::MissingSignature {
                file: task.file.clone(),
                signature: task.signature.clone(),
                source,
            })?;

        let (signature, _) =
            Signature::from_armoured(&armoured).map_err(|source| {
                FileError::MalformedSignature {
                    file: task.file.clone(),
                    signature: task.signature.clone(),
                    source,
                }
            })?;

        self.service
            .verify(&self.namespace, self.hash, &mut input, &signature)
            .map_err(|source| FileError::SignatureMismatch {
                file: task.file.clone(),
                signature: task.signature.clone(),
                source,
            })?;
        drop(input);

        let key = signature.public_key().map_err(|source| FileError::MissingKey {
            file: task.file.clone(),
            source,
        })?;
        let fingerprint = key.fingerprint();

        if let Some(validator) = &self.validator {
            validator
                .validate(&key)
                .map_err(|source| FileError::UntrustedKey {
                    file: task.file.clone(),
                    fingerprint: fingerprint.clone(),
                    source,
                })?;
        }

        tracing::debug!(file = %task.file, %fingerprint, "signature verified");
        Ok(Verified {
            file: task.file,
            signature: task.signature,
            fingerprint,
        })
    }
}

impl<S: fmt::Debug> fmt::Debug for Verifier<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("service", &self.service)
            .field("namespace", &self.namespace)
            .field("hash", &self.hash)
            .field("template", &self.template)
            .field(
                "validator",
                &self.validator.as_ref().map(|v| v.describe()),
            )
            .finish()
    }
}
