use super::Validator;
use crate::error::TrustError;
use shig_signer::PublicKey;

/// Trusts the single key whose SHA-256 fingerprint matches exactly.
#[derive(Clone, Debug)]
pub struct ThumbprintValidator {
    thumbprint: String,
}

impl ThumbprintValidator {
    /// `thumbprint` is compared verbatim, e.g. `SHA256:7PCQ...`.
    pub fn new(thumbprint: impl Into<String>) -> Self {
        Self {
            thumbprint: thumbprint.into(),
        }
    }

    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }
}

impl Validator for ThumbprintValidator {
    fn validate(&self, key: &PublicKey) -> Result<(), TrustError> {
        if key.fingerprint() == self.thumbprint {
            Ok(())
        } else {
            Err(TrustError::UntrustedKey)
        }
    }

    fn describe(&self) -> String {
        format!("thumbprint {}", self.thumbprint)
    }
}
