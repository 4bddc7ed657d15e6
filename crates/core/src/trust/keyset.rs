use super::Validator;
use crate::error::TrustError;
use shig_signer::{PublicKey, keys_equal};

/// Trusts exactly the keys it holds.
#[derive(Clone, Debug, Default)]
pub struct FixedKeySet {
    keys: Vec<PublicKey>,
}

impl FixedKeySet {
    pub fn new(keys: Vec<PublicKey>) -> Self {
        Self { keys }
    }

    /// First trusted key equal to `key`.
    pub fn find(&self, key: &PublicKey) -> Option<&PublicKey> {
        self.keys.iter().find(|trusted| keys_equal(trusted, key))
    }

    pub fn keys(&self) -> &[PublicKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Validator for FixedKeySet {
    fn validate(&self, key: &PublicKey) -> Result<(), TrustError> {
        match self.find(key) {
            Some(trusted) => {
                tracing::debug!(fingerprint = %trusted, comment = trusted.comment(), "key is trusted");
                Ok(())
            }
            None => Err(TrustError::UntrustedKey),
        }
    }

    fn describe(&self) -> String {
        match self.keys.as_slice() {
            [single] => format!("public key {single}"),
            keys => format!("{} public keys", keys.len()),
        }
    }
}
