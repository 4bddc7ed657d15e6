//! Armoured SSH signature artifacts.

use crate::error::{SignerError, SignerResult};
use crate::key::{HashAlgorithm, PublicKey};
use ssh_key::{Algorithm, LineEnding, SshSig};

const ARMOUR_FOOTER: &[u8] = b"-----END SSH SIGNATURE-----";

/// A signature over a file's contents, bound to a namespace and hash
/// algorithm and carrying the signer's public key.
#[derive(Clone, Debug)]
pub struct Signature {
    inner: SshSig,
}

impl Signature {
    pub(crate) fn new(inner: SshSig) -> Self {
        Self { inner }
    }

    pub fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    /// Hash algorithm recorded in the signature, if it is one we support.
    pub fn hash_algorithm(&self) -> Option<HashAlgorithm> {
        HashAlgorithm::from_ssh(self.inner.hash_alg())
    }

    /// Public key embedded in the signature.
    pub fn public_key(&self) -> SignerResult<PublicKey> {
        let key_data = self.inner.public_key();
        if let Algorithm::Other(name) = key_data.algorithm() {
            return Err(SignerError::InvalidPublicKey(format!(
                "unsupported key algorithm '{}'",
                name.as_str()
            )));
        }

        Ok(PublicKey::from(ssh_key::PublicKey::from(key_data.clone())))
    }

    /// Encode as `-----BEGIN SSH SIGNATURE-----` text, newline terminated.
    pub fn to_armoured(&self) -> SignerResult<Vec<u8>> {
        let pem = self
            .inner
            .to_pem(LineEnding::LF)
            .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;

        let mut bytes = pem.into_bytes();
        if bytes.last() != Some(&b'\n') {
            bytes.push(b'\n');
        }
        Ok(bytes)
    }

    /// Decode the first armoured signature in `data`, returning it along
    /// with whatever follows the armour footer.
    pub fn from_armoured(data: &[u8]) -> SignerResult<(Self, &[u8])> {
        let start = data
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(data.len());

        let footer = data[start..]
            .windows(ARMOUR_FOOTER.len())
            .position(|window| window == ARMOUR_FOOTER)
            .ok_or_else(|| {
                SignerError::InvalidSignature("missing SSH SIGNATURE armour footer".to_string())
            })?;

        let end = start + footer + ARMOUR_FOOTER.len();
        let inner = SshSig::from_pem(&data[start..end])
            .map_err(|e| SignerError::InvalidSignature(e.to_string()))?;

        let rest = &data[end..];
        let rest = rest
            .strip_prefix(b"\r\n")
            .or_else(|| rest.strip_prefix(b"\n"))
            .unwrap_or(rest);

        Ok((Self { inner }, rest))
    }

    pub(crate) fn as_ssh(&self) -> &SshSig {
        &self.inner
    }
}
