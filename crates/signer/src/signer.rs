//! File signing and verification using the OpenSSH SSHSIG format.

use crate::error::{SignerError, SignerResult};
use crate::key::{HashAlgorithm, PrivateKeyMaterial};
use crate::signature::Signature;
use rsa::pkcs1v15;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::sha2::Sha512;
use ssh_key::private::{KeypairData, RsaKeypair};
use ssh_key::public::KeyData;
use ssh_key::{Algorithm, HashAlg, Mpint, SshSig};
use std::io::Read;

/// Capability for producing and checking signatures over a byte stream.
pub trait SignatureService {
    /// Sign everything readable from `data`.
    fn sign(
        &self,
        namespace: &str,
        hash: HashAlgorithm,
        key: &PrivateKeyMaterial,
        data: &mut dyn Read,
    ) -> SignerResult<Signature>;

    /// Check that `signature` covers everything readable from `data` and was
    /// made for `namespace` with `hash`.
    fn verify(
        &self,
        namespace: &str,
        hash: HashAlgorithm,
        data: &mut dyn Read,
        signature: &Signature,
    ) -> SignerResult<()>;
}

/// [`SignatureService`] producing signatures compatible with `ssh-keygen -Y`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SshSigService;

impl SignatureService for SshSigService {
    fn sign(
        &self,
        namespace: &str,
        hash: HashAlgorithm,
        key: &PrivateKeyMaterial,
        data: &mut dyn Read,
    ) -> SignerResult<Signature> {
        let message = read_message(data)?;
        let private = key.as_ssh();
        let sig = match private.key_data() {
            KeypairData::Rsa(keypair) => sign_rsa(keypair, namespace, hash.to_ssh(), &message)?,
            _ => private
                .sign(namespace, hash.to_ssh(), &message)
                .map_err(|e| SignerError::Signing(e.to_string()))?,
        };

        tracing::debug!(namespace, %hash, bytes = message.len(), "signed message");
        Ok(Signature::new(sig))
    }

    fn verify(
        &self,
        namespace: &str,
        hash: HashAlgorithm,
        data: &mut dyn Read,
        signature: &Signature,
    ) -> SignerResult<()> {
        if signature.namespace() != namespace {
            return Err(SignerError::NamespaceMismatch {
                expected: namespace.to_string(),
                actual: signature.namespace().to_string(),
            });
        }

        if signature.hash_algorithm() != Some(hash) {
            return Err(SignerError::HashMismatch {
                expected: hash.to_string(),
                actual: signature.as_ssh().hash_alg().as_str().to_string(),
            });
        }

        let message = read_message(data)?;
        let public_key = ssh_key::PublicKey::from(signature.as_ssh().public_key().clone());
        public_key
            .verify(namespace, &message, signature.as_ssh())
            .map_err(|e| SignerError::VerificationFailed(e.to_string()))
    }
}

/// SSHSIG over an RSA key, always using `rsa-sha2-512` as ssh-keygen does.
///
/// ssh-key's own RSA conversion builds the private key from `p` twice, so
/// the key is rebuilt here from both primes.
fn sign_rsa(
    keypair: &RsaKeypair,
    namespace: &str,
    hash: HashAlg,
    message: &[u8],
) -> SignerResult<SshSig> {
    let uint = |value: &Mpint| rsa::BigUint::try_from(value).map_err(signing_error);

    let private = rsa::RsaPrivateKey::from_components(
        uint(&keypair.public.n)?,
        uint(&keypair.public.e)?,
        uint(&keypair.private.d)?,
        vec![uint(&keypair.private.p)?, uint(&keypair.private.q)?],
    )
    .map_err(signing_error)?;

    let signed_data =
        SshSig::signed_data(namespace, hash, message).map_err(signing_error)?;
    let raw = pkcs1v15::SigningKey::<Sha512>::new(private)
        .try_sign(&signed_data)
        .map_err(signing_error)?;

    let signature = ssh_key::Signature::new(
        Algorithm::Rsa {
            hash: Some(HashAlg::Sha512),
        },
        raw.to_vec(),
    )
    .map_err(signing_error)?;

    SshSig::new(
        KeyData::Rsa(keypair.public.clone()),
        namespace,
        hash,
        signature,
    )
    .map_err(signing_error)
}

fn signing_error(e: impl std::fmt::Display) -> SignerError {
    SignerError::Signing(e.to_string())
}

fn read_message(data: &mut dyn Read) -> SignerResult<Vec<u8>> {
    let mut message = Vec::new();
    data.read_to_end(&mut message)?;
    Ok(message)
}
