//! Per-file signing.

use crate::config::{SignSettings, expand_path};
use crate::error::{FileError, SetupError};
use crate::template::SignatureTemplate;
use shig_signer::{HashAlgorithm, PrivateKeyMaterial, SignatureService, SshSigService};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Signs files with one private key, writing a signature file next to each.
#[derive(Debug)]
pub struct Signer<S = SshSigService> {
    service: S,
    key: PrivateKeyMaterial,
    namespace: String,
    hash: HashAlgorithm,
    template: SignatureTemplate,
}

/// A file that was signed successfully.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signed {
    pub file: String,
    pub signature: String,
}

impl fmt::Display for Signed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' has been signed.", self.file)
    }
}

impl Signer<SshSigService> {
    pub fn new(settings: &SignSettings) -> Result<Self, SetupError> {
        Self::with_service(SshSigService, settings)
    }
}

impl<S: SignatureService> Signer<S> {
    /// Load the private key and validate the settings. Nothing is signed yet.
    pub fn with_service(service: S, settings: &SignSettings) -> Result<Self, SetupError> {
        let path = expand_path(&settings.key);
        let bytes = std::fs::read(&path).map_err(|source| SetupError::KeyRead {
            path: path.clone(),
            source,
        })?;
        let key = PrivateKeyMaterial::from_bytes(&bytes)
            .map_err(|source| SetupError::KeyParse { path: path.clone(), source })?;

        let hash = settings
            .hash
            .parse::<HashAlgorithm>()
            .map_err(SetupError::HashAlgorithm)?;
        let template = SignatureTemplate::new(settings.signature_file.as_str())?;

        tracing::info!(
            key = %path.display(),
            fingerprint = %key.public_key(),
            namespace = %settings.namespace,
            %hash,
            "signer ready"
        );

        Ok(Self {
            service,
            key,
            namespace: settings.namespace.clone(),
            hash,
            template,
        })
    }

    pub fn template(&self) -> &SignatureTemplate {
        &self.template
    }

    /// Sign `file` and write its signature file.
    pub fn sign(&self, file: &str) -> Result<Signed, FileError> {
        let task = self.template.task(file);

        let mut input = File::open(&task.file).map_err(|source| FileError::Open {
            file: task.file.clone(),
            source,
        })?;

        let signature = self
            .service
            .sign(&self.namespace, self.hash, &self.key, &mut input)
            .map_err(|source| FileError::Signing {
                file: task.file.clone(),
                source,
            })?;
        drop(input);

        let armoured = signature.to_armoured().map_err(|source| FileError::Encoding {
            file: task.file.clone(),
            source,
        })?;

        write_signature(Path::new(&task.signature), &armoured).map_err(|source| {
            FileError::Write {
                file: task.file.clone(),
                signature: task.signature.clone(),
                source,
            }
        })?;

        tracing::debug!(file = %task.file, signature = %task.signature, "wrote signature");
        Ok(Signed {
            file: task.file,
            signature: task.signature,
        })
    }
}

/// Signature files are created world readable (0644 before umask).
fn write_signature(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    let mut file = options.open(path)?;
    file.write_all(contents)?;
    file.flush()
}
