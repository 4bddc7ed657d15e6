use super::{FixedKeySet, Validator};
use crate::error::TrustError;
use shig_signer::PublicKey;
use std::path::{Path, PathBuf};

/// Parse authorized_keys formatted text into a key set.
///
/// Blank lines and `#` comments are skipped. Any other line that does not
/// parse fails the whole source, as does a source with no keys at all.
/// `origin` names the source in error messages.
pub fn parse_authorized_keys(text: &str, origin: &str) -> Result<FixedKeySet, TrustError> {
    let mut keys = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let key = PublicKey::from_authorized_key(line).map_err(|source| {
            TrustError::MalformedKey {
                origin: origin.to_string(),
                line: index + 1,
                source,
            }
        })?;
        keys.push(key);
    }

    if keys.is_empty() {
        return Err(TrustError::NoKeys(origin.to_string()));
    }

    tracing::debug!(origin, count = keys.len(), "parsed trusted keys");
    Ok(FixedKeySet::new(keys))
}

/// Trusts the keys listed in a local authorized_keys file.
#[derive(Clone, Debug)]
pub struct AuthorizedKeysFileValidator {
    path: PathBuf,
    keys: FixedKeySet,
}

impl AuthorizedKeysFileValidator {
    /// Read and parse the file once; later edits are not picked up.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TrustError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| TrustError::KeysFileRead {
            path: path.clone(),
            source,
        })?;

        let keys = parse_authorized_keys(&text, &format!("'{}'", path.display()))?;
        Ok(Self { path, keys })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> &FixedKeySet {
        &self.keys
    }
}

impl Validator for AuthorizedKeysFileValidator {
    fn validate(&self, key: &PublicKey) -> Result<(), TrustError> {
        self.keys.validate(key)
    }

    fn describe(&self) -> String {
        format!("{} from {}", self.keys.describe(), self.path.display())
    }
}
