//! Trust validation: deciding whether the key that made a signature is one
//! the user is willing to accept.

mod authorized_keys;
mod github;
mod keyset;
mod thumbprint;

pub use authorized_keys::{AuthorizedKeysFileValidator, parse_authorized_keys};
pub use github::GitHubValidator;
pub use keyset::FixedKeySet;
pub use thumbprint::ThumbprintValidator;

use crate::config::{GitHubSettings, expand_path};
use crate::error::{SetupError, TrustError};
use shig_signer::PublicKey;
use std::path::PathBuf;

/// Key type prefixes identifying an inline public key rather than a path.
pub const SSH_KEY_PREFIXES: &[&str] = &["ssh-", "ecdsa-sha2-", "sk-ssh-", "sk-ecdsa-sha2-"];

/// Checks that a public key is trusted to produce signatures.
pub trait Validator: Send + Sync {
    fn validate(&self, key: &PublicKey) -> Result<(), TrustError>;

    /// Short human readable description of what is trusted.
    fn describe(&self) -> String;
}

/// Trust inputs as given on the command line. Empty strings count as unset.
#[derive(Clone, Debug, Default)]
pub struct TrustOptions {
    pub github: Option<String>,
    pub thumbprint: Option<String>,
    pub public_key: Option<String>,
}

/// The single trust input chosen from [`TrustOptions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrustSource {
    GitHub(String),
    Thumbprint(String),
    InlineKey(String),
    AuthorizedKeysFile(PathBuf),
}

type SourceBuilder = fn(&str) -> TrustSource;

impl TrustOptions {
    /// First non-empty input in precedence order: GitHub user, thumbprint,
    /// explicit key. The remaining inputs are ignored.
    pub fn source(&self) -> Option<TrustSource> {
        let candidates: [(&Option<String>, SourceBuilder); 3] = [
            (&self.github, |user| TrustSource::GitHub(user.to_string())),
            (&self.thumbprint, |print| TrustSource::Thumbprint(print.to_string())),
            (&self.public_key, TrustSource::from_key_input),
        ];

        candidates.into_iter().find_map(|(input, build)| {
            input
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(build)
        })
    }
}

impl TrustSource {
    /// Classify an explicit key input as an inline key or a keys file path.
    pub fn from_key_input(value: &str) -> Self {
        if SSH_KEY_PREFIXES.iter().any(|prefix| value.starts_with(prefix)) {
            Self::InlineKey(value.to_string())
        } else {
            Self::AuthorizedKeysFile(expand_path(value))
        }
    }

    /// Build the validator for this source. GitHub sources hit the network.
    pub async fn into_validator(
        self,
        github: &GitHubSettings,
    ) -> Result<Box<dyn Validator>, TrustError> {
        let validator: Box<dyn Validator> = match self {
            Self::GitHub(user) => Box::new(GitHubValidator::fetch(&user, github).await?),
            Self::Thumbprint(thumbprint) => Box::new(ThumbprintValidator::new(thumbprint)),
            Self::InlineKey(line) => {
                let key = PublicKey::from_authorized_key(&line).map_err(TrustError::InvalidKey)?;
                Box::new(FixedKeySet::new(vec![key]))
            }
            Self::AuthorizedKeysFile(path) => Box::new(AuthorizedKeysFileValidator::open(path)?),
        };

        Ok(validator)
    }
}

/// Build the validator selected by `options`, or `None` when no trust input
/// was given.
pub async fn select_validator(
    options: &TrustOptions,
    github: &GitHubSettings,
) -> Result<Option<Box<dyn Validator>>, SetupError> {
    let Some(source) = options.source() else {
        return Ok(None);
    };

    let validator = source.into_validator(github).await?;
    tracing::info!(trust = %validator.describe(), "validator configured");
    Ok(Some(validator))
}
