use super::{FixedKeySet, Validator, parse_authorized_keys};
use crate::config::GitHubSettings;
use crate::error::TrustError;
use shig_signer::PublicKey;

const USER_AGENT: &str = concat!("shig/", env!("CARGO_PKG_VERSION"));

/// Trusts the public keys a GitHub user has published at
/// `https://github.com/<username>.keys`.
#[derive(Clone, Debug)]
pub struct GitHubValidator {
    username: String,
    keys: FixedKeySet,
}

impl GitHubValidator {
    /// Fetch the user's keys once. Any transport failure, non-success
    /// status or unparsable line is an error.
    pub async fn fetch(username: &str, settings: &GitHubSettings) -> Result<Self, TrustError> {
        if !is_valid_username(username) {
            return Err(TrustError::InvalidUsername(username.to_string()));
        }

        let url = keys_url(&settings.base_url, username);
        let request_error = |e: reqwest::Error| {
            if e.is_timeout() {
                TrustError::GitHubTimeout {
                    url: url.clone(),
                    secs: settings.timeout_secs,
                }
            } else {
                TrustError::GitHubFetch {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        };

        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| TrustError::GitHubFetch {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(%url, "fetching GitHub public keys");
        let response = client.get(&url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TrustError::GitHubStatus {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(request_error)?;
        let keys = parse_authorized_keys(&body, &url)?;
        tracing::debug!(username, count = keys.len(), "fetched GitHub public keys");

        Ok(Self {
            username: username.to_string(),
            keys,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn keys(&self) -> &FixedKeySet {
        &self.keys
    }
}

impl Validator for GitHubValidator {
    fn validate(&self, key: &PublicKey) -> Result<(), TrustError> {
        self.keys.validate(key)
    }

    fn describe(&self) -> String {
        format!("{} of GitHub user {}", self.keys.describe(), self.username)
    }
}

fn keys_url(base_url: &str, username: &str) -> String {
    format!("{}/{username}.keys", base_url.trim_end_matches('/'))
}

/// GitHub logins are alphanumeric with single inner hyphens.
fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= 39
        && !username.starts_with('-')
        && !username.ends_with('-')
        && !username.contains("--")
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}
