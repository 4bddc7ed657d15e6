//! Layered configuration.
//!
//! Settings are resolved from built-in defaults, an optional TOML file,
//! `SHIG_` prefixed environment variables and finally command line flags,
//! each layer overriding the previous one.

use crate::error::SetupError;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved settings for a `sign` or `verify` run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// Private key used for signing. `~` and `$VAR` are expanded.
    #[serde(default = "default_key")]
    pub key: String,
    /// Namespace the signature is bound to.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Hash algorithm, `sha256` or `sha512`.
    #[serde(default = "default_hash")]
    pub hash: String,
    /// Signature file name template; every `%f` is replaced with the input path.
    #[serde(default = "default_signature_file")]
    pub signature_file: String,
    /// GitHub key lookup.
    #[serde(default)]
    pub github: GitHubSettings,
}

/// Where and how GitHub public keys are fetched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GitHubSettings {
    /// Base URL serving `/<username>.keys`.
    #[serde(default = "default_github_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

/// Values given explicitly on the command line. Unset fields leave the
/// configured value in place.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_file: Option<String>,
}

/// Settings consumed by [`crate::Signer`].
#[derive(Clone, Debug)]
pub struct SignSettings {
    pub key: String,
    pub namespace: String,
    pub hash: String,
    pub signature_file: String,
}

/// Settings consumed by [`crate::Verifier`].
#[derive(Clone, Debug)]
pub struct VerifySettings {
    pub namespace: String,
    pub hash: String,
    pub signature_file: String,
}

fn default_key() -> String {
    "$HOME/.ssh/id_rsa".to_string()
}

fn default_namespace() -> String {
    "file".to_string()
}

fn default_hash() -> String {
    "sha512".to_string()
}

fn default_signature_file() -> String {
    "%f.sig".to_string()
}

fn default_github_base_url() -> String {
    "https://github.com".to_string()
}

fn default_github_timeout_secs() -> u64 {
    10
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            key: default_key(),
            namespace: default_namespace(),
            hash: default_hash(),
            signature_file: default_signature_file(),
            github: GitHubSettings::default(),
        }
    }
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            base_url: default_github_base_url(),
            timeout_secs: default_github_timeout_secs(),
        }
    }
}

impl GitHubSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Settings {
    /// Load settings from `path` (if it exists), the environment and `overrides`.
    pub fn load(path: Option<&Path>, overrides: &SettingsOverrides) -> Result<Self, SetupError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        if let Some(path) = path {
            if path.exists() {
                tracing::debug!(config_path = %path.display(), "loading configuration file");
                figment = figment.merge(Toml::file(path));
            } else {
                tracing::debug!(config_path = %path.display(), "no configuration file found");
            }
        }

        let settings: Settings = figment
            .merge(Env::prefixed("SHIG_").ignore(&["config"]).split("__"))
            .merge(Serialized::defaults(overrides))
            .extract()?;

        if settings.github.timeout_secs == 0 {
            return Err(SetupError::InvalidTimeout);
        }

        Ok(settings)
    }

    pub fn sign(&self) -> SignSettings {
        SignSettings {
            key: self.key.clone(),
            namespace: self.namespace.clone(),
            hash: self.hash.clone(),
            signature_file: self.signature_file.clone(),
        }
    }

    pub fn verify(&self) -> VerifySettings {
        VerifySettings {
            namespace: self.namespace.clone(),
            hash: self.hash.clone(),
            signature_file: self.signature_file.clone(),
        }
    }
}

impl Default for SignSettings {
    fn default() -> Self {
        Settings::default().sign()
    }
}

impl Default for VerifySettings {
    fn default() -> Self {
        Settings::default().verify()
    }
}

/// Default configuration file: `$XDG_CONFIG_HOME/shig/config.toml`, falling
/// back to `$HOME/.config/shig/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => PathBuf::from(std::env::var_os("HOME")?).join(".config"),
    };

    Some(base.join("shig").join("config.toml"))
}

/// Expand a leading `~` and any `$VAR` / `${VAR}` references in a path.
/// Unset variables expand to the empty string.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = shellexpand::full_with_context_no_errors(
        raw,
        || std::env::var("HOME").ok(),
        |name| Some(std::env::var(name).unwrap_or_default()),
    );
    PathBuf::from(expanded.into_owned())
}
