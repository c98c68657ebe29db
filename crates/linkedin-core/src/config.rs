use std::env;
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.linkedin.com";
pub const DEFAULT_FEED_URL_PREFIX: &str = "https://www.linkedin.com/feed/update/";
pub const DEFAULT_API_VERSION: &str = "202507";
pub const DEFAULT_PROTOCOL_VERSION: &str = "2.0.0";
pub const DEFAULT_USER_AGENT: &str = "linkedin-rs/0.1.0";

const BASE_URL_ENV: &str = "LINKEDIN_API_BASE_URL";
const API_VERSION_ENV: &str = "LINKEDIN_API_VERSION";

/// Settings shared by every request issued by [`crate::rest::LinkedInClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host of the REST API, without a trailing path.
    pub base_url: String,
    /// Prefix joined with a post URN to build its public feed URL.
    pub feed_url_prefix: String,
    /// Value of the `LinkedIn-Version` header.
    pub api_version: String,
    /// Value of the `X-Restli-Protocol-Version` header.
    pub protocol_version: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            feed_url_prefix: DEFAULT_FEED_URL_PREFIX.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_owned(),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ClientConfig {
    /// Defaults with `LINKEDIN_API_BASE_URL` and `LINKEDIN_API_VERSION` applied when set.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Same as [`Self::default`] but pointed at another host (mock servers, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(base_url) = lookup(BASE_URL_ENV).filter(|value| !value.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(version) = lookup(API_VERSION_ENV).filter(|value| !value.is_empty()) {
            self.api_version = version;
        }
        self
    }
}

/// Per-user directory holding one credentials file per profile
/// (`~/.config/linkedin-rs` on Linux). Created owner-only on first use.
#[derive(Debug, Clone)]
pub struct ProfileDir {
    root: PathBuf,
}

impl ProfileDir {
    pub fn discover() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("com", "linkedin-rs", "linkedin-rs")
            .ok_or(ConfigError::NoHomeDirectory)?;
        Self::at(dirs.config_dir().to_path_buf())
    }

    /// Use `root` instead of the platform location. The directory is created
    /// if missing and restricted to its owner.
    pub fn at(root: PathBuf) -> Result<Self, ConfigError> {
        fs::create_dir_all(&root).map_err(|source| ConfigError::Prepare {
            path: root.clone(),
            source,
        })?;
        restrict_to_owner(&root, 0o700).map_err(|source| ConfigError::Prepare {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `credentials-<profile>.json` under the root. Profile names are limited
    /// to ASCII letters, digits, `-` and `_` so they cannot escape the directory.
    pub fn credentials_path(&self, profile: &str) -> Result<PathBuf, ConfigError> {
        let valid = !profile.is_empty()
            && profile
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigError::InvalidProfile(profile.to_owned()));
        }
        Ok(self.root.join(format!("credentials-{profile}.json")))
    }
}

#[cfg(unix)]
pub(crate) fn restrict_to_owner(path: &Path, mode: u32) -> std::io::Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
pub(crate) fn restrict_to_owner(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no home directory found; cannot place linkedin-rs credentials")]
    NoHomeDirectory,
    #[error("cannot prepare credentials directory {}: {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("profile name '{0}' may only contain ASCII letters, digits, '-' and '_'")]
    InvalidProfile(String),
}
