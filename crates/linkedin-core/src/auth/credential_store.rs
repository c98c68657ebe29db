use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{restrict_to_owner, ProfileDir};

use super::{AuthError, CredentialSource};

const ENVELOPE_VERSION: u32 = 1;

/// Credentials as persisted for a profile.
#[derive(Debug, Clone)]
pub struct StoredSource {
    pub source: CredentialSource,
    pub saved_at: DateTime<Utc>,
}

/// Where `auth login` puts credentials and [`super::StoredCredentials`] reads them back.
pub trait CredentialStore {
    fn load(&self, profile: &str) -> Result<Option<StoredSource>, AuthError>;
    fn save(&self, profile: &str, source: &CredentialSource) -> Result<(), AuthError>;
    /// Removing a profile that was never saved is not an error.
    fn delete(&self, profile: &str) -> Result<(), AuthError>;
}

/// Keeps each profile in its own owner-readable JSON file under a [`ProfileDir`].
pub struct FileCredentialStore {
    dir: ProfileDir,
}

impl FileCredentialStore {
    pub fn new(dir: ProfileDir) -> Self {
        Self { dir }
    }

    pub fn open_default() -> Result<Self, AuthError> {
        Ok(Self::new(ProfileDir::discover()?))
    }
}

/// Writes `payload` next to `path` and renames it into place, so readers see
/// either the previous file or the complete new one. The file is owner-only
/// from the moment it is created.
fn replace_file(path: &Path, payload: &[u8]) -> Result<(), AuthError> {
    let staging = path.with_extension("json.partial");

    let mut options = OpenOptions::new();
    options.create(true).write(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(&staging)?;
    file.write_all(payload)?;
    file.sync_all()?;
    drop(file);

    // mode() is ignored when the staging file already existed.
    restrict_to_owner(&staging, 0o600)?;
    fs::rename(&staging, path)?;
    Ok(())
}

impl CredentialStore for FileCredentialStore {
    fn load(&self, profile: &str) -> Result<Option<StoredSource>, AuthError> {
        let path = self.dir.credentials_path(profile)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        let envelope: CredentialEnvelope = serde_json::from_str(&raw)?;
        Ok(Some(StoredSource {
            source: envelope.source,
            saved_at: envelope.saved_at,
        }))
    }

    fn save(&self, profile: &str, source: &CredentialSource) -> Result<(), AuthError> {
        let path = self.dir.credentials_path(profile)?;
        let envelope = CredentialEnvelope {
            version: ENVELOPE_VERSION,
            profile: profile.to_owned(),
            saved_at: Utc::now(),
            source: source.clone(),
        };
        replace_file(&path, serde_json::to_string_pretty(&envelope)?.as_bytes())?;
        log::info!("stored {} for profile '{profile}'", source.describe());
        Ok(())
    }

    fn delete(&self, profile: &str) -> Result<(), AuthError> {
        let path = self.dir.credentials_path(profile)?;
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != ErrorKind::NotFound {
                return Err(err.into());
            }
        }
        log::info!("removed credentials for profile '{profile}'");
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialEnvelope {
    version: u32,
    profile: String,
    #[serde(default = "Utc::now")]
    saved_at: DateTime<Utc>,
    source: CredentialSource,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{CredentialProvider, StoredCredentials};
    use crate::config::ConfigError;
    use tempfile::TempDir;

    fn store_in(temp_dir: &TempDir) -> FileCredentialStore {
        FileCredentialStore::new(ProfileDir::at(temp_dir.path().to_path_buf()).unwrap())
    }

    #[test]
    fn saved_header_set_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let source = CredentialSource::headers([("Authorization", "Bearer abc")]);
        store.save("default", &source).unwrap();
        let loaded = store.load("default").unwrap().unwrap();
        assert_eq!(loaded.source, source);
    }

    #[test]
    fn saved_file_is_owner_only_and_replaced_whole() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.save("default", &CredentialSource::bearer("first")).unwrap();
        store.save("default", &CredentialSource::bearer("second")).unwrap();

        let path = temp_dir.path().join("credentials-default.json");
        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["version"], 1);
        assert_eq!(saved["profile"], "default");
        assert_eq!(saved["source"], serde_json::json!({ "bearer_token": "second" }));
        assert!(!temp_dir.path().join("credentials-default.json.partial").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn unknown_profile_loads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(store_in(&temp_dir).load("fresh").unwrap().is_none());
    }

    #[test]
    fn unsafe_profile_name_is_rejected_before_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        let err = store
            .save("../outside", &CredentialSource::bearer("tok"))
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Config(ConfigError::InvalidProfile(_))
        ));
        assert!(!temp_dir.path().parent().unwrap().join("outside").exists());
    }

    #[test]
    fn delete_missing_is_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store.delete("missing").unwrap();
    }

    #[test]
    fn stored_provider_rereads_profile() {
        let temp_dir = TempDir::new().unwrap();
        let store = store_in(&temp_dir);
        store
            .save("work", &CredentialSource::bearer("first"))
            .unwrap();

        let provider = StoredCredentials::new(store_in(&temp_dir), "work");
        assert_eq!(
            provider.credentials().unwrap(),
            CredentialSource::bearer("first")
        );

        store
            .save("work", &CredentialSource::bearer("second"))
            .unwrap();
        assert_eq!(
            provider.credentials().unwrap(),
            CredentialSource::bearer("second")
        );
    }

    #[test]
    fn stored_provider_reports_missing_profile() {
        let temp_dir = TempDir::new().unwrap();
        let provider = StoredCredentials::new(store_in(&temp_dir), "nobody");
        let err = provider.credentials().unwrap_err();
        assert!(matches!(err, AuthError::MissingProfile(profile) if profile == "nobody"));
    }
}
