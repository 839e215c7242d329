//! Credential persistence on disk.
//!
//! A missing or unparsable token file is a cache miss, never an error.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gsheet_types::Credential;

use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached credential. `None` covers both absent and corrupt files.
    pub fn load(&self) -> Option<Credential> {
        let content = match fs::read(&self.path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "No cached token: {}", e);
                return None;
            }
        };

        match serde_json::from_slice::<Credential>(&content) {
            Ok(credential) => Some(credential),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable token file: {}", e);
                None
            }
        }
    }

    /// Write the credential with owner-only permissions.
    ///
    /// Goes through a sibling temp file and a rename so readers never see a partial file.
    pub fn save(&self, credential: &Credential) -> AppResult<()> {
        let temp_path = self.path.with_extension("json.tmp");
        let mut json = serde_json::to_vec_pretty(credential)?;
        json.push(b'\n');

        let result = write_private(&temp_path, &json).and_then(|()| fs::rename(&temp_path, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        tracing::debug!(path = %self.path.display(), "Saved token");
        Ok(())
    }

    /// Remove the cached credential. Absence is not an error.
    pub fn delete(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "Removed cached token");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies on creation; tighten a pre-existing temp file too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Credential {
        Credential::from_expires_in(
            "ya29.access".to_string(),
            Some("Bearer".to_string()),
            Some("1//refresh".to_string()),
            Some(3600),
        )
    }

    fn store_in(dir: &TempDir) -> TokenStore {
        TokenStore::new(dir.path().join("token.json"))
    }

    #[test]
    fn test_missing_file_is_cache_miss() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn test_corrupt_file_is_cache_miss() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{\"access_token\": ").unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let credential = sample();

        store.save(&credential).unwrap();
        assert_eq!(store.load(), Some(credential));
        assert!(!dir.path().join("token.json.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_owner_only_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "old").unwrap();
        fs::set_permissions(store.path(), fs::Permissions::from_mode(0o644)).unwrap();

        store.save(&sample()).unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_save_overwrites_wholesale() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        let replacement = Credential::from_expires_in("second".to_string(), None, None, None);
        store.save(&replacement).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.access_token, "second");
        assert!(loaded.refresh_token.is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&sample()).unwrap();

        store.delete().unwrap();
        assert!(!store.path().exists());
        store.delete().unwrap();
    }
}
