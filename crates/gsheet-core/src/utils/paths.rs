use std::fs;
use std::path::{Path, PathBuf};

use gsheet_types::ConfigError;

const APP_DIR: &str = "gsheet";

/// File name of the cached credential inside the config directory.
pub const TOKEN_FILE: &str = "token.json";

/// File name of the OAuth client secret inside the config directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// Default config directory: `~/.config/gsheet`.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| ConfigError::NotFound {
        path: "$HOME".to_string(),
    })?;
    Ok(home.join(".config").join(APP_DIR))
}

pub fn token_path(config_dir: &Path) -> PathBuf {
    config_dir.join(TOKEN_FILE)
}

pub fn credentials_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CREDENTIALS_FILE)
}

/// Create the config directory (owner-only on unix). Idempotent.
pub fn ensure_config_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        create_private_dir(dir).map_err(|e| ConfigError::WriteError {
            message: format!("error creating config directory {}: {}", dir.display(), e),
        })?;
        tracing::debug!(path = %dir.display(), "Created config directory");
    }
    Ok(())
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_config_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("gsheet");

        ensure_config_dir(&dir).unwrap();
        ensure_config_dir(&dir).unwrap();
        assert!(dir.is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
        }
    }

    #[test]
    fn test_well_known_paths() {
        let dir = Path::new("/tmp/cfg");
        assert_eq!(token_path(dir), PathBuf::from("/tmp/cfg/token.json"));
        assert_eq!(credentials_path(dir), PathBuf::from("/tmp/cfg/credentials.json"));
    }
}
