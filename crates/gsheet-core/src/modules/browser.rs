//! Best-effort browser launching.
//!
//! Callers log failures and continue; the authorization URL is always printed too.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use gsheet_types::AuthError;
use tokio::process::Command;

use crate::error::{AppError, AppResult};

/// Openers tried in priority order, macOS first and Windows last.
pub const OPENER_CANDIDATES: [&str; 3] = ["open", "xdg-open", "start"];

#[async_trait]
pub trait BrowserOpener: Send + Sync {
    async fn open(&self, url: &str) -> AppResult<()>;
}

/// Opens URLs with the first opener executable found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct SystemBrowser;

#[async_trait]
impl BrowserOpener for SystemBrowser {
    async fn open(&self, url: &str) -> AppResult<()> {
        let path_var = std::env::var_os("PATH").unwrap_or_default();
        let opener = find_opener(&path_var).ok_or(AuthError::NoBrowserOpener)?;
        tracing::debug!(opener = %opener.display(), "Launching browser");

        // stdout carries JSON output, keep the opener off it.
        let status = Command::new(&opener)
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| AppError::Browser {
                command: opener.display().to_string(),
                message: e.to_string(),
            })?;

        if !status.success() {
            return Err(AppError::Browser {
                command: opener.display().to_string(),
                message: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}

/// Resolve the first available opener against a `PATH`-style value.
pub fn find_opener(path_var: &OsStr) -> Option<PathBuf> {
    OPENER_CANDIDATES
        .iter()
        .find_map(|name| find_on_path(name, path_var))
}

fn find_on_path(name: &str, path_var: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| executable_names(name).into_iter().map(move |n| dir.join(n)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn executable_names(name: &str) -> Vec<String> {
    vec![format!("{name}.exe"), format!("{name}.cmd"), format!("{name}.bat"), name.to_string()]
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn install(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_priority_order_across_path_entries() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        install(first.path(), "xdg-open", 0o755);
        install(second.path(), "open", 0o755);

        let path_var = std::env::join_paths([first.path(), second.path()]).unwrap();
        let found = find_opener(&path_var).unwrap();
        assert_eq!(found, second.path().join("open"));
    }

    #[test]
    fn test_non_executable_is_skipped() {
        let dir = TempDir::new().unwrap();
        install(dir.path(), "open", 0o644);
        install(dir.path(), "xdg-open", 0o755);

        let found = find_opener(dir.path().as_os_str()).unwrap();
        assert_eq!(found, dir.path().join("xdg-open"));
    }

    #[test]
    fn test_no_opener() {
        let dir = TempDir::new().unwrap();
        assert!(find_opener(dir.path().as_os_str()).is_none());
    }
}
