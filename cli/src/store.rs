//! File-backed credential store.
//!
//! The file holds a single JSON object with one well-known key, `token`.
//! No expiry is tracked; a stale token surfaces as `Unauthenticated` on the
//! next call. On unix the file is readable by its owner only.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use qrdash_core::{Credential, CredentialStore};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Serialize, Deserialize)]
struct StoredSession {
    token: String,
}

#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, credential: &Credential) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string(&StoredSession {
            token: credential.token().to_string(),
        })?;
        let mut file = open_private(&self.path)?;
        file.write_all(body.as_bytes())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on create; tighten a file left by an older run.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Option<Credential> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no stored session");
                return None;
            }
        };
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(stored) if !stored.token.is_empty() => Some(Credential::new(stored.token)),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, credential: Credential) {
        if let Err(e) = self.write(&credential) {
            warn!(path = %self.path.display(), error = %e, "failed to persist session");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to remove session"),
        }
    }
}
