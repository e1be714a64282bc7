//! On-disk session token vault.
//!
//! The vault is the terminal analogue of the browser's token storage slot: one
//! opaque token under a fixed path, set at login, cleared at logout or when the
//! server rejects the session. Reads go back to disk every time - see
//! [`TokenSource`] - so a token cleared anywhere in the process is immediately
//! gone for every caller.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tarea_client::TokenSource;
use tarea_types::SessionToken;

const TOKEN_FILENAME: &str = "token";

/// Persistent storage for the session token.
#[derive(Debug, Clone)]
pub struct TokenVault {
    dir: PathBuf,
}

impl TokenVault {
    /// A vault rooted at the given directory. Nothing is created until a
    /// token is stored.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILENAME)
    }

    /// Persist the token, replacing any previous one.
    ///
    /// The write is a temp-file-plus-rename so a crash cannot leave a
    /// half-written credential, and the file is owner-only on Unix.
    pub fn store(&self, token: &SessionToken) -> io::Result<()> {
        ensure_private_dir(&self.dir)?;
        let tmp = self.dir.join("token.tmp");
        fs::write(&tmp, token.expose_secret())?;
        restrict_to_owner(&tmp)?;
        fs::rename(&tmp, self.token_path())?;
        tracing::debug!(path = %self.token_path().display(), "session token stored");
        Ok(())
    }

    /// Remove the stored token. Clearing an already-empty vault is fine.
    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(self.token_path()) {
            Ok(()) => {
                tracing::debug!("session token cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl TokenSource for TokenVault {
    /// Re-read the token file on every call; the process never caches it.
    fn current(&self) -> Option<SessionToken> {
        let raw = fs::read_to_string(self.token_path()).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(SessionToken::new(trimmed))
        }
    }
}

fn ensure_private_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = fs::metadata(path)?.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!("session dir permissions are too open ({mode:o}); tightening to 0700");
            fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
        }
    }
    Ok(())
}

fn restrict_to_owner(path: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
