//! Session token storage.
//!
//! The token is the only state that survives across runs.  It lives in memory
//! behind a lock and is mirrored to `{data_dir}/session_token` (user-only
//! permissions on Unix) so a later invocation picks the session back up.
//!
//! The in-memory value is authoritative: persistence failures are logged and
//! swallowed, never surfaced.  The store itself performs no network I/O and
//! none of its public methods can fail.
//!
//! Tokens are committed only through [`SessionStore::login`] on an explicit
//! user action — task-operation responses never write the token, so a stale
//! in-flight call cannot resurrect a session after logout.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

const TOKEN_FILE: &str = "session_token";

pub struct SessionStore {
    token: RwLock<Option<String>>,
    token_path: PathBuf,
}

impl SessionStore {
    /// Open the store, picking up a previously persisted token if one exists.
    ///
    /// A missing or empty token file means no session.
    pub fn load(data_dir: &Path) -> Self {
        let token_path = data_dir.join(TOKEN_FILE);
        let token = std::fs::read_to_string(&token_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if token.is_some() {
            debug!(path = %token_path.display(), "restored persisted session");
        }
        Self {
            token: RwLock::new(token),
            token_path,
        }
    }

    /// Mark the session authenticated and persist the token (best effort).
    ///
    /// The token is stored verbatim — no client-side format validation.
    pub fn login(&self, token: &str) {
        *self.token.write().expect("session lock poisoned") = Some(token.to_string());
        if let Err(e) = self.persist(token) {
            warn!("failed to persist session token: {e}");
        }
    }

    /// Clear the session and remove the persisted token (best effort).
    pub fn logout(&self) {
        *self.token.write().expect("session lock poisoned") = None;
        match std::fs::remove_file(&self.token_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove persisted session token: {e}"),
        }
    }

    /// Pure predicate: token present and non-empty.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .expect("session lock poisoned")
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    /// The current token, for attaching `Authorization: Bearer <token>`.
    pub fn current_token(&self) -> Option<String> {
        self.token.read().expect("session lock poisoned").clone()
    }

    fn persist(&self, token: &str) -> std::io::Result<()> {
        if let Some(parent) = self.token_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.token_path, token)?;

        // Restrict to owner read/write only on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.token_path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn starts_unauthenticated_without_token_file() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path());
        assert!(!store.is_authenticated());
        assert_eq!(store.current_token(), None);
    }

    #[test]
    fn login_then_logout_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path());

        store.login("tok-123");
        assert!(store.is_authenticated());
        assert_eq!(store.current_token().as_deref(), Some("tok-123"));

        store.logout();
        assert!(!store.is_authenticated());
        assert_eq!(store.current_token(), None);
    }

    #[test]
    fn token_survives_reload() {
        let dir = TempDir::new().unwrap();
        SessionStore::load(dir.path()).login("tok-456");

        // A fresh store over the same data dir picks the session back up.
        let reopened = SessionStore::load(dir.path());
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.current_token().as_deref(), Some("tok-456"));
    }

    #[test]
    fn logout_removes_the_persisted_token() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path());
        store.login("tok-789");
        store.logout();

        assert!(!dir.path().join(TOKEN_FILE).exists());
        assert!(!SessionStore::load(dir.path()).is_authenticated());
    }

    #[test]
    fn whitespace_only_token_file_means_no_session() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "  \n").unwrap();
        assert!(!SessionStore::load(dir.path()).is_authenticated());
    }

    #[test]
    fn logout_twice_is_harmless() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::load(dir.path());
        store.logout();
        store.logout();
        assert!(!store.is_authenticated());
    }

    #[cfg(unix)]
    #[test]
    fn token_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        SessionStore::load(dir.path()).login("tok-perm");
        let mode = std::fs::metadata(dir.path().join(TOKEN_FILE))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
