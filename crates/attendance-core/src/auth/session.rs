use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::cookie::{Cookie, CookieJar};
use super::storage::PageStorage;

/// Cookie holding the session token
pub const AUTH_COOKIE: &str = "authToken";

/// Page storage key for the serialized user record
pub const USER_KEY: &str = "attendanceUser";

/// Page storage key for the optional backend version tag
pub const VERSION_KEY: &str = "scriptVersion";

/// Token cookie lifetime: 7 days.
const TOKEN_MAX_AGE_SECS: i64 = 604_800;

/// An authenticated session as issued by the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token, never parsed
    pub token: String,
    /// User record exactly as the gateway returned it
    pub user: Value,
    pub backend_version: Option<String>,
}

/// Owns the persisted session.
///
/// The token lives in the cookie jar and the user record (plus version tag)
/// in page storage. Callers only see `save`/`load`/`clear`; a session exists
/// only while both halves are present.
pub struct SessionStore {
    cookies: CookieJar,
    storage: PageStorage,
}

impl SessionStore {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cookies: CookieJar::new(cache_dir),
            storage: PageStorage::new(cache_dir),
        }
    }

    /// Persist a session to both locations
    pub fn save(&self, session: &Session) -> Result<()> {
        let cookie = Cookie::new(AUTH_COOKIE, &session.token, TOKEN_MAX_AGE_SECS);
        debug!(expires_at = ?cookie.expires_at(), "Saving session cookie");
        self.cookies.set(cookie)?;

        let user = serde_json::to_string(&session.user).context("Failed to serialize user")?;
        self.storage.set_item(USER_KEY, &user)?;

        match session.backend_version {
            Some(ref version) => self.storage.set_item(VERSION_KEY, version)?,
            None => self.storage.remove_item(VERSION_KEY)?,
        }
        Ok(())
    }

    /// Load the session if both the token cookie and a parsable user record exist.
    pub fn load(&self) -> Option<Session> {
        let token = self.cookies.get(AUTH_COOKIE).map(|c| c.value);
        let user = self.storage.get_item(USER_KEY);

        let (token, user) = match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => (token, user),
            (token, user) => {
                debug!(
                    has_token = token.is_some(),
                    has_user = user.is_some(),
                    "No complete session stored"
                );
                return None;
            }
        };

        let user: Value = match serde_json::from_str(&user) {
            Ok(user) => user,
            Err(e) => {
                debug!(error = %e, "Stored user record is corrupt");
                return None;
            }
        };

        Some(Session {
            token,
            user,
            backend_version: self.storage.get_item(VERSION_KEY),
        })
    }

    /// Remove the session from both locations
    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(USER_KEY)?;
        self.storage.remove_item(VERSION_KEY)?;
        self.cookies.set(Cookie::new(AUTH_COOKIE, "", 0))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_session(version: Option<&str>) -> Session {
        Session {
            token: "T".to_string(),
            user: json!({"id": 1, "name": "Ada"}),
            backend_version: version.map(str::to_string),
        }
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        let session = sample_session(Some("v42"));
        store.save(&session).unwrap();
        assert_eq!(store.load(), Some(session));
    }

    #[test]
    fn test_load_survives_new_store_instance() {
        let dir = TempDir::new().unwrap();
        SessionStore::new(dir.path())
            .save(&sample_session(None))
            .unwrap();

        let reopened = SessionStore::new(dir.path());
        assert_eq!(reopened.load(), Some(sample_session(None)));
    }

    #[test]
    fn test_load_empty_store() {
        let dir = TempDir::new().unwrap();
        assert_eq!(SessionStore::new(dir.path()).load(), None);
    }

    #[test]
    fn test_clear_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample_session(Some("v42"))).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load(), None);
        assert_eq!(store.storage.get_item(VERSION_KEY), None);
    }

    #[test]
    fn test_token_without_user_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample_session(None)).unwrap();
        store.storage.remove_item(USER_KEY).unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_user_without_token_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample_session(None)).unwrap();
        store.cookies.set(Cookie::new(AUTH_COOKIE, "", 0)).unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupt_user_record_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample_session(None)).unwrap();
        store.storage.set_item(USER_KEY, "{not json").unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_out_of_range_cookie_expiry_is_logged_out() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        store.save(&sample_session(None)).unwrap();

        let jar_path = dir.path().join("cookies.json");
        let contents = std::fs::read_to_string(&jar_path).unwrap();
        let mut jar: serde_json::Value = serde_json::from_str(&contents).unwrap();
        jar[AUTH_COOKIE]["max_age"] = json!(i64::MAX);
        std::fs::write(&jar_path, jar.to_string()).unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_without_version_drops_old_version() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample_session(Some("v1"))).unwrap();
        store.save(&sample_session(None)).unwrap();
        assert_eq!(store.load().unwrap().backend_version, None);
    }

    #[test]
    fn test_token_cookie_attributes() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());

        store.save(&sample_session(None)).unwrap();
        let cookie = store.cookies.get(AUTH_COOKIE).unwrap();
        assert_eq!(
            cookie.header_value(),
            "authToken=T; Max-Age=604800; Path=/; SameSite=Lax"
        );
    }
}
