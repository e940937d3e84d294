//! A small persistent cookie jar.
//!
//! Cookies are kept in `cookies.json` under the cache directory, keyed by
//! name. Expiry follows browser semantics: a cookie lives for `max_age`
//! seconds after it was set, and setting one with `max_age <= 0` deletes it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cookie jar file name in cache directory
const COOKIE_FILE: &str = "cookies.json";

/// Every cookie this client sets is `SameSite=Lax`
const SAME_SITE: &str = "Lax";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Lifetime in seconds, counted from `set_at`
    pub max_age: i64,
    pub path: String,
    pub same_site: String,
    pub set_at: DateTime<Utc>,
}

impl Cookie {
    /// Create a site-wide `SameSite=Lax` cookie set now.
    pub fn new(name: &str, value: &str, max_age: i64) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            max_age,
            path: "/".to_string(),
            same_site: SAME_SITE.to_string(),
            set_at: Utc::now(),
        }
    }

    /// `None` when `max_age` is too large to represent as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Duration::try_seconds(self.max_age).and_then(|age| self.set_at.checked_add_signed(age))
    }

    /// Cookies with an unrepresentable expiry count as expired
    pub fn is_expired(&self) -> bool {
        match self.expires_at() {
            Some(expires_at) => Utc::now() >= expires_at,
            None => true,
        }
    }

    /// Render in `Set-Cookie` form, e.g. `authToken=T; Max-Age=604800; Path=/; SameSite=Lax`
    pub fn header_value(&self) -> String {
        format!(
            "{}={}; Max-Age={}; Path={}; SameSite={}",
            self.name,
            self.value,
            self.max_age,
            self.path,
            self.same_site
        )
    }
}

pub struct CookieJar {
    path: PathBuf,
}

impl CookieJar {
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            path: cache_dir.join(COOKIE_FILE),
        }
    }

    /// Get a cookie by name. Expired cookies read as absent.
    pub fn get(&self, name: &str) -> Option<Cookie> {
        self.read_all()
            .remove(name)
            .filter(|cookie| !cookie.is_expired())
    }

    /// Store a cookie, replacing any cookie with the same name.
    /// A non-positive `max_age` removes the cookie instead.
    pub fn set(&self, cookie: Cookie) -> Result<()> {
        debug!(cookie = %cookie.name, max_age = cookie.max_age, "Setting cookie");
        let mut cookies = self.read_all();
        if cookie.max_age <= 0 {
            cookies.remove(&cookie.name);
        } else {
            cookies.insert(cookie.name.clone(), cookie);
        }
        cookies.retain(|_, c| !c.is_expired());
        self.write_all(&cookies)
    }

    fn read_all(&self) -> BTreeMap<String, Cookie> {
        if !self.path.exists() {
            return BTreeMap::new();
        }
        let parsed: Result<BTreeMap<String, Cookie>> = std::fs::read_to_string(&self.path)
            .context("Failed to read cookie jar")
            .and_then(|contents| {
                serde_json::from_str(&contents).context("Failed to parse cookie jar")
            });
        match parsed {
            Ok(cookies) => cookies,
            Err(e) => {
                debug!(error = %e, "Treating unreadable cookie jar as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, cookies: &BTreeMap<String, Cookie>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, contents).context("Failed to write cookie jar")?;
        Ok(())
    }
}
