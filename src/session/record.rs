// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! The persisted session record

use serde::{Deserialize, Deserializer, Serialize};

use super::headers::SessionHeaders;
use crate::http::{Auth, Cookie};

/// Informational block written at the top of every session file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMeta {
    /// What the file is
    pub about: String,
    /// Version of kuriiri that last wrote the file
    pub version: String,
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self {
            about: "kuriiri session file".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Headers, cookies and credentials carried across invocations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// File metadata
    #[serde(rename = "__meta__", default)]
    pub meta: SessionMeta,
    /// Stored request headers
    #[serde(default)]
    pub headers: SessionHeaders,
    /// Stored cookies, unique by name, domain and path
    #[serde(default, deserialize_with = "unique_cookies")]
    pub cookies: Vec<Cookie>,
    /// Stored credentials
    #[serde(default)]
    pub auth: Option<Auth>,
}

impl SessionRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cookie, replacing the entry with the same key in place
    pub fn upsert_cookie(&mut self, cookie: Cookie) {
        match self.cookies.iter().position(|c| c.key() == cookie.key()) {
            Some(idx) => self.cookies[idx] = cookie,
            None => self.cookies.push(cookie),
        }
    }

    /// Remove the cookie with this key
    pub fn remove_cookie(&mut self, name: &str, domain: &str, path: &str) -> Option<Cookie> {
        self.cookies
            .iter()
            .position(|c| c.key() == (name, domain, path))
            .map(|idx| self.cookies.remove(idx))
    }

    /// Look up a cookie by key
    pub fn cookie(&self, name: &str, domain: &str, path: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.key() == (name, domain, path))
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.cookies.is_empty() && self.auth.is_none()
    }
}

/// Later entries with a duplicate key replace earlier ones
fn unique_cookies<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Cookie>, D::Error> {
    let cookies = Vec::<Cookie>::deserialize(deserializer)?;
    let mut record = SessionRecord::new();
    for cookie in cookies {
        record.upsert_cookie(cookie);
    }
    Ok(record.cookies)
}
