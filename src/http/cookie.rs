// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookies and the cookie jar
//!
//! The jar owns domain/path matching. Sessions only store and restore its
//! contents.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::error::{Error, Result};

/// A single HTTP cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    #[serde(default = "default_path")]
    pub path: String,
    /// Expiration time (None = session cookie), stored as epoch seconds
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    #[serde(default)]
    pub secure: bool,
    /// HttpOnly flag
    #[serde(default)]
    pub http_only: bool,
}

fn default_path() -> String {
    "/".to_string()
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: default_path(),
            expires: None,
            secure: false,
            http_only: false,
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set secure flag
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Identity of the cookie inside a jar or session
    pub fn key(&self) -> (&str, &str, &str) {
        (&self.name, &self.domain, &self.path)
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check if the cookie is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.map_or(false, |exp| exp <= now)
    }

    /// Check if the cookie should be sent to the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !path_matches(&self.path, url.path()) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    /// Check if domain matches
    fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        host.eq_ignore_ascii_case(domain)
            || host
                .to_ascii_lowercase()
                .ends_with(&format!(".{}", domain.to_ascii_lowercase()))
    }

    /// Parse a Set-Cookie header value received from `url`
    ///
    /// `now` anchors `Max-Age`. Unknown attributes and unparsable attribute
    /// values are ignored; a missing name/value pair or a foreign `Domain`
    /// rejects the whole cookie.
    pub fn parse(header: &str, url: &Url, now: DateTime<Utc>) -> Result<Self> {
        let mut parts = header.split(';');
        let first = parts.next().unwrap_or("").trim();

        let (name, value) = first
            .split_once('=')
            .ok_or_else(|| Error::malformed_cookie(header, "missing '=' in name/value pair"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::malformed_cookie(header, "empty cookie name"));
        }
        if name.chars().any(|c| c.is_control() || c.is_whitespace() || "()<>@,;:\\\"/[]?={}".contains(c)) {
            return Err(Error::malformed_cookie(header, "invalid character in cookie name"));
        }

        let host = url.host_str().unwrap_or("").to_ascii_lowercase();
        let mut cookie = Cookie::new(name, value.trim().trim_matches('"'));
        cookie.domain = host.clone();
        cookie.path = default_cookie_path(url.path());

        let mut max_age = None;
        let mut expires = None;

        for part in parts {
            let part = part.trim();
            let (attr, val) = match part.split_once('=') {
                Some((attr, val)) => (attr.trim().to_ascii_lowercase(), val.trim()),
                None => (part.to_ascii_lowercase(), ""),
            };
            match attr.as_str() {
                "domain" if !val.is_empty() => {
                    let domain = val.trim_start_matches('.').to_ascii_lowercase();
                    if host != domain && !host.ends_with(&format!(".{}", domain)) {
                        return Err(Error::malformed_cookie(
                            header,
                            format!("domain '{}' does not match host '{}'", domain, host),
                        ));
                    }
                    cookie.domain = domain;
                }
                "path" if val.starts_with('/') => cookie.path = val.to_string(),
                "expires" => expires = parse_cookie_date(val),
                "max-age" => max_age = val.parse::<i64>().ok(),
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        // Max-Age wins over Expires
        cookie.expires = match max_age {
            Some(secs) if secs <= 0 => Some(now),
            // out-of-range lifetimes clamp to the latest representable time
            Some(secs) => Some(
                Duration::try_seconds(secs)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            None => expires,
        };

        Ok(cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Directory of the request path, as a cookie's default path
fn default_cookie_path(request_path: &str) -> String {
    if !request_path.starts_with('/') {
        return default_path();
    }
    match request_path.rfind('/') {
        Some(0) | None => default_path(),
        Some(idx) => request_path[..idx].to_string(),
    }
}

fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    request_path.starts_with(cookie_path)
        && (cookie_path.ends_with('/') || request_path[cookie_path.len()..].starts_with('/'))
}

/// Parse the date formats seen in `Expires`
fn parse_cookie_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%a, %d-%b-%Y %H:%M:%S GMT", "%a, %d-%b-%y %H:%M:%S GMT", "%A, %d-%b-%y %H:%M:%S GMT"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Split a `Cookie:` request header into name/value pairs
pub fn parse_cookie_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            (!name.is_empty()).then(|| (name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Thread-safe cookie storage
#[derive(Debug, Clone)]
pub struct CookieJar {
    /// Cookies stored by domain
    cookies: Arc<DashMap<String, Vec<Cookie>>>,
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl CookieJar {
    /// Create a new empty cookie jar
    pub fn new() -> Self {
        Self {
            cookies: Arc::new(DashMap::new()),
        }
    }

    /// Create a jar holding the given cookies
    pub fn from_cookies(cookies: impl IntoIterator<Item = Cookie>) -> Self {
        let jar = Self::new();
        for cookie in cookies {
            jar.add(cookie);
        }
        jar
    }

    /// Add a cookie to the jar, replacing one with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        match entry
            .iter()
            .position(|c| c.name == cookie.name && c.path == cookie.path)
        {
            Some(idx) => entry[idx] = cookie,
            None => entry.push(cookie),
        }
    }

    /// Add a cookie from a Set-Cookie header
    ///
    /// A cookie that is already expired removes its stored counterpart.
    pub fn add_from_header(&self, header: &str, url: &Url) -> Result<()> {
        let now = Utc::now();
        let cookie = Cookie::parse(header, url, now)?;
        if cookie.is_expired_at(now) {
            self.remove(&cookie.name, &cookie.domain, &cookie.path);
        } else {
            self.add(cookie);
        }
        Ok(())
    }

    /// Get all cookies for a URL, longest path first
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        self.remove_expired();

        let mut result: Vec<Cookie> = self
            .cookies
            .iter()
            .flat_map(|entry| entry.value().clone())
            .filter(|cookie| cookie.matches(url))
            .collect();
        result.sort_by(|a, b| b.path.len().cmp(&a.path.len()).then_with(|| a.name.cmp(&b.name)));
        result
    }

    /// Get Cookie header value for a URL
    pub fn get_cookie_header(&self, url: &Url) -> Option<String> {
        let cookies = self.get_cookies(url);
        if cookies.is_empty() {
            return None;
        }

        Some(
            cookies
                .iter()
                .map(|c| c.to_header_value())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Remove a specific cookie
    pub fn remove(&self, name: &str, domain: &str, path: &str) {
        if let Some(mut cookies) = self.cookies.get_mut(domain) {
            cookies.retain(|c| c.name != name || c.path != path);
        }
    }

    /// Remove every cookie with this name that would be sent to `url`
    pub fn remove_matching(&self, name: &str, url: &Url) {
        for mut entry in self.cookies.iter_mut() {
            entry
                .value_mut()
                .retain(|c| c.name != name || !c.matches(url));
        }
    }

    /// Remove expired cookies
    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Get total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if jar is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
