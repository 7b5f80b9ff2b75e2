// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Binding a session to one request/response exchange
//!
//! ```text
//! open -> prepare -> (HTTP exchange) -> ingest -> commit
//! ```

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, AUTHORIZATION, COOKIE};
use tracing::{debug, warn};
use url::Url;

use super::headers::HeaderRules;
use super::identifier::{resolve, SessionIdentifier};
use super::merge::{merge, MergeContext};
use super::record::SessionRecord;
use super::store::{self, SessionState};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::http::{
    header_pair, netloc, parse_cookie_pairs, Cookie, CookieJar, Request, Response,
};

/// Which session an invocation asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSelector {
    /// Name or path given on the command line
    pub token: String,
    /// Load but never save
    pub read_only: bool,
    /// Treat the token as a path even without a separator
    pub force_path: bool,
}

impl SessionSelector {
    /// Read-write selector
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            read_only: false,
            force_path: false,
        }
    }

    /// Set read-only
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Force path interpretation
    pub fn force_path(mut self, force_path: bool) -> Self {
        self.force_path = force_path;
        self
    }
}

/// A request with session state applied, and the cookies to send with it
#[derive(Debug, Clone)]
pub struct Prepared {
    /// Request to send
    pub request: Request,
    /// Session cookies plus explicit ones
    pub jar: CookieJar,
}

/// A loaded session bound to the current invocation
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionIdentifier,
    record: SessionRecord,
    fresh: bool,
    rules: HeaderRules,
    default_user_agent: String,
}

impl Session {
    /// Resolve and load the session for `url`
    pub fn open(selector: &SessionSelector, url: &Url, config: &Config) -> Result<Self> {
        let host = netloc(url);
        let id = resolve(
            &selector.token,
            &host,
            selector.read_only,
            selector.force_path,
            &config.sessions_dir(),
        )?;
        let state = store::load(&id.path)?;
        debug!(session = %id, path = %id.path.display(), fresh = state.is_fresh(), "Opened session");

        Ok(Self::from_state(id, state, config.header_rules()))
    }

    /// Bind an already loaded state
    pub fn from_state(id: SessionIdentifier, state: SessionState, rules: HeaderRules) -> Self {
        Self {
            id,
            fresh: state.is_fresh(),
            record: state.into_record(),
            rules,
            default_user_agent: crate::http::DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set the user agent that is never stored
    pub fn default_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.default_user_agent = user_agent.into();
        self
    }

    /// Resolved location
    pub fn identifier(&self) -> &SessionIdentifier {
        &self.id
    }

    /// Current record
    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Whether no session file existed when opened
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Apply stored headers, credentials and cookies to `request`
    ///
    /// Explicit headers and credentials win over stored ones, and stored
    /// credentials are not used when `Authorization` is given. An explicit
    /// `Cookie` header moves into the jar, replacing stored cookies of the
    /// same name that would be sent to the request URL.
    pub fn prepare(&self, request: &Request) -> Result<Prepared> {
        let mut prepared = request.clone();

        let mut headers = HeaderMap::new();
        for (name, value) in self.record.headers.iter() {
            match header_pair(name, value) {
                Ok((name, value)) if !request.headers.contains_key(&name) => {
                    headers.insert(name, value);
                }
                Ok(_) => {}
                Err(e) => debug!(header = name, error = %e, "Stored header not sent"),
            }
        }
        for (name, value) in request.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }
        for name in &request.unset {
            headers.remove(name);
        }

        let jar = CookieJar::from_cookies(self.record.cookies.iter().cloned());
        if let Some(explicit) = headers.remove(COOKIE) {
            let host = request.url.host_str().unwrap_or("").to_ascii_lowercase();
            let explicit = explicit
                .to_str()
                .map_err(|e| Error::request_item("Cookie", e.to_string()))?;
            for (name, value) in parse_cookie_pairs(explicit) {
                jar.remove_matching(&name, &request.url);
                jar.add(Cookie::new(name, value).domain(host.clone()));
            }
        }

        prepared.headers = headers;
        // an explicit Authorization header replaces stored credentials
        if prepared.auth.is_none() && !request.headers.contains_key(AUTHORIZATION) {
            prepared.auth = self.record.auth.clone();
        }

        Ok(Prepared {
            request: prepared,
            jar,
        })
    }

    /// Merge what the user supplied and what the server sent into the record
    ///
    /// `original` must be the request before [`Session::prepare`]. Returns the
    /// `Set-Cookie` values that were skipped.
    pub fn ingest(
        &mut self,
        original: &Request,
        response: &Response,
        now: DateTime<Utc>,
    ) -> Vec<Error> {
        let ctx = MergeContext {
            url: &original.url,
            headers: &original.headers,
            auth: original.auth.as_ref(),
            set_cookies: response.set_cookies_by_origin(),
            now,
            rules: &self.rules,
            default_user_agent: &self.default_user_agent,
        };
        let outcome = merge(&self.record, &ctx);

        for skipped in &outcome.skipped {
            warn!(session = %self.id, "Ignoring cookie: {}", skipped);
        }

        self.record = outcome.record;
        outcome.skipped
    }

    /// Persist the record unless the session is read-only
    ///
    /// Returns whether anything was written.
    pub fn commit(&self) -> Result<bool> {
        if self.id.read_only {
            debug!(session = %self.id, "Read-only session, not saving");
            return Ok(false);
        }
        store::save(&self.id.path, &self.record)?;
        Ok(true)
    }
}
