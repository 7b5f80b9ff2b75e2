// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP request representation

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::auth::Auth;
use super::headers;
use crate::error::{Error, Result};

/// HTTP request as the user described it
///
/// `headers` holds only what was given explicitly on the command line.
/// Headers derived from the body kind live in `defaults` and lose to
/// anything explicit or stored in a session.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Explicit request headers
    pub headers: HeaderMap,
    /// Headers implied by the request body
    pub defaults: HeaderMap,
    /// Headers removed for this request only
    pub unset: Vec<HeaderName>,
    /// Request body
    pub body: Option<Bytes>,
    /// Credentials
    pub auth: Option<Auth>,
    /// Request timeout
    pub timeout: Option<Duration>,
    /// Follow redirects
    pub follow_redirects: bool,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Request {
    /// Create a new GET request
    pub fn get(url: impl AsRef<str>) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    /// Create a new request with arbitrary method
    pub fn new(method: Method, url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            method,
            url: Url::parse(url.as_ref())?,
            headers: HeaderMap::new(),
            defaults: HeaderMap::new(),
            unset: Vec::new(),
            body: None,
            auth: None,
            timeout: None,
            follow_redirects: false,
            max_redirects: 30,
        })
    }

    /// Set an explicit header, replacing earlier values
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let (name, value) = header_pair(name.as_ref(), value.as_ref())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Set a header implied by the body
    pub fn default_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.defaults
            .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        self
    }

    /// Remove a header for this request only
    pub fn unset_header(mut self, name: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::request_item(name.as_ref(), e.to_string()))?;
        self.headers.remove(&name);
        self.unset.push(name);
        Ok(self)
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set JSON body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        let json = serde_json::to_vec(data)?;
        self.body = Some(Bytes::from(json));
        Ok(self
            .default_header(headers::CONTENT_TYPE, "application/json")
            .default_header("accept", "application/json, */*;q=0.5"))
    }

    /// Set form body
    pub fn form<'a>(mut self, data: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(data)
            .finish();
        self.body = Some(Bytes::from(body));
        self.default_header(
            headers::CONTENT_TYPE,
            "application/x-www-form-urlencoded; charset=utf-8",
        )
    }

    /// Set credentials
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Set timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set follow redirects
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// Set max redirects
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Host and explicit port, e.g. `example.com:8080`
    pub fn netloc(&self) -> String {
        netloc(&self.url)
    }

}

/// Host and explicit port of a URL
pub fn netloc(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Validate a header name/value pair
pub fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::try_from(name)
        .map_err(|e| Error::request_item(format!("{}:{}", name, value), e.to_string()))?;
    let header_value = HeaderValue::try_from(value)
        .map_err(|e| Error::request_item(format!("{}:{}", name, value), e.to_string()))?;
    Ok((header_name, header_value))
}
