// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP client implementation
//!
//! reqwest performs single exchanges. Redirects, cookies and the digest
//! challenge are handled here so that every hop's `Set-Cookie` is visible
//! to the caller.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE, LOCATION, USER_AGENT,
    WWW_AUTHENTICATE,
};
use reqwest::redirect::Policy;
use reqwest::{Client, Method, StatusCode};
use tracing::debug;
use url::{Position, Url};

use super::auth::{new_cnonce, AuthKind, DigestChallenge};
use super::cookie::CookieJar;
use super::request::Request;
use super::response::Response;
use super::DEFAULT_USER_AGENT;
use crate::error::{Error, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// User agent string
    pub user_agent: String,
    /// Default timeout (None = wait forever)
    pub timeout: Option<Duration>,
    /// Accept invalid certificates (dangerous!)
    pub accept_invalid_certs: bool,
    /// Default headers, overridden by anything the request carries
    pub default_headers: HeaderMap,
    /// Proxy URL
    pub proxy: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("accept", HeaderValue::from_static("*/*"));
        default_headers.insert(
            "accept-encoding",
            HeaderValue::from_static("gzip, deflate, br"),
        );

        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            accept_invalid_certs: false,
            default_headers,
            proxy: None,
        }
    }
}

impl HttpClientConfig {
    /// Set timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Accept invalid TLS certificates
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Set proxy
    pub fn proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// HTTP client that follows redirects itself
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .redirect(Policy::none())
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(false); // cookies come from the jar passed to execute()

        if let Some(ref proxy_url) = config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy_url)
                    .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?,
            );
        }

        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Execute a request, sending cookies from `jar` and storing received ones in it
    ///
    /// Redirect and digest-challenge responses end up in `Response::history`.
    pub async fn execute(&self, request: &Request, jar: &CookieJar) -> Result<Response> {
        let mut history: Vec<Response> = Vec::new();
        let mut method = request.method.clone();
        let mut url = request.url.clone();
        let mut body = request.body.clone();
        let mut same_host = true;
        let mut digest_answered = false;
        let mut redirects = 0usize;

        loop {
            let headers = self.compose_headers(request, &url, jar, body.is_some(), same_host);
            let mut response = self
                .send_once(&method, &url, headers, body.clone(), request)
                .await?;
            self.absorb_cookies(&response, jar);

            if response.status == StatusCode::UNAUTHORIZED && same_host && !digest_answered {
                if let Some(value) = self.digest_authorization(request, &method, &url, &response) {
                    digest_answered = true;
                    let mut retry = self.compose_headers(request, &url, jar, body.is_some(), same_host);
                    retry.insert(AUTHORIZATION, value);
                    history.push(response);
                    response = self
                        .send_once(&method, &url, retry, body.clone(), request)
                        .await?;
                    self.absorb_cookies(&response, jar);
                }
            }

            let next = match redirect_target(&response) {
                Some(location) if request.follow_redirects => location.to_string(),
                _ => {
                    response.history = history;
                    return Ok(response);
                }
            };

            if redirects >= request.max_redirects {
                return Err(Error::TooManyRedirects {
                    max: request.max_redirects,
                });
            }

            let next_url = response.url.join(&next)?;
            let status = response.status;
            if (status == StatusCode::SEE_OTHER && method != Method::HEAD)
                || (matches!(status, StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND)
                    && method == Method::POST)
            {
                method = Method::GET;
                body = None;
            }
            same_host = same_host
                && next_url.host_str() == request.url.host_str()
                && next_url.port_or_known_default() == request.url.port_or_known_default();

            debug!(from = %url, to = %next_url, status = %status, "Following redirect");
            history.push(response);
            redirects += 1;
            url = next_url;
        }
    }

    /// Build the header set for one hop
    fn compose_headers(
        &self,
        request: &Request,
        url: &Url,
        jar: &CookieJar,
        has_body: bool,
        same_host: bool,
    ) -> HeaderMap {
        let mut headers = self.config.default_headers.clone();
        if let Ok(ua) = HeaderValue::try_from(self.config.user_agent.as_str()) {
            headers.insert(USER_AGENT, ua);
        }
        for (name, value) in request.defaults.iter() {
            if *name != CONTENT_TYPE || has_body {
                headers.insert(name.clone(), value.clone());
            }
        }
        for (name, value) in request.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        if same_host {
            if let Some(value) = request
                .auth
                .as_ref()
                .and_then(|auth| auth.preemptive_header())
                .and_then(|value| HeaderValue::try_from(value).ok())
            {
                headers.insert(AUTHORIZATION, value);
            }
        } else {
            headers.remove(AUTHORIZATION);
        }

        if let Some(jar_cookies) = jar.get_cookie_header(url) {
            let value = match headers.get(COOKIE).and_then(|v| v.to_str().ok()) {
                Some(explicit) => format!("{}; {}", explicit, jar_cookies),
                None => jar_cookies,
            };
            if let Ok(value) = HeaderValue::try_from(value) {
                headers.insert(COOKIE, value);
            }
        }

        for name in &request.unset {
            headers.remove(name);
        }
        headers
    }

    /// Perform one exchange without following anything
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        headers: HeaderMap,
        body: Option<Bytes>,
        request: &Request,
    ) -> Result<Response> {
        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .headers(headers);

        if let Some(body) = body {
            builder = builder.body(body);
        }

        let timeout = request.timeout.or(self.config.timeout);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                Error::Timeout {
                    url: url.to_string(),
                    duration_ms: timeout.map(|t| t.as_millis() as u64).unwrap_or_default(),
                }
            } else {
                Error::Http(e)
            }
        };

        let response = builder.send().await.map_err(map_err)?;
        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_err)?;

        debug!(method = %method, url = %url, status = %status, "Response");

        let mut result = Response::new(status, headers, body, url.clone());
        result.version = version;
        Ok(result)
    }

    /// Store received cookies so later hops send them
    fn absorb_cookies(&self, response: &Response, jar: &CookieJar) {
        for header in response.set_cookies() {
            if let Err(e) = jar.add_from_header(header, &response.url) {
                debug!(error = %e, "Cookie not stored in jar");
            }
        }
    }

    /// Authorization answering a digest challenge, when the request carries digest credentials
    fn digest_authorization(
        &self,
        request: &Request,
        method: &Method,
        url: &Url,
        response: &Response,
    ) -> Option<HeaderValue> {
        let auth = request.auth.as_ref().filter(|a| a.kind == AuthKind::Digest)?;
        let challenge = response
            .header_all(WWW_AUTHENTICATE.as_str())
            .into_iter()
            .find_map(DigestChallenge::parse)?;
        let uri = &url[Position::BeforePath..Position::AfterQuery];
        let value = auth.digest_header(&challenge, method, uri, &new_cnonce());
        HeaderValue::try_from(value).ok()
    }
}

/// Location of a redirect response
fn redirect_target(response: &Response) -> Option<&str> {
    match response.status {
        StatusCode::MOVED_PERMANENTLY
        | StatusCode::FOUND
        | StatusCode::SEE_OTHER
        | StatusCode::TEMPORARY_REDIRECT
        | StatusCode::PERMANENT_REDIRECT => response.header(LOCATION.as_str()),
        _ => None,
    }
}
