// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP response types

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{StatusCode, Version};
use url::Url;

use super::headers;
use crate::error::{Error, Result};

/// HTTP response representation
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// HTTP version
    pub version: Version,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
    /// URL this response was received from
    pub url: Url,
    /// Redirect responses that led here, oldest first
    pub history: Vec<Response>,
}

impl Response {
    /// Create a new response
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes, url: Url) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            body,
            url,
            history: Vec::new(),
        }
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Whether redirects were followed to reach this response
    pub fn redirected(&self) -> bool {
        !self.history.is_empty()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get body as text
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::Other(e.to_string()))
    }

    /// Get body as text, lossy conversion
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get Set-Cookie headers
    pub fn set_cookies(&self) -> Vec<&str> {
        self.header_all(headers::SET_COOKIE)
    }

    /// Set-Cookie headers of every hop paired with the URL that sent them
    pub fn set_cookies_by_origin(&self) -> Vec<(&Url, &str)> {
        self.history
            .iter()
            .chain(std::iter::once(self))
            .flat_map(|hop| hop.set_cookies().into_iter().map(move |c| (&hop.url, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn response(status: StatusCode, url: &str, cookies: &[&'static str]) -> Response {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append("set-cookie", HeaderValue::from_static(cookie));
        }
        Response::new(status, headers, Bytes::new(), Url::parse(url).unwrap())
    }

    #[test]
    fn test_response_status() {
        let resp = response(StatusCode::OK, "https://example.com", &[]);
        assert!(resp.is_success());
        assert!(!resp.redirected());
        assert_eq!(resp.status_code(), 200);
    }

    #[test]
    fn test_response_text() {
        let mut resp = response(StatusCode::OK, "https://example.com", &[]);
        resp.body = Bytes::from("Hello, World!");
        assert_eq!(resp.text().unwrap(), "Hello, World!");
    }

    #[test]
    fn test_set_cookies_by_origin() {
        let hop = response(StatusCode::FOUND, "http://a.test/set", &["a=1", "b=2"]);
        let mut last = response(StatusCode::OK, "http://b.test/done", &["c=3"]);
        last.history.push(hop);

        let origins: Vec<(String, &str)> = last
            .set_cookies_by_origin()
            .into_iter()
            .map(|(url, c)| (url.host_str().unwrap().to_string(), c))
            .collect();

        assert_eq!(
            origins,
            vec![
                ("a.test".to_string(), "a=1"),
                ("a.test".to_string(), "b=2"),
                ("b.test".to_string(), "c=3"),
            ]
        );
        assert!(last.redirected());
    }
}
