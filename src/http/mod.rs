// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for kuriiri
//!
//! The transport collaborator of the session subsystem: requests, responses,
//! the cookie jar that owns domain/path matching, and credentials.

mod auth;
mod client;
mod cookie;
mod request;
mod response;

pub use auth::{Auth, AuthKind, DigestChallenge};
pub use client::{HttpClient, HttpClientConfig};
pub use cookie::{parse_cookie_pairs, Cookie, CookieJar};
pub use request::{header_pair, netloc, Request};
pub use response::Response;

/// Default user agent string
pub const DEFAULT_USER_AGENT: &str = concat!("kuriiri/", env!("CARGO_PKG_VERSION"));

/// Common HTTP headers
pub mod headers {
    pub const CONTENT_TYPE: &str = "content-type";
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
    pub const USER_AGENT: &str = "user-agent";
    pub const AUTHORIZATION: &str = "authorization";
    pub const HOST: &str = "host";
}
