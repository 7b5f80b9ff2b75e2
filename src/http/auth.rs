// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request credentials
//!
//! Basic credentials are sent with the first request. Digest credentials
//! answer a `WWW-Authenticate: Digest` challenge.

use std::collections::HashMap;

use lazy_static::lazy_static;
use md5::{Digest, Md5};
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

lazy_static! {
    static ref CHALLENGE_PARAM: Regex =
        Regex::new(r#"([A-Za-z][A-Za-z0-9_-]*)\s*=\s*(?:"((?:[^"\\]|\\.)*)"|([^,\s]*))"#)
            .expect("valid challenge regex");
}

/// Authentication scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthKind {
    /// HTTP Basic
    #[default]
    Basic,
    /// HTTP Digest
    Digest,
}

/// Username/password credentials for one scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Auth {
    /// Scheme
    #[serde(rename = "type")]
    pub kind: AuthKind,
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl Auth {
    /// Create credentials
    pub fn new(kind: AuthKind, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            kind,
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse `USER[:PASS]` as given to `--auth`
    ///
    /// Only the first colon separates; passwords may contain colons.
    pub fn parse(credentials: &str, kind: AuthKind) -> Result<Self> {
        let (username, password) = credentials.split_once(':').unwrap_or((credentials, ""));
        if username.is_empty() {
            return Err(Error::config(format!(
                "--auth '{}' has an empty username",
                credentials
            )));
        }
        Ok(Self::new(kind, username, password))
    }

    /// Authorization header sent without a challenge, if the scheme allows it
    pub fn preemptive_header(&self) -> Option<String> {
        match self.kind {
            AuthKind::Basic => Some(self.basic_header()),
            AuthKind::Digest => None,
        }
    }

    /// Basic authorization header value
    pub fn basic_header(&self) -> String {
        let encoded = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            format!("{}:{}", self.username, self.password),
        );
        format!("Basic {}", encoded)
    }

    /// Digest authorization header value answering `challenge`
    pub fn digest_header(
        &self,
        challenge: &DigestChallenge,
        method: &Method,
        uri: &str,
        cnonce: &str,
    ) -> String {
        let nc = "00000001";
        let mut ha1 = md5_hex(&format!(
            "{}:{}:{}",
            self.username, challenge.realm, self.password
        ));
        if challenge.is_session_algorithm() {
            ha1 = md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, cnonce));
        }
        let ha2 = md5_hex(&format!("{}:{}", method.as_str(), uri));

        let qop_auth = challenge.supports_qop_auth();
        let response = if qop_auth {
            md5_hex(&format!(
                "{}:{}:{}:{}:auth:{}",
                ha1, challenge.nonce, nc, cnonce, ha2
            ))
        } else {
            md5_hex(&format!("{}:{}:{}", ha1, challenge.nonce, ha2))
        };

        let mut header = format!(
            r#"Digest username="{}", realm="{}", nonce="{}", uri="{}", response="{}""#,
            self.username, challenge.realm, challenge.nonce, uri, response
        );
        if let Some(ref algorithm) = challenge.algorithm {
            header.push_str(&format!(", algorithm={}", algorithm));
        }
        if let Some(ref opaque) = challenge.opaque {
            header.push_str(&format!(r#", opaque="{}""#, opaque));
        }
        if qop_auth {
            header.push_str(&format!(r#", qop=auth, nc={}, cnonce="{}""#, nc, cnonce));
        }
        header
    }
}

/// Parameters of a `WWW-Authenticate: Digest` challenge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    pub realm: String,
    pub nonce: String,
    pub opaque: Option<String>,
    pub algorithm: Option<String>,
    pub qop: Option<String>,
}

impl DigestChallenge {
    /// Parse a `WWW-Authenticate` value; `None` unless it is a usable Digest challenge
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let (scheme, rest) = header.split_once(char::is_whitespace)?;
        if !scheme.eq_ignore_ascii_case("digest") {
            return None;
        }

        let params: HashMap<String, String> = CHALLENGE_PARAM
            .captures_iter(rest)
            .map(|caps| {
                let value = caps
                    .get(2)
                    .or_else(|| caps.get(3))
                    .map(|m| m.as_str().replace("\\\"", "\""))
                    .unwrap_or_default();
                (caps[1].to_ascii_lowercase(), value)
            })
            .collect();

        let algorithm = params.get("algorithm").cloned();
        if let Some(ref alg) = algorithm {
            let alg = alg.to_ascii_uppercase();
            if alg != "MD5" && alg != "MD5-SESS" {
                return None;
            }
        }

        Some(Self {
            realm: params.get("realm").cloned().unwrap_or_default(),
            nonce: params.get("nonce").cloned()?,
            opaque: params.get("opaque").cloned(),
            algorithm,
            qop: params.get("qop").cloned(),
        })
    }

    fn supports_qop_auth(&self) -> bool {
        self.qop
            .as_deref()
            .map(|qop| qop.split(',').any(|q| q.trim().eq_ignore_ascii_case("auth")))
            .unwrap_or(false)
    }

    fn is_session_algorithm(&self) -> bool {
        self.algorithm
            .as_deref()
            .map(|alg| alg.eq_ignore_ascii_case("MD5-sess"))
            .unwrap_or(false)
    }
}

/// Fresh client nonce for a digest response
pub fn new_cnonce() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn md5_hex(input: &str) -> String {
    format!("{:x}", Md5::digest(input.as_bytes()))
}
