// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Session selector resolution
//!
//! Turns a `--session` token plus the request host into a file location.

use std::fmt;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref SESSION_NAME: Regex =
        Regex::new(r"^[A-Za-z0-9_.-]+$").expect("valid session name regex");
}

/// How a selector was interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierKind {
    /// A name scoped to a host
    Named { name: String, host: String },
    /// A literal filesystem path
    Path,
}

/// Resolved session location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentifier {
    /// Session file
    pub path: PathBuf,
    /// Never write the session back
    pub read_only: bool,
    /// How the selector was interpreted
    pub kind: IdentifierKind,
}

impl fmt::Display for SessionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IdentifierKind::Named { name, host } => write!(f, "{}@{}", name, host),
            IdentifierKind::Path => write!(f, "{}", self.path.display()),
        }
    }
}

/// Resolve a session selector
///
/// `host` is the request host with its explicit port, e.g. `example.com:8080`.
/// A token with a path separator, one naming an existing file, or any token
/// when `force_path` is set is used verbatim. Only metadata is read.
pub fn resolve(
    token: &str,
    host: &str,
    read_only: bool,
    force_path: bool,
    sessions_dir: &Path,
) -> Result<SessionIdentifier> {
    if token.is_empty() {
        return Err(Error::invalid_identifier(token, "empty session name"));
    }

    if force_path || looks_like_path(token) {
        return Ok(SessionIdentifier {
            path: PathBuf::from(token),
            read_only,
            kind: IdentifierKind::Path,
        });
    }

    if token == "." || token == ".." || !SESSION_NAME.is_match(token) {
        return Err(Error::invalid_identifier(
            token,
            "session names may only contain letters, digits, '_', '.' and '-'",
        ));
    }

    let host_dir = host_directory(host);
    if host_dir.is_empty() {
        return Err(Error::invalid_identifier(token, "request URL has no host"));
    }

    Ok(SessionIdentifier {
        path: sessions_dir.join(&host_dir).join(format!("{}.json", token)),
        read_only,
        kind: IdentifierKind::Named {
            name: token.to_string(),
            host: host.to_string(),
        },
    })
}

fn looks_like_path(token: &str) -> bool {
    token.contains(std::path::MAIN_SEPARATOR) || token.contains('/') || Path::new(token).exists()
}

/// Directory name for a host: `example.com:8080` becomes `example.com_8080`
pub fn host_directory(host: &str) -> String {
    host.chars()
        .filter(|c| *c != '[' && *c != ']')
        .map(|c| if c == ':' { '_' } else { c })
        .collect()
}
